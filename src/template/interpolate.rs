//! Placeholder interpolation for template previews

use regex::Captures;

use super::placeholder::PLACEHOLDER_RE;

/// Substitute `{{n}}` placeholders with `replacements[n - 1]`.
///
/// Placeholders without a matching value are left as-is, so a partially
/// filled form still previews. No WhatsApp markdown escaping is applied.
pub fn interpolate<S: AsRef<str>>(text: &str, replacements: &[S]) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            let value = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| replacements.get(i));

            match value {
                Some(v) => v.as_ref().to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Interpolate using a template's stored example values.
///
/// Used before any live bindings exist. An absent example list leaves the
/// text unchanged.
pub fn interpolate_with_examples(text: &str, examples: Option<&[String]>) -> String {
    match examples {
        Some(values) => interpolate(text, values),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_simple() {
        let result = interpolate("Hello {{1}}, you are {{2}}", &["User", "2"]);
        assert_eq!(result, "Hello User, you are 2");
    }

    #[test]
    fn test_interpolate_missing_value_left_intact() {
        let empty: [&str; 0] = [];
        assert_eq!(interpolate("Hi {{1}}", &empty), "Hi {{1}}");
        assert_eq!(interpolate("{{1}} and {{2}}", &["one"]), "one and {{2}}");
    }

    #[test]
    fn test_interpolate_no_placeholders() {
        let text = "Plain *bold* text";
        assert_eq!(interpolate(text, &["unused"]), text);
        let empty: [String; 0] = [];
        assert_eq!(interpolate(text, &empty), text);
    }

    #[test]
    fn test_interpolate_repeated_index() {
        assert_eq!(interpolate("{{1}}-{{1}}", &["x"]), "x-x");
    }

    #[test]
    fn test_interpolate_zero_index_never_matches() {
        assert_eq!(interpolate("{{0}}", &["x"]), "{{0}}");
    }

    #[test]
    fn test_interpolate_value_containing_placeholder_not_recursed() {
        assert_eq!(interpolate("{{1}} {{2}}", &["{{2}}", "b"]), "{{2}} b");
    }

    #[test]
    fn test_interpolate_with_examples() {
        let examples = vec!["Alice".to_string()];
        assert_eq!(
            interpolate_with_examples("Hi {{1}}", Some(&examples)),
            "Hi Alice"
        );
        assert_eq!(interpolate_with_examples("Hi {{1}}", None), "Hi {{1}}");
    }
}
