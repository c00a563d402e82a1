//! Ordinal placeholder scanning ({{1}}, {{2}}, ...)

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches an ordinal placeholder and captures its index digits
    pub(crate) static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{(\d+)\}\}").expect("placeholder pattern is valid");
}

/// Count distinct placeholder indices in template text.
///
/// `"{{1}} and {{1}} again"` counts as one variable, matching how WhatsApp
/// resolves repeated indices. Missing or empty text yields zero.
pub fn count_placeholders(text: Option<&str>) -> usize {
    placeholder_indices(text).len()
}

/// Count raw placeholder occurrences, repeated indices included
pub fn count_placeholder_occurrences(text: Option<&str>) -> usize {
    match text {
        Some(t) => PLACEHOLDER_RE.find_iter(t).count(),
        None => 0,
    }
}

/// Sorted distinct placeholder indices found in the text.
///
/// Indices too large for `u32` are ignored.
pub fn placeholder_indices(text: Option<&str>) -> Vec<u32> {
    let Some(text) = text else {
        return Vec::new();
    };

    let indices: BTreeSet<u32> = PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .collect();

    indices.into_iter().collect()
}

/// Whether the placeholder indices form exactly `1..=k`
pub fn is_contiguous(text: Option<&str>) -> bool {
    placeholder_indices(text)
        .iter()
        .enumerate()
        .all(|(i, &n)| n as usize == i + 1)
}
