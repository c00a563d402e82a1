//! Submit-time validation of template bindings.
//!
//! Rules run in a fixed order and stop at the first failure, so the user
//! always sees the earliest problem in the form.

use std::fmt;

use thiserror::Error;

use super::binding::{TemplateBindings, TemplateVariableBinding, VariableSource};
use crate::template::WhatsAppTemplate;

/// Which group of placeholders a variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Body,
    CardBody(usize),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => write!(f, "header"),
            Section::Body => write!(f, "body"),
            Section::CardBody(card) => write!(f, "carousel card {} body", card + 1),
        }
    }
}

/// A rejected submission; `Display` is the message shown to the user
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a template")]
    NoTemplate,

    #[error("Template variables are out of date: {0}")]
    BindingMismatch(String),

    #[error("Please provide a media file or link for the header")]
    MissingHeaderMedia,

    #[error("Please enter a value for {section} variable {}", .index + 1)]
    EmptyCustomText { section: Section, index: usize },

    #[error("Please select a phonebook field for {section} variable {}", .index + 1)]
    MissingPhonebookField { section: Section, index: usize },

    #[error("Please enter a fallback value for {section} variable {}", .index + 1)]
    MissingFallbackValue { section: Section, index: usize },

    #[error("Please provide a media file or link for carousel card {}", .card + 1)]
    MissingCardMedia { card: usize },

    #[error("Please fill in variable {} of button {}", .slot + 1, .button + 1)]
    EmptyButtonVariable { button: usize, slot: usize },

    #[error("Please fill in variable {} of button {} on carousel card {}", .slot + 1, .button + 1, .card + 1)]
    EmptyCardButtonVariable {
        card: usize,
        button: usize,
        slot: usize,
    },

    #[error("Please enter a broadcast name")]
    MissingBroadcastName,

    #[error("Please select at least one recipient label or number")]
    NoRecipients,

    #[error("Please select a device")]
    MissingDevice,

    #[error("Please select a conversation")]
    MissingConversation,

    #[error("Device id '{0}' is not valid")]
    InvalidDeviceId(String),

    #[error("Conversation id '{0}' is not valid")]
    InvalidConversationId(String),
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NoTemplate => "no_template",
            ValidationError::BindingMismatch(_) => "binding_mismatch",
            ValidationError::MissingHeaderMedia => "missing_header_media",
            ValidationError::EmptyCustomText { .. } => "empty_custom_text",
            ValidationError::MissingPhonebookField { .. } => "missing_phonebook_field",
            ValidationError::MissingFallbackValue { .. } => "missing_fallback_value",
            ValidationError::MissingCardMedia { .. } => "missing_card_media",
            ValidationError::EmptyButtonVariable { .. } => "empty_button_variable",
            ValidationError::EmptyCardButtonVariable { .. } => "empty_card_button_variable",
            ValidationError::MissingBroadcastName => "missing_broadcast_name",
            ValidationError::NoRecipients => "no_recipients",
            ValidationError::MissingDevice => "missing_device",
            ValidationError::MissingConversation => "missing_conversation",
            ValidationError::InvalidDeviceId(_) => "invalid_device_id",
            ValidationError::InvalidConversationId(_) => "invalid_conversation_id",
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_variables(
    variables: &[TemplateVariableBinding],
    section: Section,
) -> Result<(), ValidationError> {
    for (index, variable) in variables.iter().enumerate() {
        match variable.variable_from {
            VariableSource::CustomText if blank(&variable.custom_text) => {
                return Err(ValidationError::EmptyCustomText { section, index });
            }
            VariableSource::PhonebookData if blank(&variable.phonebook_data) => {
                return Err(ValidationError::MissingPhonebookField { section, index });
            }
            VariableSource::PhonebookData if blank(&variable.fallback_value) => {
                return Err(ValidationError::MissingFallbackValue { section, index });
            }
            _ => {}
        }
    }
    Ok(())
}

fn first_empty_slot(buttons: &[Vec<String>]) -> Option<(usize, usize)> {
    buttons.iter().enumerate().find_map(|(button, slots)| {
        slots
            .iter()
            .position(|v| blank(v))
            .map(|slot| (button, slot))
    })
}

/// Validate bindings for submission against the selected template
pub fn validate(
    template: Option<&WhatsAppTemplate>,
    bindings: Option<&TemplateBindings>,
) -> Result<(), ValidationError> {
    let (Some(template), Some(bindings)) = (template, bindings) else {
        return Err(ValidationError::NoTemplate);
    };

    if let Some(reason) = bindings.shape_mismatch(template) {
        return Err(ValidationError::BindingMismatch(reason));
    }

    if bindings.header.media().is_some_and(|m| m.is_missing()) {
        return Err(ValidationError::MissingHeaderMedia);
    }

    check_variables(bindings.header.variables(), Section::Header)?;
    check_variables(&bindings.body, Section::Body)?;

    if let Some(carousel) = &bindings.carousel {
        for (card, binding) in carousel.cards.iter().enumerate() {
            if binding.header.is_missing() {
                return Err(ValidationError::MissingCardMedia { card });
            }
            check_variables(&binding.body, Section::CardBody(card))?;
        }
    }

    if let Some((button, slot)) = first_empty_slot(&bindings.buttons) {
        return Err(ValidationError::EmptyButtonVariable { button, slot });
    }

    if let Some(carousel) = &bindings.carousel {
        for (card, binding) in carousel.cards.iter().enumerate() {
            if let Some((button, slot)) = first_empty_slot(&binding.buttons) {
                return Err(ValidationError::EmptyCardButtonVariable { card, button, slot });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::binding::{bind_template, BindingEdit, MediaRef};
    use serde_json::json;

    fn template(value: serde_json::Value) -> WhatsAppTemplate {
        serde_json::from_value(value).unwrap()
    }

    fn image_template() -> WhatsAppTemplate {
        template(json!({
            "id": "launch",
            "name": "launch",
            "components": [
                {"type": "HEADER", "format": "IMAGE"},
                {"type": "BODY", "text": "Hi {{1}}, meet {{2}}"},
                {"type": "BUTTONS", "buttons": [
                    {"type": "URL", "text": "Open", "url": "https://x/{{1}}"}
                ]}
            ]
        }))
    }

    fn carousel_template() -> WhatsAppTemplate {
        template(json!({
            "id": "cards",
            "name": "cards",
            "components": [
                {"type": "BODY", "text": "Picks"},
                {"type": "CAROUSEL", "cards": [
                    {"components": [
                        {"type": "HEADER", "format": "IMAGE"},
                        {"type": "BODY", "text": "Item {{1}}"},
                        {"type": "BUTTONS", "buttons": [
                            {"type": "URL", "text": "Buy", "url": "https://x/{{1}}"}
                        ]}
                    ]}
                ]}
            ]
        }))
    }

    #[test]
    fn test_no_template() {
        assert_eq!(validate(None, None), Err(ValidationError::NoTemplate));
    }

    #[test]
    fn test_default_bindings_pass_except_media() {
        let t = image_template();
        let mut bindings = bind_template(&t);

        assert_eq!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::MissingHeaderMedia)
        );

        bindings
            .apply(BindingEdit::HeaderMedia {
                media_id: None,
                link: Some("https://cdn/x.png".to_string()),
            })
            .unwrap();
        assert_eq!(validate(Some(&t), Some(&bindings)), Ok(()));
    }

    #[test]
    fn test_phonebook_requires_field_then_fallback() {
        let t = image_template();
        let mut bindings = bind_template(&t);
        bindings.header = crate::composer::HeaderBinding::Image(MediaRef::new(
            Some("m-1".to_string()),
            None,
        ));

        bindings.body[1] = TemplateVariableBinding::phonebook("", "friend");
        assert_eq!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::MissingPhonebookField {
                section: Section::Body,
                index: 1
            })
        );

        bindings.body[1] = TemplateVariableBinding::phonebook("first_name", "");
        assert_eq!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::MissingFallbackValue {
                section: Section::Body,
                index: 1
            })
        );
    }

    #[test]
    fn test_short_circuits_on_first_rule() {
        let t = image_template();
        let mut bindings = bind_template(&t);
        bindings.body[0] = TemplateVariableBinding::custom("");
        bindings.buttons[0][0] = String::new();

        // Media header is checked before body and buttons
        assert_eq!(
            validate(Some(&t), Some(&bindings)).unwrap_err().code(),
            "missing_header_media"
        );
    }

    #[test]
    fn test_empty_button_slot() {
        let t = image_template();
        let mut bindings = bind_template(&t);
        bindings.header = crate::composer::HeaderBinding::Image(MediaRef::new(
            Some("m-1".to_string()),
            None,
        ));
        bindings.buttons[0][0] = "  ".to_string();

        let err = validate(Some(&t), Some(&bindings)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyButtonVariable { button: 0, slot: 0 });
        assert_eq!(err.to_string(), "Please fill in variable 1 of button 1");
    }

    #[test]
    fn test_carousel_rules_in_order() {
        let t = carousel_template();
        let mut bindings = bind_template(&t);

        assert_eq!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::MissingCardMedia { card: 0 })
        );

        bindings
            .apply(BindingEdit::CardHeaderMedia {
                card: 0,
                media_id: Some("m-9".to_string()),
                link: None,
            })
            .unwrap();
        bindings
            .apply(BindingEdit::CardBodyVariable {
                card: 0,
                index: 0,
                binding: TemplateVariableBinding::custom(""),
            })
            .unwrap();
        let err = validate(Some(&t), Some(&bindings)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please enter a value for carousel card 1 body variable 1"
        );

        bindings
            .apply(BindingEdit::CardBodyVariable {
                card: 0,
                index: 0,
                binding: TemplateVariableBinding::custom("Lamp"),
            })
            .unwrap();
        bindings
            .apply(BindingEdit::CardButtonVariable {
                card: 0,
                button: 0,
                slot: 0,
                value: String::new(),
            })
            .unwrap();
        assert_eq!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::EmptyCardButtonVariable {
                card: 0,
                button: 0,
                slot: 0
            })
        );
    }

    #[test]
    fn test_header_text_variables_checked_before_body() {
        let t = template(json!({
            "id": "greeting",
            "name": "greeting",
            "components": [
                {"type": "HEADER", "format": "TEXT", "text": "Hello {{1}}"},
                {"type": "BODY", "text": "Your code is {{1}}"}
            ]
        }));
        let mut bindings = bind_template(&t);
        bindings.body[0] = TemplateVariableBinding::custom("");

        let header_cases = [
            (
                TemplateVariableBinding::custom(" "),
                ValidationError::EmptyCustomText {
                    section: Section::Header,
                    index: 0,
                },
            ),
            (
                TemplateVariableBinding::phonebook("", "friend"),
                ValidationError::MissingPhonebookField {
                    section: Section::Header,
                    index: 0,
                },
            ),
            (
                TemplateVariableBinding::phonebook("first_name", ""),
                ValidationError::MissingFallbackValue {
                    section: Section::Header,
                    index: 0,
                },
            ),
        ];
        for (binding, expected) in header_cases {
            bindings
                .apply(BindingEdit::HeaderVariable { index: 0, binding })
                .unwrap();
            assert_eq!(validate(Some(&t), Some(&bindings)), Err(expected));
        }

        bindings
            .apply(BindingEdit::HeaderVariable {
                index: 0,
                binding: TemplateVariableBinding::phonebook("first_name", "there"),
            })
            .unwrap();
        let err = validate(Some(&t), Some(&bindings)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyCustomText {
                section: Section::Body,
                index: 0
            }
        );
        assert_eq!(err.to_string(), "Please enter a value for body variable 1");
    }

    #[test]
    fn test_bindings_for_other_template() {
        let t = image_template();
        let bindings = bind_template(&carousel_template());

        assert!(matches!(
            validate(Some(&t), Some(&bindings)),
            Err(ValidationError::BindingMismatch(_))
        ));
    }
}
