//! Variable bindings for a selected template

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::{HeaderComponent, HeaderFormat, TemplateButton, WhatsAppTemplate};

/// Errors raised while editing bindings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("{target} index {index} is out of range (have {len})")]
    SlotOutOfRange {
        target: String,
        index: usize,
        len: usize,
    },

    #[error("Header is {0}, not a media header")]
    NotMediaHeader(&'static str),

    #[error("Header is {0}, not a text header")]
    NotTextHeader(&'static str),

    #[error("Template has no carousel")]
    NoCarousel,
}

/// Where a placeholder's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableSource {
    #[default]
    CustomText,
    PhonebookData,
}

/// Data source for one placeholder
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateVariableBinding {
    #[serde(default)]
    pub custom_text: String,

    /// Phonebook field name, e.g. `first_name`
    #[serde(default)]
    pub phonebook_data: String,

    #[serde(default)]
    pub variable_from: VariableSource,

    /// Used when the contact has no value for `phonebook_data`
    #[serde(default)]
    pub fallback_value: String,
}

impl TemplateVariableBinding {
    /// Default binding for the placeholder at `index` (zero-based).
    ///
    /// The literal `{{index+1}}` is sent as-is if the user never edits it.
    pub fn placeholder(index: usize) -> Self {
        Self {
            custom_text: ordinal(index),
            ..Default::default()
        }
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self {
            custom_text: text.into(),
            ..Default::default()
        }
    }

    pub fn phonebook(field: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            custom_text: String::new(),
            phonebook_data: field.into(),
            variable_from: VariableSource::PhonebookData,
            fallback_value: fallback.into(),
        }
    }

    /// Value shown in a preview for the placeholder at `index`
    pub fn preview_value(&self, index: usize) -> String {
        match self.variable_from {
            VariableSource::CustomText => self.custom_text.clone(),
            VariableSource::PhonebookData if !self.fallback_value.is_empty() => {
                self.fallback_value.clone()
            }
            VariableSource::PhonebookData => ordinal(index),
        }
    }
}

/// `{{n}}` for the zero-based slot `index`
pub(crate) fn ordinal(index: usize) -> String {
    format!("{{{{{}}}}}", index + 1)
}

/// Reference to uploaded media or a public link
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl MediaRef {
    pub fn new(media_id: Option<String>, link: Option<String>) -> Self {
        Self { media_id, link }
    }

    /// True when neither a media id nor a link is set
    pub fn is_missing(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.media_id) && blank(&self.link)
    }
}

/// Header data, shaped by the template header's format
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum HeaderBinding {
    #[default]
    None,
    Text {
        #[serde(default)]
        variables: Vec<TemplateVariableBinding>,
    },
    Image(MediaRef),
    Video(MediaRef),
    Document(MediaRef),
}

impl HeaderBinding {
    pub fn for_header(header: Option<&HeaderComponent>) -> Self {
        let Some(header) = header else {
            return HeaderBinding::None;
        };

        match header.format {
            HeaderFormat::Text => HeaderBinding::Text {
                variables: default_variables(header.variable_text()),
            },
            HeaderFormat::Image => HeaderBinding::Image(MediaRef::default()),
            HeaderFormat::Video => HeaderBinding::Video(MediaRef::default()),
            HeaderFormat::Document => HeaderBinding::Document(MediaRef::default()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HeaderBinding::None => "NONE",
            HeaderBinding::Text { .. } => "TEXT",
            HeaderBinding::Image(_) => "IMAGE",
            HeaderBinding::Video(_) => "VIDEO",
            HeaderBinding::Document(_) => "DOCUMENT",
        }
    }

    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            HeaderBinding::Image(m) | HeaderBinding::Video(m) | HeaderBinding::Document(m) => {
                Some(m)
            }
            _ => None,
        }
    }

    fn media_mut(&mut self) -> Option<&mut MediaRef> {
        match self {
            HeaderBinding::Image(m) | HeaderBinding::Video(m) | HeaderBinding::Document(m) => {
                Some(m)
            }
            _ => None,
        }
    }

    pub fn variables(&self) -> &[TemplateVariableBinding] {
        match self {
            HeaderBinding::Text { variables } => variables,
            _ => &[],
        }
    }
}

/// Bindings for one carousel card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarouselCardBinding {
    #[serde(default)]
    pub header: MediaRef,

    #[serde(default)]
    pub body: Vec<TemplateVariableBinding>,

    #[serde(default)]
    pub buttons: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarouselBinding {
    #[serde(default)]
    pub cards: Vec<CarouselCardBinding>,
}

/// All variable data for one template send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBindings {
    pub template_id: String,

    #[serde(default)]
    pub header: HeaderBinding,

    #[serde(default)]
    pub body: Vec<TemplateVariableBinding>,

    /// Outer index per button, inner index per placeholder in its URL
    #[serde(default)]
    pub buttons: Vec<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel: Option<CarouselBinding>,
}

fn default_variables(text: Option<&str>) -> Vec<TemplateVariableBinding> {
    (0..crate::template::count_placeholders(text))
        .map(TemplateVariableBinding::placeholder)
        .collect()
}

fn default_button_slots(buttons: &[TemplateButton]) -> Vec<Vec<String>> {
    buttons
        .iter()
        .map(|b| (0..b.placeholder_count()).map(ordinal).collect())
        .collect()
}

/// Allocate default bindings for every placeholder slot of a template
pub fn bind_template(template: &WhatsAppTemplate) -> TemplateBindings {
    let carousel = template.carousel().map(|carousel| CarouselBinding {
        cards: carousel
            .cards
            .iter()
            .map(|card| CarouselCardBinding {
                header: MediaRef::default(),
                body: default_variables(card.body().map(|b| b.text.as_str())),
                buttons: default_button_slots(card.buttons()),
            })
            .collect(),
    });

    TemplateBindings {
        template_id: template.id.clone(),
        header: HeaderBinding::for_header(template.header()),
        body: default_variables(template.body().map(|b| b.text.as_str())),
        buttons: default_button_slots(template.buttons()),
        carousel,
    }
}

/// A single edit made in the composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BindingEdit {
    HeaderMedia {
        #[serde(default)]
        media_id: Option<String>,
        #[serde(default)]
        link: Option<String>,
    },
    HeaderVariable {
        index: usize,
        binding: TemplateVariableBinding,
    },
    BodyVariable {
        index: usize,
        binding: TemplateVariableBinding,
    },
    ButtonVariable {
        button: usize,
        slot: usize,
        value: String,
    },
    CardHeaderMedia {
        card: usize,
        #[serde(default)]
        media_id: Option<String>,
        #[serde(default)]
        link: Option<String>,
    },
    CardBodyVariable {
        card: usize,
        index: usize,
        binding: TemplateVariableBinding,
    },
    CardButtonVariable {
        card: usize,
        button: usize,
        slot: usize,
        value: String,
    },
}

fn slot_mut<'a, T>(items: &'a mut [T], index: usize, target: &str) -> Result<&'a mut T, BindingError> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| BindingError::SlotOutOfRange {
        target: target.to_string(),
        index,
        len,
    })
}

impl TemplateBindings {
    /// Apply one edit in place. Slots are never added or removed.
    pub fn apply(&mut self, edit: BindingEdit) -> Result<(), BindingError> {
        match edit {
            BindingEdit::HeaderMedia { media_id, link } => {
                let kind = self.header.kind();
                let media = self
                    .header
                    .media_mut()
                    .ok_or(BindingError::NotMediaHeader(kind))?;
                *media = MediaRef::new(media_id, link);
            }
            BindingEdit::HeaderVariable { index, binding } => {
                let kind = self.header.kind();
                match &mut self.header {
                    HeaderBinding::Text { variables } => {
                        *slot_mut(variables, index, "header variable")? = binding;
                    }
                    _ => return Err(BindingError::NotTextHeader(kind)),
                }
            }
            BindingEdit::BodyVariable { index, binding } => {
                *slot_mut(&mut self.body, index, "body variable")? = binding;
            }
            BindingEdit::ButtonVariable {
                button,
                slot,
                value,
            } => {
                let slots = slot_mut(&mut self.buttons, button, "button")?;
                *slot_mut(slots, slot, "button variable")? = value;
            }
            BindingEdit::CardHeaderMedia {
                card,
                media_id,
                link,
            } => {
                let card = self.card_mut(card)?;
                card.header = MediaRef::new(media_id, link);
            }
            BindingEdit::CardBodyVariable {
                card,
                index,
                binding,
            } => {
                let card = self.card_mut(card)?;
                *slot_mut(&mut card.body, index, "card body variable")? = binding;
            }
            BindingEdit::CardButtonVariable {
                card,
                button,
                slot,
                value,
            } => {
                let card = self.card_mut(card)?;
                let slots = slot_mut(&mut card.buttons, button, "card button")?;
                *slot_mut(slots, slot, "card button variable")? = value;
            }
        }

        Ok(())
    }

    fn card_mut(&mut self, card: usize) -> Result<&mut CarouselCardBinding, BindingError> {
        let carousel = self.carousel.as_mut().ok_or(BindingError::NoCarousel)?;
        slot_mut(&mut carousel.cards, card, "carousel card")
    }

    /// Describe how these bindings differ in shape from the template's slots
    pub fn shape_mismatch(&self, template: &WhatsAppTemplate) -> Option<String> {
        if self.template_id != template.id {
            return Some(format!(
                "bindings are for template '{}', not '{}'",
                self.template_id, template.id
            ));
        }

        let expected = bind_template(template);

        if self.header.kind() != expected.header.kind() {
            return Some(format!(
                "header is {}, template expects {}",
                self.header.kind(),
                expected.header.kind()
            ));
        }
        if self.header.variables().len() != expected.header.variables().len() {
            return Some("header variable count does not match template".to_string());
        }
        if self.body.len() != expected.body.len() {
            return Some("body variable count does not match template".to_string());
        }
        if !same_slots(&self.buttons, &expected.buttons) {
            return Some("button variables do not match template".to_string());
        }

        match (&self.carousel, &expected.carousel) {
            (None, None) => None,
            (Some(actual), Some(wanted)) => {
                if actual.cards.len() != wanted.cards.len() {
                    return Some(format!(
                        "carousel has {} cards, template has {}",
                        actual.cards.len(),
                        wanted.cards.len()
                    ));
                }
                actual
                    .cards
                    .iter()
                    .zip(&wanted.cards)
                    .position(|(a, w)| {
                        a.body.len() != w.body.len() || !same_slots(&a.buttons, &w.buttons)
                    })
                    .map(|i| format!("carousel card {} does not match template", i + 1))
            }
            (Some(_), None) => Some("template has no carousel".to_string()),
            (None, Some(_)) => Some("carousel bindings are missing".to_string()),
        }
    }
}

fn same_slots(actual: &[Vec<String>], expected: &[Vec<String>]) -> bool {
    actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, e)| a.len() == e.len())
}
