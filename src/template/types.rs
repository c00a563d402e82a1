//! Template types and error definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::placeholder::{count_placeholders, is_contiguous};

/// Maximum number of buttons WhatsApp accepts on a template
const MAX_BUTTONS: usize = 10;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Failed to read template seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse template seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateCategory {
    #[default]
    Marketing,
    Utility,
    Authentication,
}

/// Approval status as reported by Meta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateStatus {
    Approved,
    #[default]
    Pending,
    Rejected,
    Paused,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeaderFormat {
    Text,
    Image,
    Video,
    Document,
}

impl HeaderFormat {
    pub fn is_media(&self) -> bool {
        !matches!(self, HeaderFormat::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFormat::Text => "TEXT",
            HeaderFormat::Image => "IMAGE",
            HeaderFormat::Video => "VIDEO",
            HeaderFormat::Document => "DOCUMENT",
        }
    }
}

/// Sample values Meta keeps alongside a header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderExample {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_text: Vec<String>,

    /// Sample media handles or links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_handle: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderComponent {
    pub format: HeaderFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<HeaderExample>,
}

impl HeaderComponent {
    /// Text used for placeholder scanning (None for media headers)
    pub fn variable_text(&self) -> Option<&str> {
        match self.format {
            HeaderFormat::Text => self.text.as_deref(),
            _ => None,
        }
    }

    pub fn example_text(&self) -> Option<&[String]> {
        self.example.as_ref().map(|e| e.header_text.as_slice())
    }

    pub fn example_handle(&self) -> Option<&str> {
        self.example
            .as_ref()
            .and_then(|e| e.header_handle.first())
            .map(String::as_str)
    }
}

/// Sample values for body placeholders; Meta nests them one level deep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyExample {
    #[serde(default)]
    pub body_text: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyComponent {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<BodyExample>,
}

impl BodyComponent {
    pub fn example_text(&self) -> Option<&[String]> {
        self.example
            .as_ref()
            .and_then(|e| e.body_text.first())
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterComponent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateButton {
    QuickReply {
        text: String,
    },
    Url {
        text: String,
        url: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        example: Vec<String>,
    },
    PhoneNumber {
        text: String,
        phone_number: String,
    },
    CopyCode {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        example: Vec<String>,
    },
}

impl TemplateButton {
    /// Text that may carry placeholders the sender must fill
    pub fn variable_text(&self) -> Option<&str> {
        match self {
            TemplateButton::Url { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Label shown on the button
    pub fn label(&self) -> &str {
        match self {
            TemplateButton::QuickReply { text }
            | TemplateButton::Url { text, .. }
            | TemplateButton::PhoneNumber { text, .. } => text,
            TemplateButton::CopyCode { .. } => "Copy code",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TemplateButton::QuickReply { .. } => "QUICK_REPLY",
            TemplateButton::Url { .. } => "URL",
            TemplateButton::PhoneNumber { .. } => "PHONE_NUMBER",
            TemplateButton::CopyCode { .. } => "COPY_CODE",
        }
    }

    pub fn example(&self) -> Option<&[String]> {
        match self {
            TemplateButton::Url { example, .. } | TemplateButton::CopyCode { example } => {
                Some(example.as_slice())
            }
            _ => None,
        }
    }

    /// Number of placeholders the sender has to fill for this button
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(self.variable_text())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonsComponent {
    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
}

/// One swipeable card inside a carousel template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarouselCard {
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
}

impl CarouselCard {
    pub fn header(&self) -> Option<&HeaderComponent> {
        find_header(&self.components)
    }

    pub fn body(&self) -> Option<&BodyComponent> {
        find_body(&self.components)
    }

    pub fn buttons(&self) -> &[TemplateButton] {
        find_buttons(&self.components)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarouselComponent {
    #[serde(default)]
    pub cards: Vec<CarouselCard>,
}

/// A template component, closed over the kinds WhatsApp defines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TemplateComponent {
    Header(HeaderComponent),
    Body(BodyComponent),
    Footer(FooterComponent),
    Buttons(ButtonsComponent),
    Carousel(CarouselComponent),
}

impl TemplateComponent {
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateComponent::Header(_) => "HEADER",
            TemplateComponent::Body(_) => "BODY",
            TemplateComponent::Footer(_) => "FOOTER",
            TemplateComponent::Buttons(_) => "BUTTONS",
            TemplateComponent::Carousel(_) => "CAROUSEL",
        }
    }
}

fn find_header(components: &[TemplateComponent]) -> Option<&HeaderComponent> {
    components.iter().find_map(|c| match c {
        TemplateComponent::Header(h) => Some(h),
        _ => None,
    })
}

fn find_body(components: &[TemplateComponent]) -> Option<&BodyComponent> {
    components.iter().find_map(|c| match c {
        TemplateComponent::Body(b) => Some(b),
        _ => None,
    })
}

fn find_buttons(components: &[TemplateComponent]) -> &[TemplateButton] {
    components
        .iter()
        .find_map(|c| match c {
            TemplateComponent::Buttons(b) => Some(b.buttons.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
}

/// A WhatsApp message template as registered with Meta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppTemplate {
    /// Unique template identifier (alphanumeric, dash, underscore)
    pub id: String,

    /// Template name registered with Meta
    pub name: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub category: TemplateCategory,

    #[serde(default)]
    pub status: TemplateStatus,

    #[serde(default)]
    pub components: Vec<TemplateComponent>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_language() -> String {
    "en_US".to_string()
}

impl WhatsAppTemplate {
    pub fn header(&self) -> Option<&HeaderComponent> {
        find_header(&self.components)
    }

    pub fn body(&self) -> Option<&BodyComponent> {
        find_body(&self.components)
    }

    pub fn footer(&self) -> Option<&FooterComponent> {
        self.components.iter().find_map(|c| match c {
            TemplateComponent::Footer(f) => Some(f),
            _ => None,
        })
    }

    pub fn buttons(&self) -> &[TemplateButton] {
        find_buttons(&self.components)
    }

    pub fn carousel(&self) -> Option<&CarouselComponent> {
        self.components.iter().find_map(|c| match c {
            TemplateComponent::Carousel(c) => Some(c),
            _ => None,
        })
    }

    /// Validate the template
    pub fn validate(&self) -> TemplateResult<()> {
        if self.id.is_empty() || self.id.len() > 64 {
            return Err(TemplateError::InvalidId(
                "ID must be 1-64 characters".to_string(),
            ));
        }

        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidId(
                "ID must contain only alphanumeric, dash, or underscore".to_string(),
            ));
        }

        if self.name.is_empty() || self.name.len() > 512 {
            return Err(TemplateError::InvalidTemplate(
                "Name must be 1-512 characters".to_string(),
            ));
        }

        validate_components(&self.components, "template")?;

        if let Some(carousel) = self.carousel() {
            if carousel.cards.is_empty() {
                return Err(invalid("carousel must contain at least one card"));
            }

            for (i, card) in carousel.cards.iter().enumerate() {
                let scope = format!("carousel card {}", i + 1);
                if card
                    .components
                    .iter()
                    .any(|c| matches!(c, TemplateComponent::Carousel(_)))
                {
                    return Err(invalid(format!("{} cannot contain a carousel", scope)));
                }

                match card.header() {
                    Some(h) if h.format.is_media() => {}
                    _ => {
                        return Err(invalid(format!("{} requires a media header", scope)));
                    }
                }

                validate_components(&card.components, &scope)?;
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> TemplateError {
    TemplateError::InvalidTemplate(message.into())
}

fn validate_components(components: &[TemplateComponent], scope: &str) -> TemplateResult<()> {
    let mut seen: Vec<&'static str> = Vec::new();
    for component in components {
        let kind = component.kind();
        if seen.contains(&kind) {
            return Err(invalid(format!("{} has more than one {} component", scope, kind)));
        }
        seen.push(kind);
    }

    let body = find_body(components)
        .ok_or_else(|| invalid(format!("{} requires a BODY component", scope)))?;
    check_placeholders(Some(&body.text), scope, "body")?;

    if let Some(header) = find_header(components) {
        if header.format == HeaderFormat::Text {
            let text = header.text.as_deref().unwrap_or_default();
            if text.is_empty() {
                return Err(invalid(format!("{} TEXT header requires text", scope)));
            }
            check_placeholders(Some(text), scope, "header")?;
        }
    }

    let buttons = find_buttons(components);
    if buttons.len() > MAX_BUTTONS {
        return Err(invalid(format!(
            "{} has {} buttons, at most {} allowed",
            scope,
            buttons.len(),
            MAX_BUTTONS
        )));
    }
    for button in buttons {
        check_placeholders(button.variable_text(), scope, "button")?;
    }

    Ok(())
}

fn check_placeholders(text: Option<&str>, scope: &str, part: &str) -> TemplateResult<()> {
    if is_contiguous(text) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} {} placeholders must be numbered {{{{1}}}}..{{{{n}}}} without gaps",
            scope, part
        )))
    }
}

/// Request to create a new template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub id: String,
    pub name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default)]
    pub status: TemplateStatus,
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
}

impl From<CreateTemplateRequest> for WhatsAppTemplate {
    fn from(req: CreateTemplateRequest) -> Self {
        let now = Utc::now();
        WhatsAppTemplate {
            id: req.id,
            name: req.name,
            language: req.language,
            category: req.category,
            status: req.status,
            components: req.components,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing template
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    pub category: Option<TemplateCategory>,
    pub status: Option<TemplateStatus>,
    pub components: Option<Vec<TemplateComponent>>,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<WhatsAppTemplate>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> WhatsAppTemplate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_upstream_shape() {
        let template = parse(json!({
            "id": "order_update",
            "name": "order_update",
            "category": "UTILITY",
            "status": "APPROVED",
            "components": [
                {"type": "HEADER", "format": "IMAGE", "example": {"header_handle": ["https://cdn/x.png"]}},
                {"type": "BODY", "text": "Hi {{1}}, order {{2}}", "example": {"body_text": [["Ann", "#42"]]}},
                {"type": "FOOTER", "text": "Reply STOP to opt out"},
                {"type": "BUTTONS", "buttons": [
                    {"type": "URL", "text": "Track", "url": "https://t.co/{{1}}"},
                    {"type": "QUICK_REPLY", "text": "Thanks"}
                ]}
            ]
        }));

        assert_eq!(template.language, "en_US");
        assert_eq!(template.category, TemplateCategory::Utility);
        assert_eq!(template.header().unwrap().format, HeaderFormat::Image);
        assert_eq!(
            template.body().unwrap().example_text().unwrap(),
            &["Ann".to_string(), "#42".to_string()]
        );
        assert_eq!(template.footer().unwrap().text, "Reply STOP to opt out");
        assert_eq!(template.buttons().len(), 2);
        assert_eq!(template.buttons()[0].placeholder_count(), 1);
        assert_eq!(template.buttons()[1].placeholder_count(), 0);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_unknown_component_kind_rejected_at_parse() {
        let result: Result<WhatsAppTemplate, _> = serde_json::from_value(json!({
            "id": "x",
            "name": "x",
            "components": [{"type": "STICKER"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_body() {
        let template = parse(json!({
            "id": "no-body",
            "name": "no body",
            "components": [{"type": "FOOTER", "text": "bye"}]
        }));
        assert!(matches!(
            template.validate(),
            Err(TemplateError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_validate_rejects_placeholder_gaps() {
        let template = parse(json!({
            "id": "gaps",
            "name": "gaps",
            "components": [{"type": "BODY", "text": "{{1}} and {{3}}"}]
        }));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_id() {
        let template = parse(json!({
            "id": "bad id!",
            "name": "x",
            "components": [{"type": "BODY", "text": "hi"}]
        }));
        assert!(matches!(template.validate(), Err(TemplateError::InvalidId(_))));
    }

    #[test]
    fn test_validate_rejects_non_ascii_id() {
        for id in ["café_promo", "заказ", "promo٣"] {
            let template = parse(json!({
                "id": id,
                "name": "x",
                "components": [{"type": "BODY", "text": "hi"}]
            }));
            assert!(matches!(template.validate(), Err(TemplateError::InvalidId(_))));
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_components() {
        let template = parse(json!({
            "id": "dup",
            "name": "dup",
            "components": [
                {"type": "BODY", "text": "a"},
                {"type": "BODY", "text": "b"}
            ]
        }));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_validate_carousel_card_needs_media_header() {
        let template = parse(json!({
            "id": "carousel",
            "name": "carousel",
            "components": [
                {"type": "BODY", "text": "Our picks"},
                {"type": "CAROUSEL", "cards": [
                    {"components": [
                        {"type": "HEADER", "format": "TEXT", "text": "nope"},
                        {"type": "BODY", "text": "Card {{1}}"}
                    ]}
                ]}
            ]
        }));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_copy_code_button_label() {
        let button: TemplateButton =
            serde_json::from_value(json!({"type": "COPY_CODE", "example": ["SAVE10"]})).unwrap();
        assert_eq!(button.kind(), "COPY_CODE");
        assert_eq!(button.label(), "Copy code");
        assert_eq!(button.placeholder_count(), 0);
    }
}
