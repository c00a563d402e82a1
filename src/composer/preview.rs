//! Data-only preview of a template message bubble

use serde::Serialize;

use super::binding::{MediaRef, TemplateBindings, TemplateVariableBinding};
use crate::template::{
    interpolate, interpolate_with_examples, HeaderComponent, HeaderFormat, TemplateButton,
    WhatsAppTemplate,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewHeader {
    Text {
        text: String,
    },
    Media {
        format: HeaderFormat,
        #[serde(skip_serializing_if = "Option::is_none")]
        media_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewButton {
    pub kind: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PreviewHeader>,
    pub body: String,
    pub buttons: Vec<PreviewButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePreview {
    pub template_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PreviewHeader>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub buttons: Vec<PreviewButton>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<PreviewCard>,
}

fn values(variables: &[TemplateVariableBinding]) -> Vec<String> {
    variables
        .iter()
        .enumerate()
        .map(|(i, v)| v.preview_value(i))
        .collect()
}

fn media_header(format: HeaderFormat, media: Option<&MediaRef>, example: Option<&str>) -> PreviewHeader {
    match media {
        Some(m) => PreviewHeader::Media {
            format,
            media_id: m.media_id.clone(),
            link: m.link.clone(),
        },
        None => PreviewHeader::Media {
            format,
            media_id: None,
            link: example.map(str::to_string),
        },
    }
}

fn header_preview(
    header: &HeaderComponent,
    bindings: Option<&TemplateBindings>,
) -> PreviewHeader {
    match header.format {
        HeaderFormat::Text => {
            let text = header.text.as_deref().unwrap_or_default();
            let text = match bindings {
                Some(b) => interpolate(text, &values(b.header.variables())),
                None => interpolate_with_examples(text, header.example_text()),
            };
            PreviewHeader::Text { text }
        }
        format => media_header(
            format,
            bindings.and_then(|b| b.header.media()),
            header.example_handle(),
        ),
    }
}

fn button_previews(buttons: &[TemplateButton], slots: Option<&[Vec<String>]>) -> Vec<PreviewButton> {
    buttons
        .iter()
        .enumerate()
        .map(|(i, button)| {
            let url = match button {
                TemplateButton::Url { url, example, .. } => Some(match slots {
                    Some(slots) => interpolate(url, slots.get(i).map(Vec::as_slice).unwrap_or(&[])),
                    // Meta stores the full example URL rather than the variable part
                    None => example.first().cloned().unwrap_or_else(|| url.clone()),
                }),
                _ => None,
            };
            let phone_number = match button {
                TemplateButton::PhoneNumber { phone_number, .. } => Some(phone_number.clone()),
                _ => None,
            };

            PreviewButton {
                kind: button.kind(),
                label: button.label().to_string(),
                url,
                phone_number,
            }
        })
        .collect()
}

/// Render a preview of `template`.
///
/// With bindings, custom text is shown verbatim and phonebook variables show
/// their fallback value (or stay as `{{n}}` when there is none). Without
/// bindings the template's stored example values are used.
pub fn render_preview(
    template: &WhatsAppTemplate,
    bindings: Option<&TemplateBindings>,
) -> TemplatePreview {
    let body = template
        .body()
        .map(|body| match bindings {
            Some(b) => interpolate(&body.text, &values(&b.body)),
            None => interpolate_with_examples(&body.text, body.example_text()),
        })
        .unwrap_or_default();

    let cards = template
        .carousel()
        .map(|carousel| {
            carousel
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| {
                    let card_binding = bindings
                        .and_then(|b| b.carousel.as_ref())
                        .and_then(|c| c.cards.get(i));

                    let header = card.header().map(|h| {
                        media_header(
                            h.format,
                            card_binding.map(|c| &c.header),
                            h.example_handle(),
                        )
                    });
                    let body = card
                        .body()
                        .map(|body| match card_binding {
                            Some(c) => interpolate(&body.text, &values(&c.body)),
                            None => interpolate_with_examples(&body.text, body.example_text()),
                        })
                        .unwrap_or_default();
                    let buttons =
                        button_previews(card.buttons(), card_binding.map(|c| c.buttons.as_slice()));

                    PreviewCard {
                        header,
                        body,
                        buttons,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    TemplatePreview {
        template_id: template.id.clone(),
        name: template.name.clone(),
        header: template.header().map(|h| header_preview(h, bindings)),
        body,
        footer: template.footer().map(|f| f.text.clone()),
        buttons: button_previews(template.buttons(), bindings.map(|b| b.buttons.as_slice())),
        cards,
    }
}
