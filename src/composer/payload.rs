//! Outbound request bodies for the messaging backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::binding::TemplateBindings;
use super::validation::{validate, ValidationError};
use crate::template::WhatsAppTemplate;

/// Broadcast send parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTarget {
    pub device_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Phonebook labels whose contacts receive the broadcast
    #[serde(default)]
    pub labels: Vec<String>,
    /// Extra recipient phone numbers
    #[serde(default)]
    pub numbers: Vec<String>,
    /// Scheduled send time; immediate when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_at: Option<DateTime<Utc>>,
}

/// Where a composed template message goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComposeTarget {
    Broadcast(BroadcastTarget),
    Conversation { conversation_id: String },
}

impl ComposeTarget {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            ComposeTarget::Broadcast(_) => "broadcast",
            ComposeTarget::Conversation { .. } => "conversation",
        }
    }

    fn check(&self) -> Result<(), ValidationError> {
        match self {
            ComposeTarget::Broadcast(b) => {
                if b.device_id.trim().is_empty() {
                    return Err(ValidationError::MissingDevice);
                }
                if !is_path_segment(b.device_id.trim()) {
                    return Err(ValidationError::InvalidDeviceId(b.device_id.clone()));
                }
                if b.name.trim().is_empty() {
                    return Err(ValidationError::MissingBroadcastName);
                }
                let has_recipient = b
                    .labels
                    .iter()
                    .chain(&b.numbers)
                    .any(|r| !r.trim().is_empty());
                if !has_recipient {
                    return Err(ValidationError::NoRecipients);
                }
                Ok(())
            }
            ComposeTarget::Conversation { conversation_id } => {
                if conversation_id.trim().is_empty() {
                    Err(ValidationError::MissingConversation)
                } else if !is_path_segment(conversation_id.trim()) {
                    Err(ValidationError::InvalidConversationId(conversation_id.clone()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Ids are spliced into the backend path, so they must stay one segment
fn is_path_segment(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A ready-to-send request for the messaging backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: serde_json::Value,
}

/// Validate bindings and build the backend request for `target`
pub fn compose(
    template: &WhatsAppTemplate,
    bindings: &TemplateBindings,
    target: &ComposeTarget,
) -> Result<ComposedRequest, ValidationError> {
    validate(Some(template), Some(bindings))?;
    target.check()?;

    let mut body = json!({
        "template_id": template.id,
        "template_name": template.name,
        "language": template.language,
        "template_header": bindings.header,
        "template_body": bindings.body,
        "template_buttons": bindings.buttons,
    });
    if let Some(carousel) = &bindings.carousel {
        body["template_carousel"] = json!(carousel);
    }

    let path = match target {
        ComposeTarget::Broadcast(b) => {
            body["name"] = json!(b.name.trim());
            body["description"] = json!(b.description);
            body["labels"] = json!(b.labels);
            body["numbers"] = json!(b.numbers);
            if let Some(at) = b.broadcast_at {
                body["broadcast_at"] = json!(at);
            }
            format!("/message/{}/send-broadcast", b.device_id.trim())
        }
        ComposeTarget::Conversation { conversation_id } => {
            body["type"] = json!("template");
            format!("/conversation/{}/send-message", conversation_id.trim())
        }
    };

    Ok(ComposedRequest {
        method: "POST",
        path,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::binding::{bind_template, BindingEdit, TemplateVariableBinding};
    use pretty_assertions::assert_eq;

    fn template() -> WhatsAppTemplate {
        serde_json::from_value(json!({
            "id": "reminder",
            "name": "appointment_reminder",
            "language": "en",
            "components": [
                {"type": "BODY", "text": "Hi {{1}}, see you at {{2}}"}
            ]
        }))
        .unwrap()
    }

    fn broadcast() -> BroadcastTarget {
        BroadcastTarget {
            device_id: "dev-1".to_string(),
            name: "October reminders".to_string(),
            description: String::new(),
            labels: vec!["customers".to_string()],
            numbers: vec![],
            broadcast_at: None,
        }
    }

    #[test]
    fn test_compose_conversation() {
        let t = template();
        let mut bindings = bind_template(&t);
        bindings
            .apply(BindingEdit::BodyVariable {
                index: 0,
                binding: TemplateVariableBinding::phonebook("first_name", "there"),
            })
            .unwrap();

        let target = ComposeTarget::Conversation {
            conversation_id: "c-42".to_string(),
        };
        let request = compose(&t, &bindings, &target).unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/conversation/c-42/send-message");
        assert_eq!(
            request.body,
            json!({
                "type": "template",
                "template_id": "reminder",
                "template_name": "appointment_reminder",
                "language": "en",
                "template_header": {"type": "NONE"},
                "template_body": [
                    {"custom_text": "", "phonebook_data": "first_name",
                     "variable_from": "phonebook_data", "fallback_value": "there"},
                    {"custom_text": "{{2}}", "phonebook_data": "",
                     "variable_from": "custom_text", "fallback_value": ""}
                ],
                "template_buttons": []
            })
        );
    }

    #[test]
    fn test_compose_broadcast() {
        let t = template();
        let bindings = bind_template(&t);

        let request = compose(&t, &bindings, &ComposeTarget::Broadcast(broadcast())).unwrap();
        assert_eq!(request.path, "/message/dev-1/send-broadcast");
        assert_eq!(request.body["name"], "October reminders");
        assert_eq!(request.body["labels"], json!(["customers"]));
        assert!(request.body.get("broadcast_at").is_none());
    }

    #[test]
    fn test_compose_broadcast_requires_recipients() {
        let t = template();
        let bindings = bind_template(&t);
        let mut target = broadcast();
        target.labels = vec![" ".to_string()];

        assert_eq!(
            compose(&t, &bindings, &ComposeTarget::Broadcast(target)),
            Err(ValidationError::NoRecipients)
        );
    }

    #[test]
    fn test_compose_rejects_before_target_checks() {
        let t = template();
        let mut bindings = bind_template(&t);
        bindings.body[0] = TemplateVariableBinding::phonebook("", "x");

        let target = ComposeTarget::Conversation {
            conversation_id: String::new(),
        };
        assert_eq!(
            compose(&t, &bindings, &target).unwrap_err().code(),
            "missing_phonebook_field"
        );
    }

    #[test]
    fn test_compose_rejects_ids_outside_one_path_segment() {
        let t = template();
        let bindings = bind_template(&t);

        for id in ["../../admin/users?x=", "c/42", "c-42#top", "c 42", "dévice"] {
            let target = ComposeTarget::Conversation {
                conversation_id: id.to_string(),
            };
            assert_eq!(
                compose(&t, &bindings, &target),
                Err(ValidationError::InvalidConversationId(id.to_string()))
            );
        }

        let mut target = broadcast();
        target.device_id = "dev-1/../other".to_string();
        assert_eq!(
            compose(&t, &bindings, &ComposeTarget::Broadcast(target))
                .unwrap_err()
                .code(),
            "invalid_device_id"
        );

        let target = ComposeTarget::Conversation {
            conversation_id: "65f1c0_ab-9".to_string(),
        };
        assert_eq!(
            compose(&t, &bindings, &target).unwrap().path,
            "/conversation/65f1c0_ab-9/send-message"
        );
    }

    #[test]
    fn test_target_wire_shape() {
        let target: ComposeTarget = serde_json::from_value(json!({
            "kind": "broadcast",
            "device_id": "d",
            "name": "n",
            "labels": ["vip"],
            "broadcast_at": "2026-10-20T09:00:00Z"
        }))
        .unwrap();

        match target {
            ComposeTarget::Broadcast(b) => {
                assert_eq!(b.labels, vec!["vip"]);
                assert!(b.broadcast_at.is_some());
            }
            _ => panic!("expected broadcast"),
        }
    }
}
