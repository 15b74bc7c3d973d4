use serde::{Deserialize, Serialize};

use super::endpoint::{ModelEndpoint, endpoint_label};
use super::message::Message;
use super::plugin::Plugin;
use super::settings::{EndpointSettings, ParseMode, RawSettings};
use super::timestamp::Timestamp;
use crate::error::{ContractError, ContractResult};

/// A chat session and the provider settings it runs with.
///
/// Deserializing checks that every provider field present belongs to the
/// conversation's endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConversationWire", into = "ConversationWire")]
pub struct Conversation {
    /// `None` until the server has created the conversation.
    pub conversation_id: Option<String>,
    pub title: String,
    pub user: Option<String>,
    pub suggestions: Option<Vec<String>>,
    pub messages: Option<Vec<Message>>,
    pub tools: Option<Vec<Plugin>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub settings: EndpointSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationWire {
    conversation_id: Option<String>,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    endpoint: Option<ModelEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Plugin>>,
    created_at: Timestamp,
    updated_at: Timestamp,
    #[serde(flatten)]
    settings: RawSettings,
}

impl TryFrom<ConversationWire> for Conversation {
    type Error = ContractError;

    fn try_from(wire: ConversationWire) -> ContractResult<Self> {
        // Preset-only keys never belong on a conversation.
        for (field, present) in [
            ("jailbreakPresetId", wire.settings.jailbreak_preset_id.is_some()),
            ("presetSignature", wire.settings.preset_signature.is_some()),
        ] {
            if present {
                return Err(ContractError::FieldNotAllowed {
                    field,
                    endpoint: endpoint_label(wire.endpoint),
                });
            }
        }

        let settings = EndpointSettings::from_raw(wire.endpoint, wire.settings, ParseMode::Strict)?;
        Ok(Conversation {
            conversation_id: wire.conversation_id,
            title: wire.title,
            user: wire.user,
            suggestions: wire.suggestions,
            messages: wire.messages,
            tools: wire.tools,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            settings,
        })
    }
}

impl From<Conversation> for ConversationWire {
    fn from(conversation: Conversation) -> Self {
        let mut settings = conversation.settings.to_raw();
        settings.invocation_id_as_text();
        ConversationWire {
            conversation_id: conversation.conversation_id,
            title: conversation.title,
            user: conversation.user,
            endpoint: conversation.settings.endpoint(),
            suggestions: conversation.suggestions,
            messages: conversation.messages,
            tools: conversation.tools,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            settings,
        }
    }
}

impl Conversation {
    /// An unsaved conversation on `settings`' endpoint.
    pub fn new(title: impl Into<String>, settings: EndpointSettings) -> Self {
        let now = Timestamp::now();
        Self {
            conversation_id: None,
            title: title.into(),
            user: None,
            suggestions: None,
            messages: None,
            tools: None,
            created_at: now,
            updated_at: now,
            settings,
        }
    }

    pub fn endpoint(&self) -> Option<ModelEndpoint> {
        self.settings.endpoint()
    }

    pub fn from_json(json: &str) -> ContractResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::OpenAiSettings;
    use serde_json::json;

    #[test]
    fn openai_conversation_needs_no_foreign_fields() {
        let value = json!({
            "conversationId": "c1",
            "title": "Demo",
            "endpoint": "openAI",
            "chatGptLabel": "Assistant",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let convo: Conversation = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(convo.endpoint(), Some(ModelEndpoint::OpenAi));
        let EndpointSettings::OpenAi(OpenAiSettings { chat_gpt_label, .. }) = &convo.settings else {
            panic!("expected openAI settings");
        };
        assert_eq!(chat_gpt_label.as_deref(), Some("Assistant"));
        assert_eq!(serde_json::to_value(&convo).unwrap(), value);
    }

    #[test]
    fn unsaved_conversation_serializes_null_id_and_endpoint() {
        let convo = Conversation::new("New Chat", EndpointSettings::Unset);
        let value = serde_json::to_value(&convo).unwrap();
        assert_eq!(value["conversationId"], serde_json::Value::Null);
        assert_eq!(value["endpoint"], serde_json::Value::Null);
        assert!(value.get("model").is_none());
    }

    #[test]
    fn bing_invocation_id_is_written_as_string() {
        let convo = Conversation::from_json(
            r#"{"conversationId":"c2","title":"Bing","endpoint":"bingAI","invocationId":2,
                "jailbreak":false,"toneStyle":"fast",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&convo).unwrap();
        assert_eq!(value["invocationId"], "2");
        assert_eq!(value["toneStyle"], "fast");
    }

    #[test]
    fn preset_keys_are_rejected() {
        let err = Conversation::from_json(
            r#"{"conversationId":"c3","title":"x","endpoint":"bingAI","presetSignature":"s",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("presetSignature"));
    }
}
