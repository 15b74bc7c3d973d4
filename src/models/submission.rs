use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::Conversation;
use super::endpoint::{ModelEndpoint, endpoint_label};
use super::message::{Message, ROOT_PARENT_ID};
use super::settings::EndpointSettings;
use super::timestamp::Timestamp;
use crate::error::{ContractError, ContractResult};

/// Fresh id for a message the client is about to send.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Model parameters attached to a send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointOption {
    pub endpoint: Option<ModelEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl From<&EndpointSettings> for EndpointOption {
    fn from(settings: &EndpointSettings) -> Self {
        EndpointOption {
            endpoint: settings.endpoint(),
            model: settings.model().map(str::to_string),
            prompt_prefix: settings.prompt_prefix().map(str::to_string),
            temperature: settings.temperature(),
        }
    }
}

/// `overrideParentMessageId`: a replacement parent id, or a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentOverride {
    Flag(bool),
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BingOverrides {
    pub client_id: Option<String>,
    pub context: Option<String>,
    pub conversation_signature: Option<String>,
    pub jailbreak_conversation_id: Option<String>,
    pub system_message: Option<String>,
    pub tone_style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOverrides {
    pub model: Option<String>,
    pub prompt_prefix: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    /// Google only, alongside the sampling parameters.
    pub context: Option<String>,
    pub system_message: Option<String>,
}

/// Per-send overrides. Bing takes session fields, every other endpoint
/// takes sampling parameters, and `endpoint: null` takes neither.
/// `context` and `systemMessage` ride with Bing and Google.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionOverrides {
    #[default]
    None,
    Bing(BingOverrides),
    Model(ModelOverrides),
}

/// One in-flight send: the message, the conversation it belongs to and the
/// endpoint parameters to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SubmissionWire", into = "SubmissionWire")]
pub struct Submission {
    pub endpoint: Option<ModelEndpoint>,
    pub conversation_id: Option<String>,
    pub message_id: String,
    pub parent_message_id: Option<String>,
    pub override_parent_message_id: Option<ParentOverride>,
    pub sender: String,
    pub text: String,
    pub current: bool,
    pub is_created_by_user: bool,
    pub jailbreak: bool,
    pub invocation_id: u32,
    pub overrides: SubmissionOverrides,
    pub conversation: Conversation,
    pub message: Message,
    pub endpoint_option: EndpointOption,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_signature: Option<String>,
    current: bool,
    endpoint: Option<ModelEndpoint>,
    invocation_id: u32,
    is_created_by_user: bool,
    jailbreak: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    jailbreak_conversation_id: Option<String>,
    message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    override_parent_message_id: Option<ParentOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_message_id: Option<String>,
    sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_message: Option<String>,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "top_p", skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(rename = "presence_penalty", skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f64>,
    #[serde(rename = "frequency_penalty", skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f64>,
    #[serde(rename = "frequence_penalty", default, skip_serializing)]
    frequence_penalty: Option<f64>,
    conversation: Conversation,
    message: Message,
    endpoint_option: EndpointOption,
}

impl SubmissionWire {
    fn bing_fields(&self) -> [(&'static str, bool); 4] {
        [
            ("clientId", self.client_id.is_some()),
            ("conversationSignature", self.conversation_signature.is_some()),
            ("jailbreakConversationId", self.jailbreak_conversation_id.is_some()),
            ("toneStyle", self.tone_style.is_some()),
        ]
    }

    fn prompt_fields(&self) -> [(&'static str, bool); 2] {
        [
            ("context", self.context.is_some()),
            ("systemMessage", self.system_message.is_some()),
        ]
    }

    fn model_fields(&self) -> [(&'static str, bool); 6] {
        [
            ("model", self.model.is_some()),
            ("promptPrefix", self.prompt_prefix.is_some()),
            ("temperature", self.temperature.is_some()),
            ("top_p", self.top_p.is_some()),
            ("presence_penalty", self.presence_penalty.is_some()),
            ("frequency_penalty", self.frequency_penalty.is_some()),
        ]
    }
}

fn reject_present(fields: &[(&'static str, bool)], endpoint: Option<ModelEndpoint>) -> ContractResult<()> {
    match fields.iter().find(|(_, present)| *present) {
        Some(&(field, _)) => Err(ContractError::FieldNotAllowed {
            field,
            endpoint: endpoint_label(endpoint),
        }),
        None => Ok(()),
    }
}

fn check_endpoint(field: &'static str, expected: Option<ModelEndpoint>, found: Option<ModelEndpoint>) -> ContractResult<()> {
    if expected == found {
        return Ok(());
    }
    Err(ContractError::EndpointMismatch {
        field,
        expected: endpoint_label(expected),
        found: endpoint_label(found),
    })
}

impl TryFrom<SubmissionWire> for Submission {
    type Error = ContractError;

    fn try_from(mut wire: SubmissionWire) -> ContractResult<Self> {
        let endpoint = wire.endpoint;
        check_endpoint("conversation", endpoint, wire.conversation.endpoint())?;
        check_endpoint("endpointOption", endpoint, wire.endpoint_option.endpoint)?;

        if let Some(legacy) = wire.frequence_penalty.take() {
            match wire.frequency_penalty {
                Some(current) if current != legacy => {
                    return Err(ContractError::ConflictingFields {
                        field: "frequency_penalty",
                        alias: "frequence_penalty",
                    });
                }
                _ => {
                    tracing::warn!(value = legacy, "accepted legacy `frequence_penalty` spelling");
                    wire.frequency_penalty = Some(legacy);
                }
            }
        }

        let overrides = match endpoint {
            None => {
                reject_present(&wire.bing_fields(), endpoint)?;
                reject_present(&wire.prompt_fields(), endpoint)?;
                reject_present(&wire.model_fields(), endpoint)?;
                SubmissionOverrides::None
            }
            Some(ModelEndpoint::BingAi) => {
                reject_present(&wire.model_fields(), endpoint)?;
                SubmissionOverrides::Bing(BingOverrides {
                    client_id: wire.client_id,
                    context: wire.context,
                    conversation_signature: wire.conversation_signature,
                    jailbreak_conversation_id: wire.jailbreak_conversation_id,
                    system_message: wire.system_message,
                    tone_style: wire.tone_style,
                })
            }
            Some(other) => {
                reject_present(&wire.bing_fields(), endpoint)?;
                if other != ModelEndpoint::Google {
                    reject_present(&wire.prompt_fields(), endpoint)?;
                }
                SubmissionOverrides::Model(ModelOverrides {
                    model: wire.model,
                    prompt_prefix: wire.prompt_prefix,
                    temperature: wire.temperature,
                    top_p: wire.top_p,
                    presence_penalty: wire.presence_penalty,
                    frequency_penalty: wire.frequency_penalty,
                    context: wire.context,
                    system_message: wire.system_message,
                })
            }
        };

        Ok(Submission {
            endpoint,
            conversation_id: wire.conversation_id,
            message_id: wire.message_id,
            parent_message_id: wire.parent_message_id,
            override_parent_message_id: wire.override_parent_message_id,
            sender: wire.sender,
            text: wire.text,
            current: wire.current,
            is_created_by_user: wire.is_created_by_user,
            jailbreak: wire.jailbreak,
            invocation_id: wire.invocation_id,
            overrides,
            conversation: wire.conversation,
            message: wire.message,
            endpoint_option: wire.endpoint_option,
        })
    }
}

impl From<Submission> for SubmissionWire {
    fn from(submission: Submission) -> Self {
        let (bing, model) = match submission.overrides {
            SubmissionOverrides::None => (BingOverrides::default(), ModelOverrides::default()),
            SubmissionOverrides::Bing(bing) => (bing, ModelOverrides::default()),
            SubmissionOverrides::Model(model) => (BingOverrides::default(), model),
        };
        SubmissionWire {
            client_id: bing.client_id,
            context: bing.context.or(model.context),
            conversation_id: submission.conversation_id,
            conversation_signature: bing.conversation_signature,
            current: submission.current,
            endpoint: submission.endpoint,
            invocation_id: submission.invocation_id,
            is_created_by_user: submission.is_created_by_user,
            jailbreak: submission.jailbreak,
            jailbreak_conversation_id: bing.jailbreak_conversation_id,
            message_id: submission.message_id,
            override_parent_message_id: submission.override_parent_message_id,
            parent_message_id: submission.parent_message_id,
            sender: submission.sender,
            system_message: bing.system_message.or(model.system_message),
            text: submission.text,
            tone_style: bing.tone_style,
            model: model.model,
            prompt_prefix: model.prompt_prefix,
            temperature: model.temperature,
            top_p: model.top_p,
            presence_penalty: model.presence_penalty,
            frequency_penalty: model.frequency_penalty,
            frequence_penalty: None,
            conversation: submission.conversation,
            message: submission.message,
            endpoint_option: submission.endpoint_option,
        }
    }
}

fn overrides_from(settings: &EndpointSettings) -> SubmissionOverrides {
    match settings {
        EndpointSettings::Unset => SubmissionOverrides::None,
        EndpointSettings::Bing(s) => SubmissionOverrides::Bing(BingOverrides {
            client_id: s.client_id.clone(),
            context: s.context.clone(),
            conversation_signature: s.conversation_signature.clone(),
            jailbreak_conversation_id: s.jailbreak_conversation_id.clone(),
            system_message: s.system_message.clone(),
            tone_style: s.tone_style.clone(),
        }),
        EndpointSettings::OpenAi(s) | EndpointSettings::AzureOpenAi(s) => SubmissionOverrides::Model(ModelOverrides {
            model: s.model.clone(),
            prompt_prefix: s.prompt_prefix.clone(),
            temperature: s.temperature,
            top_p: s.top_p,
            presence_penalty: s.presence_penalty,
            frequency_penalty: s.frequency_penalty,
            context: None,
            system_message: None,
        }),
        EndpointSettings::Plugins(s) => SubmissionOverrides::Model(ModelOverrides {
            model: s.model.clone(),
            prompt_prefix: s.prompt_prefix.clone(),
            temperature: s.temperature,
            top_p: s.top_p,
            presence_penalty: s.presence_penalty,
            frequency_penalty: s.frequency_penalty,
            context: None,
            system_message: None,
        }),
        EndpointSettings::Google(s) => SubmissionOverrides::Model(ModelOverrides {
            model: s.model.clone(),
            prompt_prefix: s.prompt_prefix.clone(),
            temperature: s.temperature,
            context: s.context.clone(),
            system_message: s.system_message.clone(),
            ..Default::default()
        }),
        other => SubmissionOverrides::Model(ModelOverrides {
            model: other.model().map(str::to_string),
            prompt_prefix: other.prompt_prefix().map(str::to_string),
            temperature: other.temperature(),
            ..Default::default()
        }),
    }
}

impl Submission {
    /// Builds the submission for a user typing `text` into `conversation`.
    /// `parent_message_id` is the message being replied to; `None` starts a
    /// new thread at the root.
    pub fn compose(
        conversation: &Conversation,
        text: impl Into<String>,
        sender: impl Into<String>,
        parent_message_id: Option<&str>,
    ) -> Self {
        let text = text.into();
        let sender = sender.into();
        let message_id = new_message_id();
        let parent = parent_message_id.unwrap_or(ROOT_PARENT_ID).to_string();
        let conversation_id = conversation.conversation_id.clone();
        let now = Timestamp::now();

        let (jailbreak, invocation_id) = match &conversation.settings {
            EndpointSettings::Bing(bing) => (bing.jailbreak.unwrap_or(false), bing.invocation_id.unwrap_or(1)),
            _ => (false, 1),
        };

        let message = Message {
            message_id: message_id.clone(),
            conversation_id: conversation_id.clone().unwrap_or_default(),
            client_id: message_id.clone(),
            parent_message_id: parent.clone(),
            sender: sender.clone(),
            text: text.clone(),
            is_created_by_user: true,
            error: false,
            created_at: now,
            updated_at: now,
        };

        Submission {
            endpoint: conversation.endpoint(),
            conversation_id,
            message_id,
            parent_message_id: Some(parent),
            override_parent_message_id: None,
            sender,
            text,
            current: true,
            is_created_by_user: true,
            jailbreak,
            invocation_id,
            overrides: overrides_from(&conversation.settings),
            conversation: conversation.clone(),
            message,
            endpoint_option: EndpointOption::from(&conversation.settings),
        }
    }

    pub fn from_json(json: &str) -> ContractResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{BingSettings, OpenAiSettings};

    fn openai_conversation() -> Conversation {
        let mut convo = Conversation::new(
            "Demo",
            EndpointSettings::OpenAi(OpenAiSettings {
                model: Some("gpt-3.5-turbo".into()),
                temperature: Some(0.7),
                top_p: Some(1.0),
                ..Default::default()
            }),
        );
        convo.conversation_id = Some("c1".into());
        convo
    }

    #[test]
    fn compose_copies_model_parameters() {
        let submission = Submission::compose(&openai_conversation(), "hello", "User", None);
        assert_eq!(submission.endpoint, Some(ModelEndpoint::OpenAi));
        assert_eq!(submission.parent_message_id.as_deref(), Some(ROOT_PARENT_ID));
        assert_eq!(submission.message.message_id, submission.message_id);
        assert_eq!(submission.endpoint_option.model.as_deref(), Some("gpt-3.5-turbo"));
        let SubmissionOverrides::Model(model) = &submission.overrides else {
            panic!("expected model overrides");
        };
        assert_eq!(model.top_p, Some(1.0));
    }

    #[test]
    fn composed_submission_survives_the_wire() {
        let submission = Submission::compose(&openai_conversation(), "hello", "User", Some("m0"));
        let json = serde_json::to_string(&submission).unwrap();
        assert_eq!(Submission::from_json(&json).unwrap(), submission);
    }

    #[test]
    fn bing_submission_carries_session_fields() {
        let convo = Conversation::new(
            "Bing",
            EndpointSettings::Bing(BingSettings {
                jailbreak: Some(true),
                invocation_id: Some(3),
                tone_style: Some("creative".into()),
                ..Default::default()
            }),
        );
        let submission = Submission::compose(&convo, "hi", "User", None);
        assert!(submission.jailbreak);
        assert_eq!(submission.invocation_id, 3);
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["toneStyle"], "creative");
        assert!(value.get("model").is_none());
    }

    #[test]
    fn mismatched_endpoint_option_is_rejected() {
        let submission = Submission::compose(&openai_conversation(), "hello", "User", None);
        let mut value = serde_json::to_value(&submission).unwrap();
        value["endpointOption"]["endpoint"] = "google".into();
        let err = serde_json::from_value::<Submission>(value).unwrap_err();
        assert!(err.to_string().contains("endpointOption"));
    }

    #[test]
    fn legacy_penalty_is_accepted_and_bing_fields_are_not() {
        let submission = Submission::compose(&openai_conversation(), "hello", "User", None);
        let mut value = serde_json::to_value(&submission).unwrap();
        value["frequence_penalty"] = 0.4.into();
        let parsed: Submission = serde_json::from_value(value.clone()).unwrap();
        let SubmissionOverrides::Model(model) = parsed.overrides else { panic!("expected model overrides") };
        assert_eq!(model.frequency_penalty, Some(0.4));

        value["toneStyle"] = "fast".into();
        assert!(serde_json::from_value::<Submission>(value).is_err());
    }

    #[test]
    fn override_parent_accepts_flag_or_id() {
        let flag: ParentOverride = serde_json::from_str("false").unwrap();
        let id: ParentOverride = serde_json::from_str("\"m4\"").unwrap();
        assert_eq!(flag, ParentOverride::Flag(false));
        assert_eq!(id, ParentOverride::Id("m4".into()));
    }

    #[test]
    fn prompt_fields_ride_with_google_only() {
        use crate::models::settings::GoogleSettings;

        let convo = Conversation::new(
            "Google",
            EndpointSettings::Google(GoogleSettings {
                model: Some("chat-bison".into()),
                system_message: Some("be terse".into()),
                context: Some("a support desk".into()),
                ..Default::default()
            }),
        );
        let submission = Submission::compose(&convo, "hi", "User", None);
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["systemMessage"], "be terse");
        assert_eq!(value["context"], "a support desk");
        assert_eq!(serde_json::from_value::<Submission>(value).unwrap(), submission);

        let mut value = serde_json::to_value(Submission::compose(&openai_conversation(), "hello", "User", None)).unwrap();
        value["systemMessage"] = "be terse".into();
        let err = serde_json::from_value::<Submission>(value).unwrap_err();
        assert!(err.to_string().contains("systemMessage"));
    }
}
