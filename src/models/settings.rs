//! Provider-specific conversation settings.
//!
//! On the wire every provider's fields share one flat object and the
//! `endpoint` key says which of them apply. `RawSettings` mirrors that flat
//! form; `EndpointSettings` is the checked form with one variant per endpoint
//! holding only the fields that endpoint owns.

use serde::{Deserialize, Serialize};

use super::api::NumOrStr;
use super::endpoint::{EndpointFamily, ModelEndpoint, endpoint_label};
use super::message::Example;
use super::ui::OptionValue;
use crate::error::{ContractError, ContractResult};

/// How `EndpointSettings::from_raw` treats fields the endpoint does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Reject the record.
    Strict,
    /// Drop the field and carry on.
    Lenient,
}

const OPENAI_FIELDS: &[&str] = &[
    "model",
    "chatGptLabel",
    "userLabel",
    "promptPrefix",
    "temperature",
    "top_p",
    "presence_penalty",
    "frequency_penalty",
];

const PLUGINS_FIELDS: &[&str] = &[
    "model",
    "chatGptLabel",
    "promptPrefix",
    "temperature",
    "top_p",
    "presence_penalty",
    "frequency_penalty",
    "agentOptions",
];

const BING_FIELDS: &[&str] = &[
    "jailbreak",
    "jailbreakConversationId",
    "jailbreakPresetId",
    "conversationSignature",
    "presetSignature",
    "parentMessageId",
    "clientId",
    "invocationId",
    "toneStyle",
    "context",
    "systemMessage",
];

const GOOGLE_FIELDS: &[&str] = &[
    "model",
    "modelLabel",
    "promptPrefix",
    "context",
    "systemMessage",
    "examples",
    "temperature",
    "maxOutputTokens",
    "topP",
    "topK",
];

const ANTHROPIC_FIELDS: &[&str] = &[
    "model",
    "modelLabel",
    "promptPrefix",
    "temperature",
    "maxOutputTokens",
    "topP",
    "topK",
];

const BROWSER_FIELDS: &[&str] = &["model"];

/// Wire names of the provider fields `endpoint` accepts.
pub fn allowed_fields(endpoint: Option<ModelEndpoint>) -> &'static [&'static str] {
    match endpoint.map(|e| e.family()) {
        None => &[],
        Some(EndpointFamily::OpenAi) => OPENAI_FIELDS,
        Some(EndpointFamily::Plugins) => PLUGINS_FIELDS,
        Some(EndpointFamily::Bing) => BING_FIELDS,
        Some(EndpointFamily::Google) => GOOGLE_FIELDS,
        Some(EndpointFamily::Anthropic) => ANTHROPIC_FIELDS,
        Some(EndpointFamily::Browser) => BROWSER_FIELDS,
    }
}

/// Plugin agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOptions {
    pub agent: String,
    pub skip_completion: bool,
    pub model: String,
    pub temperature: f64,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            agent: "classic".to_string(),
            skip_completion: true,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
        }
    }
}

impl AgentOptions {
    pub fn set(&mut self, name: &str, value: OptionValue) -> ContractResult<()> {
        match name {
            "agent" => self.agent = value.into_text(name)?,
            "skipCompletion" => self.skip_completion = value.into_flag(name)?,
            "model" => self.model = value.into_text(name)?,
            "temperature" => self.temperature = value.into_number(name)?,
            other => return Err(ContractError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

/// Flat wire form of the provider fields shared by conversations and presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_gpt_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "top_p", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// `topP`, the Google/Anthropic spelling.
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    pub top_p_camel: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(rename = "presence_penalty", skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(rename = "frequency_penalty", skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Misspelled duplicate of `frequency_penalty` still sent by older clients.
    #[serde(rename = "frequence_penalty", default, skip_serializing)]
    pub frequence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jailbreak: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jailbreak_conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jailbreak_preset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<NumOrStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_options: Option<AgentOptions>,
}

impl RawSettings {
    /// Wire names of the fields that carry a value.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("model", self.model.is_some()),
            ("chatGptLabel", self.chat_gpt_label.is_some()),
            ("userLabel", self.user_label.is_some()),
            ("modelLabel", self.model_label.is_some()),
            ("promptPrefix", self.prompt_prefix.is_some()),
            ("temperature", self.temperature.is_some()),
            ("top_p", self.top_p.is_some()),
            ("topP", self.top_p_camel.is_some()),
            ("topK", self.top_k.is_some()),
            ("presence_penalty", self.presence_penalty.is_some()),
            ("frequency_penalty", self.frequency_penalty.is_some()),
            ("maxOutputTokens", self.max_output_tokens.is_some()),
            ("examples", self.examples.is_some()),
            ("systemMessage", self.system_message.is_some()),
            ("context", self.context.is_some()),
            ("jailbreak", self.jailbreak.is_some()),
            ("jailbreakConversationId", self.jailbreak_conversation_id.is_some()),
            ("jailbreakPresetId", self.jailbreak_preset_id.is_some()),
            ("conversationSignature", self.conversation_signature.is_some()),
            ("presetSignature", self.preset_signature.is_some()),
            ("parentMessageId", self.parent_message_id.is_some()),
            ("clientId", self.client_id.is_some()),
            ("invocationId", self.invocation_id.is_some()),
            ("toneStyle", self.tone_style.is_some()),
            ("agentOptions", self.agent_options.is_some()),
        ];
        checks
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| name)
            .collect()
    }

    /// Folds `frequence_penalty` into `frequency_penalty`.
    pub fn merge_legacy_penalty(&mut self) -> ContractResult<()> {
        let Some(legacy) = self.frequence_penalty.take() else {
            return Ok(());
        };
        match self.frequency_penalty {
            Some(current) if current != legacy => Err(ContractError::ConflictingFields {
                field: "frequency_penalty",
                alias: "frequence_penalty",
            }),
            _ => {
                tracing::warn!(value = legacy, "accepted legacy `frequence_penalty` spelling");
                self.frequency_penalty = Some(legacy);
                Ok(())
            }
        }
    }

    /// Assigns one scalar field by wire name.
    pub fn set(&mut self, name: &str, value: OptionValue) -> ContractResult<()> {
        match name {
            "model" => self.model = Some(value.into_text(name)?),
            "chatGptLabel" => self.chat_gpt_label = Some(value.into_text(name)?),
            "userLabel" => self.user_label = Some(value.into_text(name)?),
            "modelLabel" => self.model_label = Some(value.into_text(name)?),
            "promptPrefix" => self.prompt_prefix = Some(value.into_text(name)?),
            "temperature" => self.temperature = Some(value.into_number(name)?),
            "top_p" => self.top_p = Some(value.into_number(name)?),
            "topP" => self.top_p_camel = Some(value.into_number(name)?),
            "topK" => self.top_k = Some(value.into_count(name)?),
            "presence_penalty" => self.presence_penalty = Some(value.into_number(name)?),
            "frequency_penalty" => self.frequency_penalty = Some(value.into_number(name)?),
            "maxOutputTokens" => self.max_output_tokens = Some(value.into_count(name)?),
            "systemMessage" => self.system_message = Some(value.into_text(name)?),
            "context" => self.context = Some(value.into_text(name)?),
            "jailbreak" => self.jailbreak = Some(value.into_flag(name)?),
            "jailbreakConversationId" => self.jailbreak_conversation_id = Some(value.into_text(name)?),
            "jailbreakPresetId" => self.jailbreak_preset_id = Some(value.into_text(name)?),
            "conversationSignature" => self.conversation_signature = Some(value.into_text(name)?),
            "presetSignature" => self.preset_signature = Some(value.into_text(name)?),
            "parentMessageId" => self.parent_message_id = Some(value.into_text(name)?),
            "clientId" => self.client_id = Some(value.into_text(name)?),
            "invocationId" => {
                self.invocation_id = Some(NumOrStr::Number(u64::from(value.into_count(name)?)))
            }
            "toneStyle" => self.tone_style = Some(value.into_text(name)?),
            "examples" | "agentOptions" => {
                return Err(ContractError::InvalidValue {
                    field: name.to_string(),
                    expected: "its dedicated editor",
                });
            }
            other => return Err(ContractError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Rewrites a numeric `invocationId` as a string, the conversation form.
    pub(crate) fn invocation_id_as_text(&mut self) {
        if let Some(NumOrStr::Number(n)) = self.invocation_id {
            self.invocation_id = Some(NumOrStr::Text(n.to_string()));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenAiSettings {
    pub model: Option<String>,
    pub chat_gpt_label: Option<String>,
    pub user_label: Option<String>,
    pub prompt_prefix: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginsSettings {
    pub model: Option<String>,
    pub chat_gpt_label: Option<String>,
    pub prompt_prefix: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub agent_options: Option<AgentOptions>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BingSettings {
    pub jailbreak: Option<bool>,
    pub jailbreak_conversation_id: Option<String>,
    pub jailbreak_preset_id: Option<String>,
    pub conversation_signature: Option<String>,
    pub preset_signature: Option<String>,
    pub parent_message_id: Option<String>,
    pub client_id: Option<String>,
    pub invocation_id: Option<u32>,
    pub tone_style: Option<String>,
    pub context: Option<String>,
    pub system_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoogleSettings {
    pub model: Option<String>,
    pub model_label: Option<String>,
    pub prompt_prefix: Option<String>,
    pub context: Option<String>,
    pub system_message: Option<String>,
    pub examples: Option<Vec<Example>>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnthropicSettings {
    pub model: Option<String>,
    pub model_label: Option<String>,
    pub prompt_prefix: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowserSettings {
    pub model: Option<String>,
}

/// Provider settings keyed by endpoint. `Unset` is `endpoint: null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EndpointSettings {
    #[default]
    Unset,
    OpenAi(OpenAiSettings),
    AzureOpenAi(OpenAiSettings),
    Plugins(PluginsSettings),
    Bing(BingSettings),
    Google(GoogleSettings),
    Anthropic(AnthropicSettings),
    ChatGpt(BrowserSettings),
    ChatGptBrowser(BrowserSettings),
}

fn parse_invocation_id(value: &NumOrStr) -> ContractResult<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ContractError::InvalidNumber {
            field: "invocationId",
            value: value.to_string(),
        })
}

impl EndpointSettings {
    pub fn from_raw(
        endpoint: Option<ModelEndpoint>,
        mut raw: RawSettings,
        mode: ParseMode,
    ) -> ContractResult<Self> {
        raw.merge_legacy_penalty()?;

        let allowed = allowed_fields(endpoint);
        for field in raw.present_fields() {
            if allowed.contains(&field) {
                continue;
            }
            match mode {
                ParseMode::Strict => {
                    return Err(ContractError::FieldNotAllowed {
                        field,
                        endpoint: endpoint_label(endpoint),
                    });
                }
                ParseMode::Lenient => {
                    tracing::debug!(field, endpoint = %endpoint_label(endpoint), "dropping field the endpoint does not own");
                }
            }
        }

        let Some(endpoint) = endpoint else {
            return Ok(EndpointSettings::Unset);
        };

        let settings = match endpoint.family() {
            EndpointFamily::OpenAi => {
                let settings = OpenAiSettings {
                    model: raw.model,
                    chat_gpt_label: raw.chat_gpt_label,
                    user_label: raw.user_label,
                    prompt_prefix: raw.prompt_prefix,
                    temperature: raw.temperature,
                    top_p: raw.top_p,
                    presence_penalty: raw.presence_penalty,
                    frequency_penalty: raw.frequency_penalty,
                };
                if endpoint == ModelEndpoint::AzureOpenAi {
                    EndpointSettings::AzureOpenAi(settings)
                } else {
                    EndpointSettings::OpenAi(settings)
                }
            }
            EndpointFamily::Plugins => EndpointSettings::Plugins(PluginsSettings {
                model: raw.model,
                chat_gpt_label: raw.chat_gpt_label,
                prompt_prefix: raw.prompt_prefix,
                temperature: raw.temperature,
                top_p: raw.top_p,
                presence_penalty: raw.presence_penalty,
                frequency_penalty: raw.frequency_penalty,
                agent_options: raw.agent_options,
            }),
            EndpointFamily::Bing => EndpointSettings::Bing(BingSettings {
                jailbreak: raw.jailbreak,
                jailbreak_conversation_id: raw.jailbreak_conversation_id,
                jailbreak_preset_id: raw.jailbreak_preset_id,
                conversation_signature: raw.conversation_signature,
                preset_signature: raw.preset_signature,
                parent_message_id: raw.parent_message_id,
                client_id: raw.client_id,
                invocation_id: raw.invocation_id.as_ref().map(parse_invocation_id).transpose()?,
                tone_style: raw.tone_style,
                context: raw.context,
                system_message: raw.system_message,
            }),
            EndpointFamily::Google => EndpointSettings::Google(GoogleSettings {
                model: raw.model,
                model_label: raw.model_label,
                prompt_prefix: raw.prompt_prefix,
                context: raw.context,
                system_message: raw.system_message,
                examples: raw.examples,
                temperature: raw.temperature,
                max_output_tokens: raw.max_output_tokens,
                top_p: raw.top_p_camel,
                top_k: raw.top_k,
            }),
            EndpointFamily::Anthropic => EndpointSettings::Anthropic(AnthropicSettings {
                model: raw.model,
                model_label: raw.model_label,
                prompt_prefix: raw.prompt_prefix,
                temperature: raw.temperature,
                max_output_tokens: raw.max_output_tokens,
                top_p: raw.top_p_camel,
                top_k: raw.top_k,
            }),
            EndpointFamily::Browser => {
                let settings = BrowserSettings { model: raw.model };
                if endpoint == ModelEndpoint::ChatGpt {
                    EndpointSettings::ChatGpt(settings)
                } else {
                    EndpointSettings::ChatGptBrowser(settings)
                }
            }
        };
        Ok(settings)
    }

    pub fn to_raw(&self) -> RawSettings {
        match self {
            EndpointSettings::Unset => RawSettings::default(),
            EndpointSettings::OpenAi(s) | EndpointSettings::AzureOpenAi(s) => RawSettings {
                model: s.model.clone(),
                chat_gpt_label: s.chat_gpt_label.clone(),
                user_label: s.user_label.clone(),
                prompt_prefix: s.prompt_prefix.clone(),
                temperature: s.temperature,
                top_p: s.top_p,
                presence_penalty: s.presence_penalty,
                frequency_penalty: s.frequency_penalty,
                ..Default::default()
            },
            EndpointSettings::Plugins(s) => RawSettings {
                model: s.model.clone(),
                chat_gpt_label: s.chat_gpt_label.clone(),
                prompt_prefix: s.prompt_prefix.clone(),
                temperature: s.temperature,
                top_p: s.top_p,
                presence_penalty: s.presence_penalty,
                frequency_penalty: s.frequency_penalty,
                agent_options: s.agent_options.clone(),
                ..Default::default()
            },
            EndpointSettings::Bing(s) => RawSettings {
                jailbreak: s.jailbreak,
                jailbreak_conversation_id: s.jailbreak_conversation_id.clone(),
                jailbreak_preset_id: s.jailbreak_preset_id.clone(),
                conversation_signature: s.conversation_signature.clone(),
                preset_signature: s.preset_signature.clone(),
                parent_message_id: s.parent_message_id.clone(),
                client_id: s.client_id.clone(),
                invocation_id: s.invocation_id.map(|n| NumOrStr::Number(u64::from(n))),
                tone_style: s.tone_style.clone(),
                context: s.context.clone(),
                system_message: s.system_message.clone(),
                ..Default::default()
            },
            EndpointSettings::Google(s) => RawSettings {
                model: s.model.clone(),
                model_label: s.model_label.clone(),
                prompt_prefix: s.prompt_prefix.clone(),
                context: s.context.clone(),
                system_message: s.system_message.clone(),
                examples: s.examples.clone(),
                temperature: s.temperature,
                max_output_tokens: s.max_output_tokens,
                top_p_camel: s.top_p,
                top_k: s.top_k,
                ..Default::default()
            },
            EndpointSettings::Anthropic(s) => RawSettings {
                model: s.model.clone(),
                model_label: s.model_label.clone(),
                prompt_prefix: s.prompt_prefix.clone(),
                temperature: s.temperature,
                max_output_tokens: s.max_output_tokens,
                top_p_camel: s.top_p,
                top_k: s.top_k,
                ..Default::default()
            },
            EndpointSettings::ChatGpt(s) | EndpointSettings::ChatGptBrowser(s) => RawSettings {
                model: s.model.clone(),
                ..Default::default()
            },
        }
    }

    pub fn endpoint(&self) -> Option<ModelEndpoint> {
        match self {
            EndpointSettings::Unset => None,
            EndpointSettings::OpenAi(_) => Some(ModelEndpoint::OpenAi),
            EndpointSettings::AzureOpenAi(_) => Some(ModelEndpoint::AzureOpenAi),
            EndpointSettings::Plugins(_) => Some(ModelEndpoint::GptPlugins),
            EndpointSettings::Bing(_) => Some(ModelEndpoint::BingAi),
            EndpointSettings::Google(_) => Some(ModelEndpoint::Google),
            EndpointSettings::Anthropic(_) => Some(ModelEndpoint::Anthropic),
            EndpointSettings::ChatGpt(_) => Some(ModelEndpoint::ChatGpt),
            EndpointSettings::ChatGptBrowser(_) => Some(ModelEndpoint::ChatGptBrowser),
        }
    }

    pub fn endpoint_family(&self) -> Option<EndpointFamily> {
        self.endpoint().map(|endpoint| endpoint.family())
    }

    /// Whether the current endpoint owns the wire field `name`.
    pub fn accepts(&self, name: &str) -> bool {
        allowed_fields(self.endpoint()).contains(&name)
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            EndpointSettings::OpenAi(s) | EndpointSettings::AzureOpenAi(s) => s.model.as_deref(),
            EndpointSettings::Plugins(s) => s.model.as_deref(),
            EndpointSettings::Google(s) => s.model.as_deref(),
            EndpointSettings::Anthropic(s) => s.model.as_deref(),
            EndpointSettings::ChatGpt(s) | EndpointSettings::ChatGptBrowser(s) => s.model.as_deref(),
            EndpointSettings::Unset | EndpointSettings::Bing(_) => None,
        }
    }

    pub fn prompt_prefix(&self) -> Option<&str> {
        match self {
            EndpointSettings::OpenAi(s) | EndpointSettings::AzureOpenAi(s) => s.prompt_prefix.as_deref(),
            EndpointSettings::Plugins(s) => s.prompt_prefix.as_deref(),
            EndpointSettings::Google(s) => s.prompt_prefix.as_deref(),
            EndpointSettings::Anthropic(s) => s.prompt_prefix.as_deref(),
            _ => None,
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        match self {
            EndpointSettings::OpenAi(s) | EndpointSettings::AzureOpenAi(s) => s.temperature,
            EndpointSettings::Plugins(s) => s.temperature,
            EndpointSettings::Google(s) => s.temperature,
            EndpointSettings::Anthropic(s) => s.temperature,
            _ => None,
        }
    }

    /// Sets one provider field by wire name. Fails without changing anything
    /// if the endpoint does not own the field or the value has the wrong type.
    pub fn set_field(&mut self, name: &str, value: OptionValue) -> ContractResult<()> {
        let endpoint = self.endpoint();
        let mut raw = self.to_raw();
        raw.set(name, value)?;
        *self = EndpointSettings::from_raw(endpoint, raw, ParseMode::Strict)?;
        Ok(())
    }

    /// Runs `edit` on a copy of the Google few-shot examples and stores the
    /// copy only if `edit` succeeds.
    pub fn edit_examples<F>(&mut self, edit: F) -> ContractResult<()>
    where
        F: FnOnce(&mut Vec<Example>) -> ContractResult<()>,
    {
        let endpoint = self.endpoint();
        let EndpointSettings::Google(s) = self else {
            return Err(ContractError::FieldNotAllowed {
                field: "examples",
                endpoint: endpoint_label(endpoint),
            });
        };
        let mut examples = s.examples.clone().unwrap_or_default();
        edit(&mut examples)?;
        s.examples = Some(examples);
        Ok(())
    }

    /// Same as `edit_examples` for the plugin agent options, starting from
    /// the defaults when the record has none.
    pub fn edit_agent_options<F>(&mut self, edit: F) -> ContractResult<()>
    where
        F: FnOnce(&mut AgentOptions) -> ContractResult<()>,
    {
        let endpoint = self.endpoint();
        let EndpointSettings::Plugins(s) = self else {
            return Err(ContractError::FieldNotAllowed {
                field: "agentOptions",
                endpoint: endpoint_label(endpoint),
            });
        };
        let mut options = s.agent_options.clone().unwrap_or_default();
        edit(&mut options)?;
        s.agent_options = Some(options);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> RawSettings {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn strict_rejects_foreign_fields() {
        let err = EndpointSettings::from_raw(
            Some(ModelEndpoint::OpenAi),
            raw(serde_json::json!({"chatGptLabel": "Assistant", "jailbreak": true})),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::FieldNotAllowed { field: "jailbreak", .. }));
        assert_eq!(err.to_string(), "field `jailbreak` is not valid for endpoint `openAI`");
    }

    #[test]
    fn lenient_drops_foreign_fields() {
        let settings = EndpointSettings::from_raw(
            Some(ModelEndpoint::Google),
            raw(serde_json::json!({"model": "chat-bison", "toneStyle": "creative", "topP": 0.9})),
            ParseMode::Lenient,
        )
        .unwrap();
        let EndpointSettings::Google(google) = &settings else {
            panic!("expected google settings, got {settings:?}");
        };
        assert_eq!(google.model.as_deref(), Some("chat-bison"));
        assert_eq!(google.top_p, Some(0.9));
        assert!(settings.to_raw().tone_style.is_none());
    }

    #[test]
    fn null_endpoint_owns_nothing() {
        let settings =
            EndpointSettings::from_raw(None, RawSettings::default(), ParseMode::Strict).unwrap();
        assert_eq!(settings, EndpointSettings::Unset);
        assert!(
            EndpointSettings::from_raw(None, raw(serde_json::json!({"model": "x"})), ParseMode::Strict).is_err()
        );
    }

    #[test]
    fn legacy_penalty_spelling_is_merged() {
        let settings = EndpointSettings::from_raw(
            Some(ModelEndpoint::OpenAi),
            raw(serde_json::json!({"frequence_penalty": 0.5})),
            ParseMode::Strict,
        )
        .unwrap();
        let out = serde_json::to_value(settings.to_raw()).unwrap();
        assert_eq!(out["frequency_penalty"], 0.5);
        assert!(out.get("frequence_penalty").is_none());
    }

    #[test]
    fn disagreeing_penalty_spellings_conflict() {
        let err = EndpointSettings::from_raw(
            Some(ModelEndpoint::OpenAi),
            raw(serde_json::json!({"frequence_penalty": 0.5, "frequency_penalty": 1.0})),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::ConflictingFields { .. }));
    }

    #[test]
    fn invocation_id_accepts_numeric_strings() {
        let settings = EndpointSettings::from_raw(
            Some(ModelEndpoint::BingAi),
            raw(serde_json::json!({"invocationId": "3", "toneStyle": "balanced"})),
            ParseMode::Strict,
        )
        .unwrap();
        let EndpointSettings::Bing(bing) = settings else { panic!("expected bing") };
        assert_eq!(bing.invocation_id, Some(3));

        let err = EndpointSettings::from_raw(
            Some(ModelEndpoint::BingAi),
            raw(serde_json::json!({"invocationId": "three"})),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::InvalidNumber { field: "invocationId", .. }));
    }

    #[test]
    fn set_field_respects_ownership() {
        let mut settings = EndpointSettings::OpenAi(OpenAiSettings::default());
        settings.set_field("temperature", OptionValue::Number(0.2)).unwrap();
        assert_eq!(settings.temperature(), Some(0.2));

        let before = settings.clone();
        assert!(settings.set_field("topK", OptionValue::Number(40.0)).is_err());
        assert!(settings.set_field("model", OptionValue::Flag(true)).is_err());
        assert!(settings.set_field("nonsense", OptionValue::Number(1.0)).is_err());
        assert_eq!(settings, before);
    }

    #[test]
    fn azure_keeps_its_endpoint() {
        let settings = EndpointSettings::from_raw(
            Some(ModelEndpoint::AzureOpenAi),
            raw(serde_json::json!({"model": "gpt-4"})),
            ParseMode::Strict,
        )
        .unwrap();
        assert_eq!(settings.endpoint(), Some(ModelEndpoint::AzureOpenAi));
        assert_eq!(settings.endpoint_family(), Some(EndpointFamily::OpenAi));
        assert_eq!(settings.model(), Some("gpt-4"));
    }

    #[test]
    fn google_owns_context_and_system_message() {
        let json = serde_json::json!({
            "model": "chat-bison",
            "context": "a support desk",
            "systemMessage": "be terse",
        });
        let settings = EndpointSettings::from_raw(Some(ModelEndpoint::Google), raw(json.clone()), ParseMode::Strict).unwrap();
        let EndpointSettings::Google(google) = &settings else {
            panic!("expected google settings, got {settings:?}");
        };
        assert_eq!(google.system_message.as_deref(), Some("be terse"));
        assert_eq!(google.context.as_deref(), Some("a support desk"));
        assert_eq!(serde_json::to_value(settings.to_raw()).unwrap(), json);

        let err = EndpointSettings::from_raw(
            Some(ModelEndpoint::Anthropic),
            raw(serde_json::json!({"systemMessage": "be terse"})),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::FieldNotAllowed { field: "systemMessage", .. }));
    }

    #[test]
    fn failed_edits_keep_the_previous_value() {
        let mut settings = EndpointSettings::Plugins(PluginsSettings::default());
        let err = settings.edit_agent_options(|options| options.set("bogus", OptionValue::Flag(true)));
        assert!(err.is_err());
        assert_eq!(settings, EndpointSettings::Plugins(PluginsSettings::default()));

        settings.edit_agent_options(|options| options.set("agent", "functions".into())).unwrap();
        let EndpointSettings::Plugins(plugins) = &settings else { panic!("expected plugins") };
        assert_eq!(plugins.agent_options.as_ref().map(|o| o.agent.as_str()), Some("functions"));

        let mut google = EndpointSettings::Google(GoogleSettings::default());
        let err = google.edit_examples(|examples| examples.get_mut(0).map(|_| ()).ok_or(ContractError::ExampleOutOfRange(0)));
        assert!(err.is_err());
        assert_eq!(google, EndpointSettings::Google(GoogleSettings::default()));

        assert!(matches!(
            settings.edit_examples(|_| Ok(())),
            Err(ContractError::FieldNotAllowed { field: "examples", .. })
        ));
    }
}
