use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::api::EndpointsConfig;
use super::endpoint::{ModelEndpoint, endpoint_label};
use super::plugin::Plugin;
use super::settings::{EndpointSettings, ParseMode, RawSettings};
use super::timestamp::Timestamp;
use super::ui::OptionValue;
use crate::error::{ContractError, ContractResult};

/// Title given to presets saved without one.
pub const DEFAULT_PRESET_TITLE: &str = "New Preset";

/// A saved conversation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PresetDraft", into = "PresetDraft")]
pub struct Preset {
    pub title: String,
    pub preset_id: Option<String>,
    pub conversation_id: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub tools: Option<Vec<Plugin>>,
    pub user: Option<String>,
    pub settings: EndpointSettings,
}

/// Wire form of a preset with every field optional, as the editor holds it
/// before it is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub endpoint: Option<ModelEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Plugin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(flatten)]
    pub settings: RawSettings,
}

impl PresetDraft {
    /// Drops keys that only make sense on a live conversation.
    fn strip_session_keys(&mut self) {
        self.settings.jailbreak_conversation_id = None;
        self.settings.parent_message_id = None;
    }
}

impl TryFrom<PresetDraft> for Preset {
    type Error = ContractError;

    fn try_from(draft: PresetDraft) -> ContractResult<Self> {
        let title = draft.title.ok_or(ContractError::MissingField("title"))?;
        for (field, present) in [
            ("jailbreakConversationId", draft.settings.jailbreak_conversation_id.is_some()),
            ("parentMessageId", draft.settings.parent_message_id.is_some()),
        ] {
            if present {
                return Err(ContractError::FieldNotAllowed {
                    field,
                    endpoint: endpoint_label(draft.endpoint),
                });
            }
        }

        Ok(Preset {
            title,
            preset_id: draft.preset_id,
            conversation_id: draft.conversation_id,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            tools: draft.tools,
            user: draft.user,
            settings: EndpointSettings::from_raw(draft.endpoint, draft.settings, ParseMode::Strict)?,
        })
    }
}

impl From<Preset> for PresetDraft {
    fn from(preset: Preset) -> Self {
        PresetDraft {
            title: Some(preset.title),
            preset_id: preset.preset_id,
            conversation_id: preset.conversation_id,
            endpoint: preset.settings.endpoint(),
            created_at: preset.created_at,
            updated_at: preset.updated_at,
            tools: preset.tools,
            user: preset.user,
            settings: preset.settings.to_raw(),
        }
    }
}

impl Preset {
    pub fn endpoint(&self) -> Option<ModelEndpoint> {
        self.settings.endpoint()
    }

    pub fn from_json(json: &str) -> ContractResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// `endpointsConfig` as the cleanup caller passes it: usually the fetched
/// config, sometimes an arbitrary placeholder object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointsConfigArg {
    Known(EndpointsConfig),
    Other(Map<String, Value>),
}

impl EndpointsConfigArg {
    pub fn known(&self) -> Option<&EndpointsConfig> {
        match self {
            EndpointsConfigArg::Known(config) => Some(config),
            EndpointsConfigArg::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPreset {
    pub preset: PresetDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints_config: Option<EndpointsConfigArg>,
}

/// Turns an edited draft into a savable preset: fields the endpoint does not
/// own are dropped, a missing title becomes `"New Preset"` and a missing model
/// is filled with the endpoint's first available model.
pub fn cleanup_preset(request: CleanupPreset) -> ContractResult<Preset> {
    let CleanupPreset { mut preset, endpoints_config } = request;
    let Some(endpoint) = preset.endpoint else {
        tracing::warn!(preset_id = ?preset.preset_id, "cannot clean up a preset without an endpoint");
        return Err(ContractError::MissingEndpoint);
    };
    preset.strip_session_keys();

    let mut settings = EndpointSettings::from_raw(Some(endpoint), preset.settings, ParseMode::Lenient)?;
    if settings.model().is_none() && settings.accepts("model") {
        let first_model = endpoints_config
            .as_ref()
            .and_then(EndpointsConfigArg::known)
            .and_then(|config| config.available_models(endpoint))
            .and_then(|models| models.first());
        if let Some(model) = first_model {
            settings.set_field("model", OptionValue::Text(model.clone()))?;
        }
    }

    let title = preset
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PRESET_TITLE.to_string());

    Ok(Preset {
        title,
        preset_id: preset.preset_id,
        conversation_id: preset.conversation_id,
        created_at: preset.created_at,
        updated_at: preset.updated_at,
        tools: preset.tools,
        user: preset.user,
        settings,
    })
}
