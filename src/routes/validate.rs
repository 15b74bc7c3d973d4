use std::fmt;
use std::str::FromStr;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{ApiError, ContractResult},
    models::{
        api::{
            DeleteConversationRequest, DeleteConversationResponse, EndpointsConfig, ErrorEnvelope,
            GetConversationsResponse, SearchResults, StartupConfig, UpdateConversationRequest,
            UpdateConversationResponse, UpdateTokenCountResponse,
        },
        conversation::Conversation,
        message::Message,
        plugin::{Plugin, PluginAction, UpdateUserPlugins},
        preset::{CleanupPreset, EndpointsConfigArg, Preset, cleanup_preset},
        submission::Submission,
        user::{LoginResponse, LoginUser, RegisterUser, RequestPasswordReset, ResetPassword, User},
    },
    services::metrics_manager::MetricsData,
    state::SharedState,
};

/// Record types the validation route understands, by URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Message,
    Conversation,
    Preset,
    Submission,
    Plugin,
    PluginAction,
    UpdateUserPlugins,
    User,
    Login,
    LoginResponse,
    Register,
    RequestPasswordReset,
    ResetPassword,
    ConversationsPage,
    UpdateConversation,
    UpdateConversationResponse,
    DeleteConversation,
    DeleteConversationResponse,
    SearchResults,
    TokenCount,
    EndpointsConfig,
    StartupConfig,
    Error,
}

impl ContractKind {
    const ALL: [ContractKind; 23] = [
        ContractKind::Message,
        ContractKind::Conversation,
        ContractKind::Preset,
        ContractKind::Submission,
        ContractKind::Plugin,
        ContractKind::PluginAction,
        ContractKind::UpdateUserPlugins,
        ContractKind::User,
        ContractKind::Login,
        ContractKind::LoginResponse,
        ContractKind::Register,
        ContractKind::RequestPasswordReset,
        ContractKind::ResetPassword,
        ContractKind::ConversationsPage,
        ContractKind::UpdateConversation,
        ContractKind::UpdateConversationResponse,
        ContractKind::DeleteConversation,
        ContractKind::DeleteConversationResponse,
        ContractKind::SearchResults,
        ContractKind::TokenCount,
        ContractKind::EndpointsConfig,
        ContractKind::StartupConfig,
        ContractKind::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Message => "message",
            ContractKind::Conversation => "conversation",
            ContractKind::Preset => "preset",
            ContractKind::Submission => "submission",
            ContractKind::Plugin => "plugin",
            ContractKind::PluginAction => "plugin-action",
            ContractKind::UpdateUserPlugins => "update-user-plugins",
            ContractKind::User => "user",
            ContractKind::Login => "login",
            ContractKind::LoginResponse => "login-response",
            ContractKind::Register => "register",
            ContractKind::RequestPasswordReset => "request-password-reset",
            ContractKind::ResetPassword => "reset-password",
            ContractKind::ConversationsPage => "conversations-page",
            ContractKind::UpdateConversation => "update-conversation",
            ContractKind::UpdateConversationResponse => "update-conversation-response",
            ContractKind::DeleteConversation => "delete-conversation",
            ContractKind::DeleteConversationResponse => "delete-conversation-response",
            ContractKind::SearchResults => "search-results",
            ContractKind::TokenCount => "token-count",
            ContractKind::EndpointsConfig => "endpoints-config",
            ContractKind::StartupConfig => "startup-config",
            ContractKind::Error => "error",
        }
    }

    /// Parses `body` as this kind and returns it re-serialized in canonical form.
    pub fn normalize(&self, body: &[u8]) -> ContractResult<Value> {
        match self {
            ContractKind::Message => roundtrip::<Message>(body),
            ContractKind::Conversation => roundtrip::<Conversation>(body),
            ContractKind::Preset => roundtrip::<Preset>(body),
            ContractKind::Submission => roundtrip::<Submission>(body),
            ContractKind::Plugin => roundtrip::<Plugin>(body),
            ContractKind::PluginAction => roundtrip::<PluginAction>(body),
            ContractKind::UpdateUserPlugins => {
                let update: UpdateUserPlugins = serde_json::from_slice(body)?;
                Ok(serde_json::to_value(PluginAction::try_from(update)?)?)
            }
            ContractKind::User => roundtrip::<User>(body),
            ContractKind::Login => roundtrip::<LoginUser>(body),
            ContractKind::LoginResponse => roundtrip::<LoginResponse>(body),
            ContractKind::Register => roundtrip::<RegisterUser>(body),
            ContractKind::RequestPasswordReset => roundtrip::<RequestPasswordReset>(body),
            ContractKind::ResetPassword => roundtrip::<ResetPassword>(body),
            ContractKind::ConversationsPage => roundtrip::<GetConversationsResponse>(body),
            ContractKind::UpdateConversation => roundtrip::<UpdateConversationRequest>(body),
            ContractKind::UpdateConversationResponse => roundtrip::<UpdateConversationResponse>(body),
            ContractKind::DeleteConversation => roundtrip::<DeleteConversationRequest>(body),
            ContractKind::DeleteConversationResponse => roundtrip::<DeleteConversationResponse>(body),
            ContractKind::SearchResults => roundtrip::<SearchResults>(body),
            ContractKind::TokenCount => roundtrip::<UpdateTokenCountResponse>(body),
            ContractKind::EndpointsConfig => roundtrip::<EndpointsConfig>(body),
            ContractKind::StartupConfig => roundtrip::<StartupConfig>(body),
            ContractKind::Error => roundtrip::<ErrorEnvelope>(body),
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ApiError::NotFound(format!("unknown contract kind `{s}`")))
    }
}

fn roundtrip<T>(body: &[u8]) -> ContractResult<Value>
where
    T: DeserializeOwned + Serialize,
{
    let typed: T = serde_json::from_slice(body)?;
    Ok(serde_json::to_value(typed)?)
}

pub async fn validate_handler(
    State(state): State<SharedState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let kind: ContractKind = kind.parse()?;

    match kind.normalize(&body) {
        Ok(value) => {
            state.metrics.record_accepted(kind.as_str()).await;
            Ok(Json(value))
        }
        Err(err) => {
            tracing::info!(%kind, error = %err, "payload rejected");
            state.metrics.record_rejected(kind.as_str()).await;
            Err(err.into())
        }
    }
}

/// Cleans up a preset draft, using the server's endpoint config when the
/// request does not carry one.
pub async fn cleanup_preset_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<Preset>, ApiError> {
    let mut request: CleanupPreset = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid cleanup request: {e}")))?;
    if request.endpoints_config.is_none() {
        request.endpoints_config = Some(EndpointsConfigArg::Known(state.endpoints.clone()));
    }
    let preset = cleanup_preset(request)?;
    tracing::debug!(title = %preset.title, endpoint = ?preset.endpoint(), "preset cleaned up");
    Ok(Json(preset))
}

pub async fn get_config_handler(State(state): State<SharedState>) -> Json<StartupConfig> {
    Json(state.startup.clone())
}

pub async fn get_endpoints_handler(State(state): State<SharedState>) -> Json<EndpointsConfig> {
    Json(state.endpoints.clone())
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_their_names() {
        for kind in ContractKind::ALL {
            assert_eq!(kind.as_str().parse::<ContractKind>().unwrap(), kind);
        }
        assert!("conversations".parse::<ContractKind>().is_err());
    }

    #[test]
    fn normalize_drops_unknown_keys() {
        let value = ContractKind::TokenCount
            .normalize(br#"{"count": 12, "extra": true}"#)
            .unwrap();
        assert_eq!(value, serde_json::json!({"count": 12}));
    }
}
