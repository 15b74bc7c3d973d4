//! Request and response bodies of the REST surface, plus the shared error
//! envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::conversation::Conversation;
use super::endpoint::ModelEndpoint;
use super::message::Message;
use super::plugin::Plugin;

/// A count or id the backend sends either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Number(u64),
    Text(String),
}

impl NumOrStr {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NumOrStr::Number(n) => Some(*n),
            NumOrStr::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<u64> for NumOrStr {
    fn from(n: u64) -> Self {
        NumOrStr::Number(n)
    }
}

impl fmt::Display for NumOrStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumOrStr::Number(n) => write!(f, "{n}"),
            NumOrStr::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConversationsResponse {
    pub conversations: Vec<Conversation>,
    pub page_number: String,
    pub page_size: NumOrStr,
    pub pages: NumOrStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConversationRequest {
    pub conversation_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConversationResponse {
    pub data: Conversation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessages {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConversationResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
    pub messages: DeletedMessages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
    pub page_number: String,
    pub page_size: NumOrStr,
    pub pages: NumOrStr,
    pub filter: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTokenCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAvailability {
    pub available_models: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsAvailability {
    pub available_models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_tools: Option<Vec<Plugin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Value>,
}

/// Which providers the server has credentials for, and their models.
/// A `null` entry means the provider is disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(rename = "azureOpenAI")]
    pub azure_open_ai: Option<EndpointAvailability>,
    #[serde(rename = "bingAI")]
    pub bing_ai: Option<EndpointAvailability>,
    #[serde(rename = "chatGPTBrowser")]
    pub chat_gpt_browser: Option<EndpointAvailability>,
    pub anthropic: Option<EndpointAvailability>,
    pub google: Option<EndpointAvailability>,
    #[serde(rename = "openAI")]
    pub open_ai: Option<EndpointAvailability>,
    #[serde(rename = "gptPlugins")]
    pub gpt_plugins: Option<PluginsAvailability>,
}

impl EndpointsConfig {
    /// Models listed for `endpoint`, or `None` when the provider is disabled
    /// or has no entry in this config.
    pub fn available_models(&self, endpoint: ModelEndpoint) -> Option<&[String]> {
        let entry = match endpoint {
            ModelEndpoint::AzureOpenAi => self.azure_open_ai.as_ref(),
            ModelEndpoint::OpenAi => self.open_ai.as_ref(),
            ModelEndpoint::BingAi => self.bing_ai.as_ref(),
            ModelEndpoint::ChatGptBrowser => self.chat_gpt_browser.as_ref(),
            ModelEndpoint::Google => self.google.as_ref(),
            ModelEndpoint::Anthropic => self.anthropic.as_ref(),
            ModelEndpoint::GptPlugins => {
                return self.gpt_plugins.as_ref().map(|p| p.available_models.as_slice());
            }
            ModelEndpoint::ChatGpt => None,
        };
        entry.map(|e| e.available_models.as_slice())
    }

    pub fn is_enabled(&self, endpoint: ModelEndpoint) -> bool {
        self.available_models(endpoint).is_some()
    }

    pub fn enabled(&self) -> Vec<ModelEndpoint> {
        ModelEndpoint::ALL
            .into_iter()
            .filter(|e| self.is_enabled(*e))
            .collect()
    }
}

/// Settings the client fetches once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupConfig {
    pub app_title: String,
    pub google_login_enabled: bool,
    pub openid_login_enabled: bool,
    pub github_login_enabled: bool,
    pub openid_label: String,
    pub openid_image_url: String,
    pub discord_login_enabled: bool,
    pub server_domain: String,
    pub registration_enabled: bool,
    pub social_login_enabled: bool,
    pub email_enabled: bool,
}

/// Uploaded file metadata. `date` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub date: i64,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// Normalised error, shaped like an HTTP client error so the UI can read
/// `response.data.message` when the server supplied one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ErrorResponse>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, code: Option<i64>) -> Self {
        Self { message: message.into(), code, response: None }
    }

    pub fn with_server_message(mut self, message: impl Into<String>) -> Self {
        self.response = Some(ErrorResponse {
            data: Some(ErrorData { message: Some(message.into()) }),
        });
        self
    }

    /// The server-provided message if there is one, else the top-level one.
    pub fn display_message(&self) -> &str {
        self.response
            .as_ref()
            .and_then(|r| r.data.as_ref())
            .and_then(|d| d.message.as_deref())
            .unwrap_or(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_size_accepts_both_forms() {
        let a: NumOrStr = serde_json::from_value(json!(25)).unwrap();
        let b: NumOrStr = serde_json::from_value(json!("25")).unwrap();
        assert_eq!(a.as_u64(), Some(25));
        assert_eq!(b.as_u64(), Some(25));
        assert_eq!(NumOrStr::Text("many".into()).as_u64(), None);
    }

    #[test]
    fn negative_deleted_count_is_rejected() {
        let bad = json!({
            "acknowledged": true,
            "deletedCount": -1,
            "messages": {"acknowledged": true, "deletedCount": 0}
        });
        assert!(serde_json::from_value::<DeleteConversationResponse>(bad).is_err());

        let nested_bad = json!({
            "acknowledged": true,
            "deletedCount": 1,
            "messages": {"acknowledged": true, "deletedCount": -3}
        });
        assert!(serde_json::from_value::<DeleteConversationResponse>(nested_bad).is_err());
    }

    #[test]
    fn disabled_endpoints_serialize_as_null() {
        let config = EndpointsConfig {
            open_ai: Some(EndpointAvailability { available_models: vec!["gpt-4".into()] }),
            ..Default::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["bingAI"], Value::Null);
        assert_eq!(value["openAI"]["availableModels"][0], "gpt-4");
        assert_eq!(config.enabled(), vec![ModelEndpoint::OpenAi]);
        assert!(config.available_models(ModelEndpoint::ChatGpt).is_none());
    }

    #[test]
    fn error_envelope_prefers_server_message() {
        let plain = ErrorEnvelope::new("Request failed with status code 401", Some(401));
        assert_eq!(plain.display_message(), "Request failed with status code 401");

        let parsed: ErrorEnvelope = serde_json::from_value(json!({
            "message": "Request failed",
            "response": {"data": {"message": "Email already in use"}}
        }))
        .unwrap();
        assert_eq!(parsed.display_message(), "Email already in use");
        assert_eq!(parsed, ErrorEnvelope::new("Request failed", None).with_server_message("Email already in use"));
    }
}
