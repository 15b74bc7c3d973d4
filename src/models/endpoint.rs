use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Chat provider a conversation or preset is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelEndpoint {
    #[serde(rename = "azureOpenAI")]
    AzureOpenAi,
    #[serde(rename = "openAI")]
    OpenAi,
    #[serde(rename = "bingAI")]
    BingAi,
    #[serde(rename = "chatGPT")]
    ChatGpt,
    #[serde(rename = "chatGPTBrowser")]
    ChatGptBrowser,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "gptPlugins")]
    GptPlugins,
    #[serde(rename = "anthropic")]
    Anthropic,
}

/// Groups endpoints that accept the same provider-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointFamily {
    OpenAi,
    Plugins,
    Bing,
    Google,
    Anthropic,
    Browser,
}

impl ModelEndpoint {
    pub const ALL: [ModelEndpoint; 8] = [
        ModelEndpoint::AzureOpenAi,
        ModelEndpoint::OpenAi,
        ModelEndpoint::BingAi,
        ModelEndpoint::ChatGpt,
        ModelEndpoint::ChatGptBrowser,
        ModelEndpoint::Google,
        ModelEndpoint::GptPlugins,
        ModelEndpoint::Anthropic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelEndpoint::AzureOpenAi => "azureOpenAI",
            ModelEndpoint::OpenAi => "openAI",
            ModelEndpoint::BingAi => "bingAI",
            ModelEndpoint::ChatGpt => "chatGPT",
            ModelEndpoint::ChatGptBrowser => "chatGPTBrowser",
            ModelEndpoint::Google => "google",
            ModelEndpoint::GptPlugins => "gptPlugins",
            ModelEndpoint::Anthropic => "anthropic",
        }
    }

    pub fn family(&self) -> EndpointFamily {
        match self {
            ModelEndpoint::AzureOpenAi | ModelEndpoint::OpenAi => EndpointFamily::OpenAi,
            ModelEndpoint::GptPlugins => EndpointFamily::Plugins,
            ModelEndpoint::BingAi => EndpointFamily::Bing,
            ModelEndpoint::Google => EndpointFamily::Google,
            ModelEndpoint::Anthropic => EndpointFamily::Anthropic,
            ModelEndpoint::ChatGpt | ModelEndpoint::ChatGptBrowser => EndpointFamily::Browser,
        }
    }
}

impl fmt::Display for ModelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelEndpoint {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelEndpoint::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ContractError::UnknownEndpoint(s.to_string()))
    }
}

/// Renders an optional endpoint the way it appears on the wire.
pub(crate) fn endpoint_label(endpoint: Option<ModelEndpoint>) -> String {
    endpoint.map_or_else(|| "null".to_string(), |e| e.to_string())
}
