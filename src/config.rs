// src/config.rs
use std::net::SocketAddr;

use crate::error::ConfigError;
use crate::models::api::{EndpointAvailability, EndpointsConfig, PluginsAvailability, StartupConfig};

pub const DEFAULT_ADDR: &str = "0.0.0.0:3080";

const OPENAI_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-3.5-turbo-16k", "gpt-4", "gpt-4-0613"];
const PLUGIN_MODELS: &[&str] = &["gpt-4", "gpt-4-0613", "gpt-3.5-turbo", "gpt-3.5-turbo-0613"];
const CHATGPT_MODELS: &[&str] = &["text-davinci-002-render-sha", "gpt-4"];
const GOOGLE_MODELS: &[&str] = &["chat-bison", "text-bison", "codechat-bison"];
const ANTHROPIC_MODELS: &[&str] = &["claude-1", "claude-instant-1", "claude-2"];

/// Reads one variable; empty values count as unset.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.has(k))
    }

    /// Only a literal `true` (any case) enables a flag.
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    fn models(&self, key: &str, defaults: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn availability(&self, key: &str, models_key: &str, defaults: &[&str]) -> Option<EndpointAvailability> {
        self.has(key).then(|| EndpointAvailability {
            available_models: self.models(models_key, defaults),
        })
    }
}

impl StartupConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env { lookup };
        StartupConfig {
            app_title: env.get("APP_TITLE").unwrap_or_else(|| "Chat".to_string()),
            google_login_enabled: env.all(&["GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"]),
            openid_login_enabled: env.all(&[
                "OPENID_CLIENT_ID",
                "OPENID_CLIENT_SECRET",
                "OPENID_ISSUER",
                "OPENID_SESSION_SECRET",
            ]),
            github_login_enabled: env.all(&["GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"]),
            openid_label: env
                .get("OPENID_BUTTON_LABEL")
                .unwrap_or_else(|| "Login with OpenID".to_string()),
            openid_image_url: env.get("OPENID_IMAGE_URL").unwrap_or_default(),
            discord_login_enabled: env.all(&["DISCORD_CLIENT_ID", "DISCORD_CLIENT_SECRET"]),
            server_domain: env
                .get("DOMAIN_SERVER")
                .unwrap_or_else(|| "http://localhost:3080".to_string()),
            registration_enabled: env.flag("ALLOW_REGISTRATION"),
            social_login_enabled: env.flag("ALLOW_SOCIAL_LOGIN"),
            email_enabled: env.all(&["EMAIL_SERVICE", "EMAIL_USERNAME", "EMAIL_PASSWORD", "EMAIL_FROM"]),
        }
    }
}

impl EndpointsConfig {
    /// A provider is enabled when its credential variable is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env { lookup };
        let plugins_enabled = env.has("OPENAI_API_KEY") || env.has("AZURE_API_KEY");
        EndpointsConfig {
            azure_open_ai: env.availability("AZURE_API_KEY", "OPENAI_MODELS", OPENAI_MODELS),
            bing_ai: env.availability("BINGAI_TOKEN", "BINGAI_MODELS", &[]),
            chat_gpt_browser: env.availability("CHATGPT_TOKEN", "CHATGPT_MODELS", CHATGPT_MODELS),
            anthropic: env.availability("ANTHROPIC_API_KEY", "ANTHROPIC_MODELS", ANTHROPIC_MODELS),
            google: env.availability("PALM_KEY", "GOOGLE_MODELS", GOOGLE_MODELS),
            open_ai: env.availability("OPENAI_API_KEY", "OPENAI_MODELS", OPENAI_MODELS),
            gpt_plugins: plugins_enabled.then(|| PluginsAvailability {
                available_models: env.models("PLUGIN_MODELS", PLUGIN_MODELS),
                available_tools: None,
                plugins: None,
            }),
        }
    }
}

/// Everything the contract server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub startup: StartupConfig,
    pub endpoints: EndpointsConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("CONTRACT_SERVER_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr { value: raw_addr.clone(), source })?;

        Ok(ServerConfig {
            addr,
            startup: StartupConfig::from_lookup(&lookup),
            endpoints: EndpointsConfig::from_lookup(&lookup),
        })
    }
}
