use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ContractError, ContractResult};

/// One credential a plugin asks for before it can be installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginAuthConfig {
    pub auth_field: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    pub plugin_key: String,
    pub description: String,
    pub icon: String,
    pub auth_config: Vec<PluginAuthConfig>,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_button: Option<bool>,
}

impl Plugin {
    /// True when the user still has to supply credentials.
    pub fn needs_auth(&self) -> bool {
        !self.auth_config.is_empty() && !self.authenticated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginActionKind {
    Install,
    Uninstall,
}

impl PluginActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginActionKind::Install => "install",
            PluginActionKind::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for PluginActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginActionKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(PluginActionKind::Install),
            "uninstall" => Ok(PluginActionKind::Uninstall),
            other => Err(ContractError::UnknownAction(other.to_string())),
        }
    }
}

/// Install or uninstall request for one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginAction {
    pub plugin_key: String,
    pub action: PluginActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
}

/// Same request as `PluginAction` with the action left as free text, as the
/// user-plugins endpoint receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPlugins {
    pub plugin_key: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
}

impl TryFrom<UpdateUserPlugins> for PluginAction {
    type Error = ContractError;

    fn try_from(update: UpdateUserPlugins) -> ContractResult<Self> {
        Ok(PluginAction {
            action: update.action.parse()?,
            plugin_key: update.plugin_key,
            auth: update.auth,
        })
    }
}

/// Plugins keyed by `pluginKey`.
pub type Template = BTreeMap<String, Plugin>;

pub fn template_from(plugins: impl IntoIterator<Item = Plugin>) -> Template {
    plugins.into_iter().map(|p| (p.plugin_key.clone(), p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_is_install_or_uninstall() {
        let ok: PluginAction =
            serde_json::from_value(json!({"pluginKey": "wolfram", "action": "uninstall"})).unwrap();
        assert_eq!(ok.action, PluginActionKind::Uninstall);

        for bad in ["remove", "INSTALL", ""] {
            let res = serde_json::from_value::<PluginAction>(json!({"pluginKey": "wolfram", "action": bad}));
            assert!(res.is_err(), "{bad} should be rejected");
            assert!(bad.parse::<PluginActionKind>().is_err());
        }
    }

    #[test]
    fn free_text_update_is_checked_on_conversion() {
        let update = UpdateUserPlugins {
            plugin_key: "zapier".into(),
            action: "enable".into(),
            auth: None,
        };
        let err = PluginAction::try_from(update).unwrap_err();
        assert_eq!(err.to_string(), "unknown plugin action `enable`");
    }

    #[test]
    fn template_is_keyed_by_plugin_key() {
        let plugin: Plugin = serde_json::from_value(json!({
            "name": "Wolfram",
            "pluginKey": "wolfram",
            "description": "Computation",
            "icon": "/assets/wolfram.png",
            "authConfig": [{"authField": "WOLFRAM_APP_ID", "label": "App ID", "description": "Wolfram App ID"}],
            "authenticated": false
        }))
        .unwrap();
        assert!(plugin.needs_auth());
        let template = template_from([plugin]);
        assert_eq!(template["wolfram"].auth_config[0].auth_field, "WOLFRAM_APP_ID");
    }
}
