//! Props and callback contracts of the endpoint settings views.
//!
//! Callbacks are shared closures so a view can clone them into child
//! components. `N` is whatever node type the rendering layer produces.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::conversation::Conversation;
use super::endpoint::ModelEndpoint;
use super::message::Example;
use super::plugin::Plugin;
use super::preset::Preset;
use super::settings::EndpointSettings;
use crate::error::{ContractError, ContractResult};

/// Value passed to a setter: `number | string | boolean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl OptionValue {
    fn mismatch(field: &str, expected: &'static str) -> ContractError {
        ContractError::InvalidValue { field: field.to_string(), expected }
    }

    pub fn into_text(self, field: &str) -> ContractResult<String> {
        match self {
            OptionValue::Text(s) => Ok(s),
            _ => Err(Self::mismatch(field, "a string")),
        }
    }

    pub fn into_number(self, field: &str) -> ContractResult<f64> {
        match self {
            OptionValue::Number(n) if n.is_finite() => Ok(n),
            _ => Err(Self::mismatch(field, "a number")),
        }
    }

    pub fn into_flag(self, field: &str) -> ContractResult<bool> {
        match self {
            OptionValue::Flag(b) => Ok(b),
            _ => Err(Self::mismatch(field, "a boolean")),
        }
    }

    /// Non-negative whole number.
    pub fn into_count(self, field: &str) -> ContractResult<u32> {
        match self {
            OptionValue::Number(n) if n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX) => {
                Ok(n as u32)
            }
            _ => Err(Self::mismatch(field, "a non-negative integer")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Flag(b)
    }
}

/// Which half of an example a `SetExample` call edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleField {
    Input,
    Output,
}

impl FromStr for ExampleField {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(ExampleField::Input),
            "output" => Ok(ExampleField::Output),
            other => Err(ContractError::UnknownField(other.to_string())),
        }
    }
}

pub type Callback = Arc<dyn Fn() + Send + Sync>;
/// `setOption(param)(newValue)`, uncurried.
pub type SetOption = Arc<dyn Fn(&str, OptionValue) + Send + Sync>;
pub type SetExample = Arc<dyn Fn(usize, ExampleField, Option<OptionValue>) + Send + Sync>;
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type Select = Arc<dyn Fn(&str) + Send + Sync>;

/// Popover anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Side::Top, Side::Right, Side::Bottom, Side::Left]
            .into_iter()
            .find(|side| side.as_str() == s)
            .ok_or_else(|| ContractError::UnknownSide(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionHoverProps {
    pub endpoint: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_examples: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_code_chat: Option<bool>,
}

/// What a settings view edits: a live conversation or a saved preset.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigTarget {
    Conversation(Conversation),
    Preset(Preset),
}

impl ConfigTarget {
    pub fn settings(&self) -> &EndpointSettings {
        match self {
            ConfigTarget::Conversation(c) => &c.settings,
            ConfigTarget::Preset(p) => &p.settings,
        }
    }

    pub fn settings_mut(&mut self) -> &mut EndpointSettings {
        match self {
            ConfigTarget::Conversation(c) => &mut c.settings,
            ConfigTarget::Preset(p) => &mut p.settings,
        }
    }

    pub fn tools(&self) -> &[Plugin] {
        let tools = match self {
            ConfigTarget::Conversation(c) => &c.tools,
            ConfigTarget::Preset(p) => &p.tools,
        };
        tools.as_deref().unwrap_or_default()
    }

    pub fn tools_mut(&mut self) -> &mut Vec<Plugin> {
        let tools = match self {
            ConfigTarget::Conversation(c) => &mut c.tools,
            ConfigTarget::Preset(p) => &mut p.tools,
        };
        tools.get_or_insert_with(Vec::new)
    }

    pub fn endpoint(&self) -> Option<ModelEndpoint> {
        self.settings().endpoint()
    }

    pub fn is_preset(&self) -> bool {
        matches!(self, ConfigTarget::Preset(_))
    }
}

#[derive(Clone, Default)]
pub struct BaseProps {
    pub conversation: Option<ConfigTarget>,
    pub class_name: Option<String>,
    pub is_preset: bool,
    pub readonly: bool,
}

#[derive(Clone)]
pub struct SettingsProps {
    pub base: BaseProps,
    pub set_option: SetOption,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Models {
    pub models: Vec<String>,
}

#[derive(Clone)]
pub struct ModelSelectProps {
    pub settings: SettingsProps,
    pub models: Models,
}

#[derive(Clone)]
pub struct ExamplesProps {
    pub readonly: bool,
    pub class_name: Option<String>,
    pub examples: Vec<Example>,
    pub set_example: SetExample,
    pub add_example: Callback,
    pub remove_example: Callback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleProps {
    pub show_examples: bool,
    pub is_code_chat: bool,
}

#[derive(Clone)]
pub struct GoogleViewProps {
    pub settings: SettingsProps,
    pub google: GoogleProps,
}

#[derive(Clone)]
pub struct SelectProps {
    pub conversation: Option<Conversation>,
    pub set_option: SetOption,
    pub extra_props: Option<GoogleProps>,
}

/// The full setter bundle a settings view receives.
#[derive(Clone)]
pub struct SetOptionsPayload {
    pub set_option: SetOption,
    pub set_example: SetExample,
    pub add_example: Callback,
    pub remove_example: Callback,
    pub set_agent_option: SetOption,
    pub get_conversation: Arc<dyn Fn() -> Option<ConfigTarget> + Send + Sync>,
    pub check_plugin_selection: Predicate,
    pub set_tools: Select,
}

/// Argument of the options hooks: a preset to edit, or a plain flag.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetArg {
    Preset(Preset),
    Flag(bool),
}

/// Result of `UsePresetOptions`: setters, or `false` when there is no preset.
#[derive(Clone)]
pub enum PresetOptions {
    Payload(SetOptionsPayload),
    Unavailable(bool),
}

pub type UseSetOptions = Arc<dyn Fn(Option<PresetArg>) -> SetOptionsPayload + Send + Sync>;
pub type UsePresetOptions = Arc<dyn Fn(Option<PresetArg>) -> PresetOptions + Send + Sync>;

#[derive(Clone)]
pub struct PopoverButton<N> {
    pub label: String,
    pub button_class: String,
    pub handler: Callback,
    pub icon: N,
}

#[derive(Clone)]
pub struct EndpointOptionsPopoverProps<N> {
    pub children: N,
    pub visible: bool,
    pub endpoint: ModelEndpoint,
    pub save_as_preset: Callback,
    pub close_popover: Callback,
}

#[derive(Clone)]
pub struct EditPresetProps {
    pub open: bool,
    pub on_open_change: Arc<dyn Fn(bool) + Send + Sync>,
    pub preset: Preset,
    pub title: Option<String>,
}

/// One chip in the plugin multi-select.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_button: Option<bool>,
}

impl From<&Plugin> for SelectedOption {
    fn from(plugin: &Plugin) -> Self {
        Self {
            icon: Some(plugin.icon.clone()),
            name: Some(plugin.name.clone()),
            is_button: plugin.is_button,
        }
    }
}

#[derive(Clone)]
pub struct MultiSelectDropDownProps {
    pub title: Option<String>,
    pub value: Vec<SelectedOption>,
    pub disabled: bool,
    pub set_selected: Select,
    pub available_values: Vec<Plugin>,
    pub show_above: bool,
    pub show_label: bool,
    pub container_class_name: Option<String>,
    pub is_selected: Predicate,
    pub class_name: Option<String>,
    pub option_value_key: Option<String>,
}

/// A per-endpoint settings view.
pub trait OptionComponent {
    type Output;

    fn render(&self, props: &ModelSelectProps) -> Self::Output;
}

/// A view that switches between several endpoint settings views.
pub trait MultiViewComponent {
    type Output;

    fn render(&self, props: &BaseProps, models: &Models) -> Self::Output;
}
