// src/services/options_editor.rs
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ContractError, ContractResult, LogRejected};
use crate::models::conversation::Conversation;
use crate::models::message::Example;
use crate::models::plugin::Plugin;
use crate::models::settings::EndpointSettings;
use crate::models::ui::{
    BaseProps, ConfigTarget, ExampleField, ExamplesProps, Models, ModelSelectProps,
    MultiSelectDropDownProps, OptionValue, PresetArg, PresetOptions, SelectedOption,
    SetOptionsPayload, SettingsProps, UsePresetOptions, UseSetOptions,
};

/// Edits one conversation or preset in place. Clones share the same target,
/// so every callback handed to a view sees the others' edits.
#[derive(Clone)]
pub struct OptionsEditor {
    target: Arc<RwLock<ConfigTarget>>,
    available_tools: Arc<Vec<Plugin>>,
}

impl std::fmt::Debug for OptionsEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsEditor")
            .field("available_tools", &self.available_tools.len())
            .finish()
    }
}

impl OptionsEditor {
    pub fn new(target: ConfigTarget, available_tools: Vec<Plugin>) -> Self {
        Self {
            target: Arc::new(RwLock::new(target)),
            available_tools: Arc::new(available_tools),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ConfigTarget> {
        self.target.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConfigTarget> {
        self.target.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the record being edited.
    pub fn conversation(&self) -> ConfigTarget {
        self.read().clone()
    }

    pub fn set_option(&self, name: &str, value: OptionValue) -> ContractResult<()> {
        self.write().settings_mut().set_field(name, value)
    }

    pub fn set_example(&self, index: usize, field: ExampleField, value: Option<OptionValue>) -> ContractResult<()> {
        let content = match value {
            Some(value) => value.into_text("examples")?,
            None => String::new(),
        };
        self.write().settings_mut().edit_examples(|examples| {
            let example = examples.get_mut(index).ok_or(ContractError::ExampleOutOfRange(index))?;
            match field {
                ExampleField::Input => example.input.content = content,
                ExampleField::Output => example.output.content = content,
            }
            Ok(())
        })
    }

    pub fn add_example(&self) -> ContractResult<()> {
        self.write().settings_mut().edit_examples(|examples| {
            examples.push(Example::default());
            Ok(())
        })
    }

    /// Removes the last example. The list never drops below one entry; the
    /// last remaining example is blanked instead.
    pub fn remove_example(&self) -> ContractResult<()> {
        self.write().settings_mut().edit_examples(|examples| {
            if examples.len() <= 1 {
                *examples = vec![Example::default()];
            } else {
                examples.pop();
            }
            Ok(())
        })
    }

    pub fn set_agent_option(&self, name: &str, value: OptionValue) -> ContractResult<()> {
        self.write()
            .settings_mut()
            .edit_agent_options(|options| options.set(name, value))
    }

    pub fn check_plugin_selection(&self, plugin_key: &str) -> bool {
        self.read().tools().iter().any(|t| t.plugin_key == plugin_key)
    }

    /// Toggles a plugin in the record's tool list.
    pub fn set_tools(&self, plugin_key: &str) -> ContractResult<()> {
        let mut target = self.write();
        let tools = target.tools_mut();
        if let Some(pos) = tools.iter().position(|t| t.plugin_key == plugin_key) {
            tools.remove(pos);
            return Ok(());
        }
        let plugin = self
            .available_tools
            .iter()
            .find(|t| t.plugin_key == plugin_key)
            .ok_or_else(|| ContractError::UnknownPlugin(plugin_key.to_string()))?;
        tools.push(plugin.clone());
        Ok(())
    }

    /// Packages the editor as the callback bundle a settings view receives.
    /// Rejected edits are logged and leave the record unchanged.
    pub fn payload(&self) -> SetOptionsPayload {
        let set_option = self.clone();
        let set_example = self.clone();
        let add_example = self.clone();
        let remove_example = self.clone();
        let set_agent_option = self.clone();
        let get_conversation = self.clone();
        let check_plugin_selection = self.clone();
        let set_tools = self.clone();

        SetOptionsPayload {
            set_option: Arc::new(move |name: &str, value: OptionValue| {
                set_option.set_option(name, value).log_rejected("setOption");
            }),
            set_example: Arc::new(move |index: usize, field: ExampleField, value: Option<OptionValue>| {
                set_example.set_example(index, field, value).log_rejected("setExample");
            }),
            add_example: Arc::new(move || add_example.add_example().log_rejected("addExample")),
            remove_example: Arc::new(move || remove_example.remove_example().log_rejected("removeExample")),
            set_agent_option: Arc::new(move |name: &str, value: OptionValue| {
                set_agent_option.set_agent_option(name, value).log_rejected("setAgentOption");
            }),
            get_conversation: Arc::new(move || Some(get_conversation.conversation())),
            check_plugin_selection: Arc::new(move |key: &str| check_plugin_selection.check_plugin_selection(key)),
            set_tools: Arc::new(move |key: &str| set_tools.set_tools(key).log_rejected("setTools")),
        }
    }

    pub fn base_props(&self, class_name: Option<String>, readonly: bool) -> BaseProps {
        let target = self.conversation();
        BaseProps {
            is_preset: target.is_preset(),
            conversation: Some(target),
            class_name,
            readonly,
        }
    }

    pub fn settings_props(&self, class_name: Option<String>, readonly: bool) -> SettingsProps {
        SettingsProps {
            base: self.base_props(class_name, readonly),
            set_option: self.payload().set_option,
        }
    }

    pub fn model_select_props(&self, models: Vec<String>) -> ModelSelectProps {
        ModelSelectProps {
            settings: self.settings_props(None, false),
            models: Models { models },
        }
    }

    /// Props for the examples editor; `None` unless the endpoint takes examples.
    pub fn examples_props(&self, readonly: bool) -> Option<ExamplesProps> {
        let examples = match self.read().settings() {
            EndpointSettings::Google(google) => {
                google.examples.clone().unwrap_or_default()
            }
            _ => return None,
        };
        let payload = self.payload();
        Some(ExamplesProps {
            readonly,
            class_name: None,
            examples,
            set_example: payload.set_example,
            add_example: payload.add_example,
            remove_example: payload.remove_example,
        })
    }

    /// Props for the plugin picker.
    pub fn plugin_select_props(&self) -> MultiSelectDropDownProps {
        let payload = self.payload();
        let value = self.read().tools().iter().map(SelectedOption::from).collect();
        MultiSelectDropDownProps {
            title: Some("Plugins".to_string()),
            value,
            disabled: false,
            set_selected: payload.set_tools,
            available_values: self.available_tools.as_ref().clone(),
            show_above: false,
            show_label: true,
            container_class_name: None,
            is_selected: payload.check_plugin_selection,
            class_name: None,
            option_value_key: Some("pluginKey".to_string()),
        }
    }
}

/// Hook: edits `preset` when one is passed, otherwise the current conversation.
pub fn use_set_options(current: Conversation, available_tools: Vec<Plugin>) -> UseSetOptions {
    Arc::new(move |preset: Option<PresetArg>| {
        let target = match preset {
            Some(PresetArg::Preset(preset)) => ConfigTarget::Preset(preset),
            _ => ConfigTarget::Conversation(current.clone()),
        };
        OptionsEditor::new(target, available_tools.clone()).payload()
    })
}

/// Hook: setters for a preset, or `false` when no preset is being edited.
pub fn use_preset_options(available_tools: Vec<Plugin>) -> UsePresetOptions {
    Arc::new(move |preset: Option<PresetArg>| match preset {
        Some(PresetArg::Preset(preset)) => {
            PresetOptions::Payload(OptionsEditor::new(ConfigTarget::Preset(preset), available_tools.clone()).payload())
        }
        _ => PresetOptions::Unavailable(false),
    })
}
