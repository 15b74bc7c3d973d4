use chat_contracts::models::settings::{EndpointSettings, GoogleSettings, OpenAiSettings};
use chat_contracts::models::ui::{ConfigTarget, ExampleField, OptionValue, PresetArg, PresetOptions};
use chat_contracts::models::{Conversation, Plugin, Preset};
use chat_contracts::services::options_editor::{OptionsEditor, use_preset_options, use_set_options};

fn plugin(key: &str) -> Plugin {
    Plugin {
        name: key.to_uppercase(),
        plugin_key: key.to_string(),
        description: String::new(),
        icon: format!("/assets/{key}.png"),
        auth_config: Vec::new(),
        authenticated: true,
        is_button: None,
    }
}

fn openai() -> Conversation {
    Conversation::new("Chat", EndpointSettings::OpenAi(OpenAiSettings::default()))
}

#[test]
fn set_option_through_payload() {
    let editor = OptionsEditor::new(ConfigTarget::Conversation(openai()), Vec::new());
    let payload = editor.payload();

    (payload.set_option)("temperature", OptionValue::Number(1.2));
    (payload.set_option)("chatGptLabel", OptionValue::Text("Helper".into()));
    // Not an openAI field: ignored.
    (payload.set_option)("toneStyle", OptionValue::Text("creative".into()));

    let target = (payload.get_conversation)().unwrap();
    let EndpointSettings::OpenAi(settings) = target.settings() else {
        panic!("expected openAI settings");
    };
    assert_eq!(settings.temperature, Some(1.2));
    assert_eq!(settings.chat_gpt_label.as_deref(), Some("Helper"));
    assert!(target.settings().to_raw().tone_style.is_none());
}

#[test]
fn google_examples_through_payload() {
    let convo = Conversation::new("G", EndpointSettings::Google(GoogleSettings::default()));
    let editor = OptionsEditor::new(ConfigTarget::Conversation(convo), Vec::new());
    let payload = editor.payload();

    (payload.add_example)();
    (payload.add_example)();
    (payload.set_example)(1, ExampleField::Input, Some(OptionValue::Text("q".into())));
    (payload.set_example)(1, ExampleField::Output, Some(OptionValue::Text("a".into())));

    let props = editor.examples_props(false).unwrap();
    assert_eq!(props.examples.len(), 2);
    assert_eq!(props.examples[1].input.content, "q");
    assert_eq!(props.examples[1].output.content, "a");

    (props.remove_example)();
    assert_eq!(editor.examples_props(false).unwrap().examples.len(), 1);
}

#[test]
fn examples_props_only_for_google() {
    let editor = OptionsEditor::new(ConfigTarget::Conversation(openai()), Vec::new());
    assert!(editor.examples_props(true).is_none());
}

#[test]
fn tools_toggle() {
    let editor = OptionsEditor::new(
        ConfigTarget::Conversation(openai()),
        vec![plugin("wolfram"), plugin("zapier")],
    );
    let props = editor.plugin_select_props();

    (props.set_selected)("wolfram");
    assert!((props.is_selected)("wolfram"));
    assert!(!(props.is_selected)("zapier"));

    (props.set_selected)("wolfram");
    assert!(!(props.is_selected)("wolfram"));

    // Not available: nothing happens.
    (props.set_selected)("browser");
    assert!(editor.conversation().tools().is_empty());

    editor.set_tools("zapier").unwrap();
    assert_eq!(editor.plugin_select_props().value[0].name.as_deref(), Some("ZAPIER"));
}

#[test]
fn hooks_pick_the_edit_target() {
    let preset = Preset::from_json(r#"{"title": "Saved", "endpoint": "openAI"}"#).unwrap();

    let use_options = use_set_options(openai(), Vec::new());
    let conversation_payload = use_options(None);
    assert!(matches!(
        (conversation_payload.get_conversation)(),
        Some(ConfigTarget::Conversation(_))
    ));
    let preset_payload = use_options(Some(PresetArg::Preset(preset.clone())));
    assert!(matches!((preset_payload.get_conversation)(), Some(ConfigTarget::Preset(_))));

    let use_preset = use_preset_options(Vec::new());
    assert!(matches!(use_preset(Some(PresetArg::Flag(true))), PresetOptions::Unavailable(false)));
    assert!(matches!(use_preset(Some(PresetArg::Preset(preset))), PresetOptions::Payload(_)));
}

#[test]
fn settings_props_reflect_target() {
    let preset = Preset::from_json(r#"{"title": "Saved", "endpoint": "openAI", "model": "gpt-4"}"#).unwrap();
    let editor = OptionsEditor::new(ConfigTarget::Preset(preset), Vec::new());
    let props = editor.model_select_props(vec!["gpt-4".into(), "gpt-3.5-turbo".into()]);

    assert!(props.settings.base.is_preset);
    assert_eq!(props.models.models.len(), 2);
    (props.settings.set_option)("model", OptionValue::Text("gpt-3.5-turbo".into()));
    assert_eq!(editor.conversation().settings().model(), Some("gpt-3.5-turbo"));
}
