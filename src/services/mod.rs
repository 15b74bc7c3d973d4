pub mod metrics_manager;
pub mod options_editor;
