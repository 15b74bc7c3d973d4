//! Records exchanged between the chat web client and its backend.
//!
//! Field names on the wire are the client's camelCase keys (plus a few
//! snake_case sampling parameters); every type here serializes to exactly
//! that shape.

pub mod api;
pub mod conversation;
pub mod endpoint;
pub mod message;
pub mod plugin;
pub mod preset;
pub mod settings;
pub mod submission;
pub mod timestamp;
pub mod ui;
pub mod user;

pub use conversation::Conversation;
pub use endpoint::{EndpointFamily, ModelEndpoint};
pub use message::{Example, Message, Messages};
pub use plugin::{Plugin, PluginAction, PluginActionKind, PluginAuthConfig};
pub use preset::{CleanupPreset, Preset, PresetDraft, cleanup_preset};
pub use settings::{AgentOptions, EndpointSettings, ParseMode, RawSettings};
pub use submission::{EndpointOption, Submission, SubmissionOverrides};
pub use timestamp::Timestamp;
pub use user::{LoginResponse, User};
