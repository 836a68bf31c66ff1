//! Conversation UI components for the chat screen

pub mod commands;
pub mod composer;
pub mod controls;
pub mod history;
pub mod manager;

pub use commands::{get_help_text, parse_slash_command, SlashCommand};
pub use composer::{ComposerResult, ConversationComposer};
pub use controls::{Controls, Header};
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager};
