//! gemchat: a terminal chat client for the Gemini `generateContent` API.
//!
//! A prompt is sent as a single unary request; the complete reply is then
//! revealed one character at a time by the typing presenter.

pub mod app;
pub mod ask;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod llm;
pub mod logging;
pub mod markup;
pub mod typing;
pub mod ui;

pub use chat::{ChatSession, Turn, TurnReply};
pub use config::Config;
pub use conversation::{Conversation, Message, Sender};
pub use error::{LlmError, ERROR_REPLY};
pub use llm::{GeminiClient, GenerativeModel};
