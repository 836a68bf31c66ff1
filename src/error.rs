use thiserror::Error;

/// Bot reply shown for any failed turn
pub const ERROR_REPLY: &str = "Error generating response";

/// Failure of a `generateContent` call.
///
/// The chat never shows these apart: every variant becomes [`ERROR_REPLY`].
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (set GEMINI_API_KEY or gemini_api_key in config.toml)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("prompt was blocked: {0}")]
    Blocked(String),

    #[error("response contained no candidates")]
    EmptyResponse,
}
