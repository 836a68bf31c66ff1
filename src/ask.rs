//! One-shot mode: send a single prompt and type the reply to stdout

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::chat::{dispatch, ChatSession, ChatTick, ReplyOutcome};
use crate::config::Config;
use crate::error::ERROR_REPLY;
use crate::llm::{GeminiClient, GenerativeModel};
use crate::typing::TypingTimer;

pub async fn run(config: &Config, prompt: &str) -> Result<()> {
    let client = GeminiClient::new(config).context("Failed to create HTTP client")?;
    let mut stdout = io::stdout();
    ask(&client, config, prompt, &mut stdout).await
}

/// Run one turn against `model`, typing the reply into `out`.
/// Ctrl+C stops the animation.
pub async fn ask<W: Write>(
    model: &dyn GenerativeModel,
    config: &Config,
    prompt: &str,
    out: &mut W,
) -> Result<()> {
    let mut chat = ChatSession::new(&config.ui);
    let Some(turn) = chat.submit(prompt) else {
        anyhow::bail!("prompt is empty");
    };

    let reply = tokio::select! {
        reply = dispatch(model, turn) => reply,
        _ = tokio::signal::ctrl_c() => {
            chat.stop();
            return Ok(());
        }
    };

    match chat.accept_reply(reply) {
        ReplyOutcome::Revealing => {}
        ReplyOutcome::Failed | ReplyOutcome::Stale => anyhow::bail!(ERROR_REPLY),
    }

    let mut timer = TypingTimer::new(config.ui.typing_interval());
    timer.start();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                let shown = chat.visible_reply().len();
                match chat.tick() {
                    ChatTick::Revealed => {
                        out.write_all(chat.visible_reply()[shown..].as_bytes())?;
                        out.flush()?;
                    }
                    ChatTick::Completed | ChatTick::Inactive => break,
                }
            }
            _ = &mut ctrl_c => {
                chat.stop();
                break;
            }
        }
    }
    timer.cancel();
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl GenerativeModel for Fixed {
        async fn generate_content(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).ok_or(LlmError::EmptyResponse)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_types_full_reply() {
        let mut out = Vec::new();
        ask(&Fixed(Some("**Hi** there")), &Config::default(), "Hello", &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi there\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reports_generic_error() {
        let mut out = Vec::new();
        let err = ask(&Fixed(None), &Config::default(), "X", &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), ERROR_REPLY);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected() {
        let mut out = Vec::new();
        assert!(ask(&Fixed(Some("x")), &Config::default(), "  ", &mut out).await.is_err());
    }
}
