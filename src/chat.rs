//! Chat state: conversation, loading flag, pending turn and typing session.
//!
//! `ChatSession` is plain synchronous state so every transition can be
//! exercised without a terminal or a network. The async side lives in
//! [`dispatch`], which performs the single API call for a [`Turn`].

use crate::config::{StopBehavior, UiConfig};
use crate::conversation::{Conversation, Message};
use crate::error::{LlmError, ERROR_REPLY};
use crate::llm::GenerativeModel;
use crate::markup::strip_emphasis;
use crate::typing::{TickOutcome, TypingSession};

/// One accepted submission waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: u64,
    pub prompt: String,
}

/// The result of a turn's API call
#[derive(Debug)]
pub struct TurnReply {
    pub id: u64,
    pub result: Result<String, LlmError>,
}

/// What happened to a reply handed to [`ChatSession::accept_reply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The reply is being revealed; the caller should start the timer
    Revealing,
    /// The call failed and the error message was appended
    Failed,
    /// The turn was stopped or cleared before the reply arrived
    Stale,
}

/// What a tick did to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTick {
    Revealed,
    /// The reply was committed; the caller should stop the timer
    Completed,
    Inactive,
}

/// Perform the API call for `turn`
pub async fn dispatch(model: &dyn GenerativeModel, turn: Turn) -> TurnReply {
    let result = model.generate_content(&turn.prompt).await;
    TurnReply { id: turn.id, result }
}

#[derive(Debug)]
pub struct ChatSession {
    conversation: Conversation,
    typing: TypingSession,
    loading: bool,
    pending: Option<u64>,
    next_turn: u64,
    strip_emphasis: bool,
    on_stop: StopBehavior,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(&UiConfig::default())
    }
}

impl ChatSession {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            conversation: Conversation::new(),
            typing: TypingSession::new(),
            loading: false,
            pending: None,
            next_turn: 1,
            strip_emphasis: ui.strip_emphasis,
            on_stop: ui.on_stop,
        }
    }

    /// Accept a prompt. Returns the turn to dispatch, or `None` when the
    /// prompt is blank or a previous turn is still loading.
    pub fn submit(&mut self, prompt: &str) -> Option<Turn> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        if self.loading {
            tracing::debug!("submission refused while a reply is loading");
            return None;
        }

        let id = self.next_turn;
        self.next_turn += 1;

        self.conversation.push(Message::user(prompt));
        self.typing.reset();
        self.loading = true;
        self.pending = Some(id);

        tracing::info!(turn = id, chars = prompt.chars().count(), "prompt submitted");
        Some(Turn {
            id,
            prompt: prompt.to_string(),
        })
    }

    /// Apply the reply of a dispatched turn
    pub fn accept_reply(&mut self, reply: TurnReply) -> ReplyOutcome {
        if self.pending != Some(reply.id) {
            tracing::debug!(turn = reply.id, "dropping reply for stale turn");
            return ReplyOutcome::Stale;
        }
        self.pending = None;

        match reply.result {
            Ok(text) => {
                let text = if self.strip_emphasis {
                    strip_emphasis(&text)
                } else {
                    text
                };
                tracing::info!(turn = reply.id, chars = text.chars().count(), "reply received");
                self.typing.start(text);
                ReplyOutcome::Revealing
            }
            Err(err) => {
                tracing::warn!(turn = reply.id, error = %err, "generateContent failed");
                self.conversation.push(Message::bot(ERROR_REPLY));
                self.loading = false;
                ReplyOutcome::Failed
            }
        }
    }

    /// Advance the typing animation by one character
    pub fn tick(&mut self) -> ChatTick {
        if !self.typing.is_active() {
            return ChatTick::Inactive;
        }

        match self.typing.tick() {
            TickOutcome::Revealed(_) => ChatTick::Revealed,
            TickOutcome::Completed(text) => {
                self.conversation.push(Message::bot(text));
                self.typing.reset();
                self.loading = false;
                ChatTick::Completed
            }
            TickOutcome::Inactive => ChatTick::Inactive,
        }
    }

    /// Cancel the typing animation and any pending request. Safe to call
    /// at any time.
    pub fn stop(&mut self) {
        if let Some(partial) = self.typing.stop() {
            if self.on_stop == StopBehavior::Commit && !partial.is_empty() {
                self.conversation.push(Message::bot(partial));
            }
        }
        if self.loading || self.pending.is_some() {
            tracing::info!("reply stopped");
        }
        self.typing.reset();
        self.pending = None;
        self.loading = false;
    }

    /// Reset to an empty chat. Safe to call at any time.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.typing.reset();
        self.pending = None;
        self.loading = false;
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Reply text revealed so far
    pub fn visible_reply(&self) -> &str {
        self.typing.visible()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_revealing(&self) -> bool {
        self.typing.is_active()
    }
}
