//! Conversation store: the ordered transcript shown to the user

use chrono::{DateTime, Utc};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Assistant",
        }
    }
}

/// A single transcript entry. Fields are only readable once constructed.
#[derive(Debug, Clone)]
pub struct Message {
    text: String,
    sender: Sender,
    sent_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

impl PartialEq for Message {
    // Timestamps are display-only and do not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.sender == other.sender
    }
}

impl Eq for Message {}

/// Append-only list of messages, held in memory for the session lifetime
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message. This is the only way messages leave the store.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
