//! Typing presenter: reveals a fully received reply one character per tick

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Lifecycle of a typing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingPhase {
    Idle,
    Revealing,
    Completed,
    Cancelled,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more character became visible
    Revealed(char),
    /// Every character has been shown; carries the full source text
    Completed(String),
    /// No session is revealing; the tick had no effect
    Inactive,
}

/// State for one reveal of a reply
#[derive(Debug, Clone)]
pub struct TypingSession {
    source: String,
    /// Text shown so far
    revealed: String,
    /// Characters revealed so far
    index: usize,
    /// Byte offset of the next character in `source`
    cursor: usize,
    phase: TypingPhase,
}

impl Default for TypingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingSession {
    pub fn new() -> Self {
        Self {
            source: String::new(),
            revealed: String::new(),
            index: 0,
            cursor: 0,
            phase: TypingPhase::Idle,
        }
    }

    /// Begin revealing `text` from the first character
    pub fn start(&mut self, text: String) {
        tracing::debug!(chars = text.chars().count(), "typing started");
        self.source = text;
        self.revealed.clear();
        self.index = 0;
        self.cursor = 0;
        self.phase = TypingPhase::Revealing;
    }

    /// Advance by one character, or complete once everything is visible
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TypingPhase::Revealing {
            return TickOutcome::Inactive;
        }

        match self.source[self.cursor..].chars().next() {
            Some(ch) => {
                self.revealed.push(ch);
                self.cursor += ch.len_utf8();
                self.index += 1;
                TickOutcome::Revealed(ch)
            }
            None => {
                self.phase = TypingPhase::Completed;
                tracing::debug!(chars = self.index, "typing completed");
                TickOutcome::Completed(self.source.clone())
            }
        }
    }

    /// Cancel an active reveal. Returns the partially revealed text, or
    /// `None` when nothing was revealing.
    pub fn stop(&mut self) -> Option<String> {
        if self.phase != TypingPhase::Revealing {
            return None;
        }
        self.phase = TypingPhase::Cancelled;
        tracing::debug!(chars = self.index, "typing cancelled");
        Some(self.revealed.clone())
    }

    /// Return to idle and drop the visible buffer
    pub fn reset(&mut self) {
        self.source.clear();
        self.revealed.clear();
        self.index = 0;
        self.cursor = 0;
        self.phase = TypingPhase::Idle;
    }

    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == TypingPhase::Revealing
    }

    /// Text revealed so far
    pub fn visible(&self) -> &str {
        &self.revealed
    }

    pub fn revealed_count(&self) -> usize {
        self.index
    }
}

/// Owned handle to the single periodic timer that drives a reveal
#[derive(Debug)]
pub struct TypingTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl TypingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    /// Start ticking, replacing any interval that was already running
    pub fn start(&mut self) {
        let start = tokio::time::Instant::now() + self.period;
        let mut interval = tokio::time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Pends forever while cancelled.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_to_end(session: &mut TypingSession) -> (usize, Option<String>) {
        let mut reveals = 0;
        loop {
            match session.tick() {
                TickOutcome::Revealed(_) => reveals += 1,
                TickOutcome::Completed(text) => return (reveals, Some(text)),
                TickOutcome::Inactive => return (reveals, None),
            }
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let mut session = TypingSession::new();
        assert_eq!(session.phase(), TypingPhase::Idle);
        assert_eq!(session.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn test_reveals_exactly_n_characters_then_completes() {
        let mut session = TypingSession::new();
        session.start("Hi there".to_string());

        let (reveals, completed) = run_to_end(&mut session);
        assert_eq!(reveals, 8);
        assert_eq!(completed.as_deref(), Some("Hi there"));
        assert_eq!(session.phase(), TypingPhase::Completed);
        assert_eq!(session.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn test_reveal_order_matches_source() {
        let mut session = TypingSession::new();
        session.start("abc".to_string());
        assert_eq!(session.tick(), TickOutcome::Revealed('a'));
        assert_eq!(session.visible(), "a");
        assert_eq!(session.tick(), TickOutcome::Revealed('b'));
        assert_eq!(session.tick(), TickOutcome::Revealed('c'));
        assert_eq!(session.visible(), "abc");
        assert_eq!(session.revealed_count(), 3);
    }

    #[test]
    fn test_multibyte_characters_reveal_whole() {
        let mut session = TypingSession::new();
        session.start("héllo 👋".to_string());
        let (reveals, completed) = run_to_end(&mut session);
        assert_eq!(reveals, 7);
        assert_eq!(completed.as_deref(), Some("héllo 👋"));
    }

    #[test]
    fn test_empty_reply_completes_on_first_tick() {
        let mut session = TypingSession::new();
        session.start(String::new());
        assert_eq!(session.tick(), TickOutcome::Completed(String::new()));
    }

    #[test]
    fn test_stop_cancels_and_returns_partial() {
        let mut session = TypingSession::new();
        session.start("Hello".to_string());
        session.tick();
        session.tick();

        assert_eq!(session.stop().as_deref(), Some("He"));
        assert_eq!(session.phase(), TypingPhase::Cancelled);
        assert_eq!(session.tick(), TickOutcome::Inactive);
        assert_eq!(session.visible(), "He");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = TypingSession::new();
        assert_eq!(session.stop(), None);
        session.start("x".to_string());
        assert!(session.stop().is_some());
        assert_eq!(session.stop(), None);
    }

    #[test]
    fn test_restart_resets_index() {
        let mut session = TypingSession::new();
        session.start("first".to_string());
        session.tick();
        session.tick();
        session.start("second".to_string());
        assert_eq!(session.visible(), "");
        assert_eq!(session.tick(), TickOutcome::Revealed('s'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_after_one_period() {
        let mut timer = TypingTimer::new(Duration::from_millis(10));
        timer.start();
        let before = tokio::time::Instant::now();
        timer.tick().await;
        assert_eq!(before.elapsed(), Duration::from_millis(10));
        timer.tick().await;
        assert_eq!(before.elapsed(), Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let mut timer = TypingTimer::new(Duration::from_millis(10));
        timer.start();
        timer.cancel();
        assert!(!timer.is_running());

        let fired = tokio::time::timeout(Duration::from_secs(1), timer.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_interval() {
        let mut timer = TypingTimer::new(Duration::from_millis(10));
        timer.start();
        tokio::time::advance(Duration::from_millis(5)).await;
        timer.start();

        let before = tokio::time::Instant::now();
        timer.tick().await;
        assert_eq!(before.elapsed(), Duration::from_millis(10));
    }
}
