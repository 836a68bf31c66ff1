use crate::chat::{dispatch, ChatSession, ChatTick, ReplyOutcome, TurnReply};
use crate::config::UiConfig;
use crate::events::ChatUpdate;
use crate::llm::GenerativeModel;
use crate::typing::TypingTimer;
use crate::ui::conversation::commands::{get_help_text, SlashCommand};
use crate::ui::conversation::composer::{ComposerResult, ConversationComposer};
use crate::ui::conversation::controls::{Controls, Header};
use crate::ui::conversation::history::ConversationHistory;
use crossterm::event::KeyEvent;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Owns the chat state, the input box, the typing timer and the request task
pub struct ConversationManager {
    chat: ChatSession,
    composer: ConversationComposer,
    model: Arc<dyn GenerativeModel>,
    model_name: String,
    timer: TypingTimer,
    reply_tx: mpsc::UnboundedSender<TurnReply>,
    reply_rx: mpsc::UnboundedReceiver<TurnReply>,
    in_flight: Option<JoinHandle<()>>,
    notice: Option<String>,
}

impl ConversationManager {
    pub fn new(model: Arc<dyn GenerativeModel>, model_name: impl Into<String>, ui: &UiConfig) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        Self {
            chat: ChatSession::new(ui),
            composer: ConversationComposer::default(),
            model,
            model_name: model_name.into(),
            timer: TypingTimer::new(ui.typing_interval()),
            reply_tx,
            reply_rx,
            in_flight: None,
            notice: None,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if self.notice.take().is_some() {
            // any key dismisses the help overlay
            return ConversationAction::None;
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(_) => self.submit(),
            ComposerResult::Stop => self.stop(),
            ComposerResult::Clear => self.clear(),
            ComposerResult::Quit => return ConversationAction::Exit,
            ComposerResult::Command(command) => return self.handle_slash_command(command),
            ComposerResult::None => {}
        }
        ConversationAction::None
    }

    /// Send whatever is in the input box
    pub fn submit(&mut self) {
        let Some(turn) = self.chat.submit(self.composer.content()) else {
            return;
        };
        self.composer.clear();

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let model = Arc::clone(&self.model);
        let tx = self.reply_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let reply = dispatch(model.as_ref(), turn).await;
            let _ = tx.send(reply);
        }));
    }

    /// Stop typing and abandon any pending request
    pub fn stop(&mut self) {
        self.chat.stop();
        self.timer.cancel();
        self.abort_request();
    }

    /// Reset the whole chat, including the input box
    pub fn clear(&mut self) {
        self.chat.clear();
        self.composer.clear();
        self.timer.cancel();
        self.abort_request();
        tracing::info!("conversation cleared");
    }

    fn abort_request(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Wait for the next reply or timer tick
    pub async fn next_update(&mut self) -> ChatUpdate {
        tokio::select! {
            Some(reply) = self.reply_rx.recv() => ChatUpdate::Reply(reply),
            _ = self.timer.tick() => ChatUpdate::Tick,
        }
    }

    /// Apply a reply or tick to the chat
    pub fn apply(&mut self, update: ChatUpdate) {
        match update {
            ChatUpdate::Reply(reply) => {
                let outcome = self.chat.accept_reply(reply);
                if outcome != ReplyOutcome::Stale {
                    self.in_flight = None;
                }
                if outcome == ReplyOutcome::Revealing {
                    self.timer.start();
                }
            }
            ChatUpdate::Tick => {
                // the session may have been stopped since the tick was scheduled
                if !self.chat.is_revealing() {
                    self.timer.cancel();
                    return;
                }
                match self.chat.tick() {
                    ChatTick::Revealed => {}
                    ChatTick::Completed | ChatTick::Inactive => self.timer.cancel(),
                }
            }
        }
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        match command {
            SlashCommand::Stop => self.stop(),
            SlashCommand::Clear => self.clear(),
            SlashCommand::Help => self.notice = Some(get_help_text()),
            SlashCommand::Quit => return ConversationAction::Exit,
        }
        ConversationAction::None
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Render the whole chat screen
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // History
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Controls
            ])
            .split(area);

        Header {
            model: &self.model_name,
        }
        .render(chunks[0], buf);
        ConversationHistory::new(&self.chat).render(chunks[1], buf);
        (&self.composer).render(chunks[2], buf);
        Controls {
            loading: self.chat.is_loading(),
        }
        .render(chunks[3], buf);

        if let Some(notice) = &self.notice {
            let height = (notice.lines().count() as u16 + 2).min(chunks[1].height);
            let width = chunks[1].width.saturating_sub(4).min(70);
            let popup = Rect {
                x: chunks[1].x + (chunks[1].width.saturating_sub(width)) / 2,
                y: chunks[1].y + (chunks[1].height.saturating_sub(height)) / 2,
                width,
                height,
            };
            Clear.render(popup, buf);
            Paragraph::new(notice.as_str())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Help")
                        .style(Style::default().fg(Color::Yellow)),
                )
                .render(popup, buf);
        }
    }
}
