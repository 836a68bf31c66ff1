//! Transcript display component

use crate::chat::ChatSession;
use crate::conversation::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the conversation, the loading indicator and the reply being typed
pub struct ConversationHistory<'a> {
    chat: &'a ChatSession,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(chat: &'a ChatSession) -> Self {
        Self { chat }
    }

    /// All transcript lines for the given inner width, oldest first
    pub fn lines(&self, width: u16) -> Vec<Line<'a>> {
        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.chat.conversation().iter() {
            all_lines.append(&mut render_message(message, width));
            all_lines.push(Line::from(""));
        }

        if self.chat.is_loading() {
            all_lines.push(Line::from(vec![Span::styled(
                "...",
                Style::default().fg(Color::Yellow),
            )]));
        }

        let typed = self.chat.visible_reply();
        if !typed.is_empty() {
            let content_lines = wrap_text(typed, width.saturating_sub(2) as usize);
            let last = content_lines.len().saturating_sub(1);
            for (i, content_line) in content_lines.into_iter().enumerate() {
                let cursor = if i == last { "▋" } else { "" };
                all_lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(content_line, content_style(Sender::Bot)),
                    Span::styled(cursor, Style::default().fg(Color::Yellow)),
                ]));
            }
        }

        all_lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.chat.conversation().is_empty() && !self.chat.is_loading() {
            let welcome_lines = [
                Line::from(vec![Span::styled(
                    "Ask anything to get started.",
                    Style::default().fg(Color::Gray),
                )]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Press Enter to send. Type /help for commands.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        // Show the newest lines
        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Render a single message into lines
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let timestamp = message.sent_at().format("%H:%M:%S").to_string();
    let header = format!("{} {} {}", message.sender().display_name(), timestamp, "─".repeat(20));
    lines.push(Line::from(vec![Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )]));

    for content_line in wrap_text(message.text(), width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, content_style(message.sender())),
        ]));
    }

    lines
}

fn content_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Bot => Style::default().fg(Color::Green),
    }
}

/// Wrap text to fit within the given width (in characters).
///
/// Explicit line breaks, indentation and inner runs of spaces are kept.
/// Whitespace at a wrap point is dropped, and words wider than the line
/// are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for run in whitespace_runs(paragraph) {
            let run_len = run.chars().count();
            if current_len + run_len <= width {
                current_line.push_str(run);
                current_len += run_len;
                continue;
            }

            if run.starts_with(char::is_whitespace) {
                // break here and drop the space
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                continue;
            }

            if current_len > 0 {
                let finished = std::mem::take(&mut current_line);
                lines.push(finished.trim_end().to_string());
                current_len = 0;
            }
            for ch in run.chars() {
                if current_len == width {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                current_line.push(ch);
                current_len += 1;
            }
        }

        lines.push(current_line);
    }

    lines
}

/// Split into alternating runs of whitespace and non-whitespace
fn whitespace_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if in_space.is_some_and(|previous| previous != is_space) {
            runs.push(&text[start..i]);
            start = i;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}
