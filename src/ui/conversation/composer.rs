use crate::ui::conversation::commands::{parse_slash_command, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

pub const PLACEHOLDER: &str = "Ask Anything";

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter was pressed; the text stays in the box until the chat accepts it
    Submitted(String),
    Command(SlashCommand),
    Stop,
    Clear,
    Quit,
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset, always on a char boundary
    pub cursor_position: usize,
}

/// Single-line input box
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
}

impl Default for ConversationComposer {
    fn default() -> Self {
        Self::new(PLACEHOLDER)
    }
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => ComposerResult::Quit,
                KeyCode::Char('l') => ComposerResult::Clear,
                KeyCode::Char('a') => {
                    self.state.cursor_position = 0;
                    ComposerResult::None
                }
                KeyCode::Char('e') => {
                    self.state.cursor_position = self.state.content.len();
                    ComposerResult::None
                }
                KeyCode::Char('u') => {
                    self.clear();
                    ComposerResult::None
                }
                _ => ComposerResult::None,
            };
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(&self.state.content) {
                    self.clear();
                    return ComposerResult::Command(command);
                }
                return ComposerResult::Submitted(self.state.content.clone());
            }
            KeyCode::Esc => return ComposerResult::Stop,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                self.state.cursor_position = self.prev_boundary();
            }
            KeyCode::Right => {
                self.state.cursor_position = self.next_boundary();
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.content.len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert a character at the cursor position
    fn insert_char(&mut self, c: char) {
        self.state.content.insert(self.state.cursor_position, c);
        self.state.cursor_position += c.len_utf8();
    }

    /// Delete character before cursor
    fn backspace(&mut self) {
        if self.state.cursor_position > 0 {
            let prev = self.prev_boundary();
            self.state.content.remove(prev);
            self.state.cursor_position = prev;
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) {
        if self.state.cursor_position < self.state.content.len() {
            self.state.content.remove(self.state.cursor_position);
        }
    }

    fn prev_boundary(&self) -> usize {
        self.state.content[..self.state.cursor_position]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.state.content[self.state.cursor_position..]
            .chars()
            .next()
            .map(|c| self.state.cursor_position + c.len_utf8())
            .unwrap_or(self.state.cursor_position)
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Clear content
    pub fn clear(&mut self) {
        self.state.content.clear();
        self.state.cursor_position = 0;
    }

    /// Content with the cursor marker, cut to `width` chars so the cursor
    /// stays on screen
    fn visible_window(&self, width: usize) -> String {
        let cursor = self.state.cursor_position.min(self.state.content.len());
        let mut content = self.state.content.clone();
        content.insert(cursor, '▌');

        let chars: Vec<char> = content.chars().collect();
        if width == 0 || chars.len() <= width {
            return content;
        }

        let cursor_index = self.state.content[..cursor].chars().count();
        let start = (cursor_index + 1).saturating_sub(width);
        chars[start..start + width].iter().collect()
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let visible = self.visible_window(inner_area.width as usize);
            let line = Line::from(vec![Span::raw(visible)]);
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
        }
    }
}
