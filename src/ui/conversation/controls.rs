//! Header and control hints around the conversation

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub const TITLE: &str = "AI Chat Assistant";

/// Title bar with the model name on the right
pub struct Header<'a> {
    pub model: &'a str,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(vec![Span::styled(
            TITLE,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]);
        buf.set_line(area.x, area.y, &title, area.width);

        let model = format!("model: {}", self.model);
        let width = model.chars().count() as u16;
        if width < area.width.saturating_sub(TITLE.len() as u16 + 1) {
            let line = Line::from(vec![Span::styled(model, Style::default().fg(Color::DarkGray))]);
            buf.set_line(area.x + area.width - width, area.y, &line, width);
        }
    }
}

/// Send / stop / clear hints. Stop is only offered while a reply is loading.
pub struct Controls {
    pub loading: bool,
}

impl Controls {
    pub fn line(&self) -> Line<'static> {
        let key = Style::default().fg(Color::Black).bg(Color::Gray);
        let label = Style::default().fg(Color::Gray);

        let mut spans = vec![
            Span::styled(" Enter ", key),
            Span::styled(" send  ", label),
        ];
        if self.loading {
            spans.push(Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::Red)));
            spans.push(Span::styled(" stop  ", Style::default().fg(Color::Red)));
        }
        spans.push(Span::styled(" Ctrl+L ", key));
        spans.push(Span::styled(" clear  ", label));
        spans.push(Span::styled(" Ctrl+C ", key));
        spans.push(Span::styled(" quit", label));
        Line::from(spans)
    }
}

impl Widget for Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}
