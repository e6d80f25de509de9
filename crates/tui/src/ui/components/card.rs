use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::ui::theme::Theme;

/// Rounded panel used around every table and stat.
pub struct Card<'a> {
    title: String,
    theme: &'a Theme,
}

impl<'a> Card<'a> {
    pub fn new(title: impl Into<String>, theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            theme,
        }
    }

    pub fn block(&self) -> Block<'static> {
        Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(self.theme.accent),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border))
    }
}

/// Dashboard counter: total on top, active count below.
pub struct StatCard<'a> {
    title: &'a str,
    total: u64,
    active: u64,
    theme: &'a Theme,
}

impl<'a> StatCard<'a> {
    pub fn new(title: &'a str, total: u64, active: u64, theme: &'a Theme) -> Self {
        Self {
            title,
            total,
            active,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                self.total.to_string(),
                Style::default()
                    .fg(self.theme.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} active", self.active),
                Style::default().fg(self.theme.positive),
            )),
        ];
        let card = Card::new(self.title, self.theme);
        frame.render_widget(Paragraph::new(lines).block(card.block()), area);
    }
}
