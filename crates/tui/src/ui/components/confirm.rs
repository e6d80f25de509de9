use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{components::centered_box, theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let popup = centered_box(52, 7, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme.text))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw(" confirm  "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ]),
    ];
    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.warning));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        popup,
    );
}
