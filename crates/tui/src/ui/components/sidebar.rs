use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::{
    app::{AppState, Section},
    ui::theme::Theme,
};

/// Section menu. Collapsed, it keeps only the jump digits.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let collapsed = state.session.sidebar_collapsed();
    let lines = Section::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let active = *section == state.section;
            let style = if active {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            let marker = if active { "›" } else { " " };
            let mut spans = vec![
                Span::styled(marker, style),
                Span::styled(format!("{}", i + 1), Style::default().fg(theme.text_muted)),
            ];
            if !collapsed {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(section.label(), style));
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    let title = if collapsed { "" } else { " Bingo Admin " };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(theme.accent)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
