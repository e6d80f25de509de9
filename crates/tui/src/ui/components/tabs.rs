use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

/// Horizontal tab strip; the active label is bracketed.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, labels: &[&str], active: usize, theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        if i == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label.to_string(),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(
                label.to_string(),
                Style::default().fg(theme.text_muted),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
