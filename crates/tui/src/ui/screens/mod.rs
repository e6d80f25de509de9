pub mod cashiers;
pub mod dashboard;
pub mod game_results;
pub mod login;
pub mod reports;
pub mod shop_owners;
pub mod shops;
pub mod slips;
pub mod users;

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, Mode},
    ui::theme::Theme,
};

/// Splits off a one-line header above the table.
fn split_header(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    (layout[0], layout[1])
}

/// Search term plus any section-specific spans.
fn render_header(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    extra: Vec<Span<'static>>,
    theme: &Theme,
) {
    let mut line = Vec::new();
    let searching = state.mode == Mode::Search;
    let term = state.search_term();
    if searching || !term.is_empty() {
        let mut style = Style::default().fg(theme.text);
        if searching {
            style = style.fg(theme.accent).add_modifier(Modifier::BOLD);
        }
        let shown = if term.is_empty() { "…" } else { term };
        line.push(Span::styled(" Search", Style::default().fg(theme.text_muted)));
        line.push(Span::raw(": "));
        line.push(Span::styled(shown.to_string(), style));
        line.push(Span::raw("   "));
    }
    line.extend(extra);
    frame.render_widget(Paragraph::new(Line::from(line)), area);
}

fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn date_time(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(
        || "Never".to_string(),
        |value| value.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn active_label(active: bool) -> &'static str {
    if active { "Active" } else { "Inactive" }
}
