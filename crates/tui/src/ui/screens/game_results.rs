use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::Row,
};

use super::{render_header, split_header};
use crate::{
    app::AppState,
    ui::{
        components::table::{self, TableView},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.game_results;
    let query = &view.query;
    let shop = query
        .shop_id
        .as_deref()
        .and_then(|id| view.catalog().shop_name(id))
        .unwrap_or("-");
    let event = if query.event_id().is_empty() {
        "-"
    } else {
        query.event_id()
    };
    let (auto, auto_style) = if view.auto_refresh() {
        ("on", Style::default().fg(theme.positive))
    } else {
        ("off", Style::default().fg(theme.text_muted))
    };

    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![
            Span::styled(" Shop", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {shop}   ")),
            Span::styled("Date", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {}   ", query.date.format("%Y-%m-%d"))),
            Span::styled("Event", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {event}   ")),
            Span::styled("Auto-refresh", Style::default().fg(theme.text_muted)),
            Span::raw(": "),
            Span::styled(auto, auto_style),
        ],
        theme,
    );

    let rows = view
        .list()
        .items()
        .iter()
        .map(|result| {
            let numbers = result
                .called_numbers
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            Row::new(vec![
                result.event_id.clone(),
                result.shop_name.clone(),
                result.game_type.clone(),
                result.draw_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{} ({})", numbers, result.called_numbers.len()),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());
    let empty = if view.has_searched() {
        "No game results found"
    } else {
        "Press f to search by shop, date and event ID"
    };

    table::render(
        frame,
        table_area,
        TableView {
            title: "Game Results".to_string(),
            header: &["Event", "Shop", "Type", "Drawn At", "Called Numbers"],
            widths: &[
                Constraint::Length(8),
                Constraint::Percentage(18),
                Constraint::Length(10),
                Constraint::Length(20),
                Constraint::Min(20),
            ],
            selected,
            loading: view.list().is_loading(),
            empty,
        },
        rows,
        theme,
    );
}
