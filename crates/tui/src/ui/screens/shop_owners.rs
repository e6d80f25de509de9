use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row},
};

use super::{active_label, date, date_time, render_header, split_header};
use crate::{
    app::AppState,
    ui::{
        components::table::{self, TableView},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let list = state.shop_owners.list();
    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![Span::raw(format!("{} owners", list.filtered_len()))],
        theme,
    );

    let rows = list
        .filtered()
        .map(|owner| {
            Row::new(vec![
                Cell::from(owner.display_name()),
                Cell::from(owner.username.clone()),
                Cell::from(active_label(owner.is_active))
                    .style(table::status_style(owner.is_active, theme)),
                Cell::from(date(&owner.created_at)),
                Cell::from(date_time(owner.last_login.as_ref())),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());

    table::render(
        frame,
        table_area,
        TableView {
            title: "Shop Owners".to_string(),
            header: &["Name", "Username", "Status", "Created", "Last Login"],
            widths: &[
                Constraint::Percentage(25),
                Constraint::Percentage(20),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Min(16),
            ],
            selected,
            loading: list.is_loading(),
            empty: "No shop owners found",
        },
        rows,
        theme,
    );
}
