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
    let list = state.users.list();
    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![Span::raw(format!("{} users", list.filtered_len()))],
        theme,
    );

    let rows = list
        .filtered()
        .map(|user| {
            Row::new(vec![
                Cell::from(user.full_name.clone()),
                Cell::from(user.username.clone()),
                Cell::from(user.role.as_str()),
                Cell::from(active_label(user.is_active))
                    .style(table::status_style(user.is_active, theme)),
                Cell::from(date(&user.created_at)),
                Cell::from(date_time(user.last_login.as_ref())),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());

    table::render(
        frame,
        table_area,
        TableView {
            title: "Users".to_string(),
            header: &["Full Name", "Username", "Role", "Status", "Created", "Last Login"],
            widths: &[
                Constraint::Percentage(22),
                Constraint::Percentage(18),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Min(16),
            ],
            selected,
            loading: list.is_loading(),
            empty: "No users found",
        },
        rows,
        theme,
    );
}
