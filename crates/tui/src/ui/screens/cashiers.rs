use admin_core::views::cashiers::ShopFilter;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row},
};

use super::{active_label, date_time, render_header, split_header};
use crate::{
    app::AppState,
    ui::{
        components::table::{self, TableView},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.cashiers;
    let shop = match view.shop_filter() {
        ShopFilter::All => "All shops".to_string(),
        ShopFilter::Shop(id) => view
            .shops()
            .iter()
            .find(|shop| shop.id == *id)
            .map_or_else(|| id.clone(), |shop| shop.shop_name.clone()),
    };
    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![
            Span::styled("Shop", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {shop}")),
        ],
        theme,
    );

    let rows = view
        .visible()
        .map(|cashier| {
            let connected = cashier.is_connected.unwrap_or(false);
            Row::new(vec![
                Cell::from(cashier.full_name.clone()),
                Cell::from(cashier.username.clone()),
                Cell::from(cashier.shop.shop_name.clone()),
                Cell::from(active_label(cashier.is_active))
                    .style(table::status_style(cashier.is_active, theme)),
                Cell::from(if connected { "online" } else { "offline" })
                    .style(table::status_style(connected, theme)),
                Cell::from(date_time(cashier.last_activity.as_ref())),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());

    table::render(
        frame,
        table_area,
        TableView {
            title: "Cashiers".to_string(),
            header: &["Name", "Username", "Shop", "Status", "Display", "Last Activity"],
            widths: &[
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Percentage(18),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Min(16),
            ],
            selected,
            loading: view.list().is_loading(),
            empty: "No cashiers found",
        },
        rows,
        theme,
    );
}
