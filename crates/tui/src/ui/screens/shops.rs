use api_types::shop::ShopStatus;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row},
};

use super::{date, render_header, split_header};
use crate::{
    app::AppState,
    ui::{
        components::table::{self, TableView},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let list = state.shops.list();
    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![Span::raw(format!("{} shops", list.filtered_len()))],
        theme,
    );

    let rows = list
        .filtered()
        .map(|shop| {
            let active = shop.status == ShopStatus::Active;
            Row::new(vec![
                Cell::from(shop.shop_name.clone()),
                Cell::from(shop.location.clone()),
                Cell::from(shop.owner_label().to_string()),
                Cell::from(format!("{}%", shop.margin)),
                Cell::from(shop.status.as_str()).style(table::status_style(active, theme)),
                Cell::from(date(&shop.created_at)),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());

    table::render(
        frame,
        table_area,
        TableView {
            title: "Shops".to_string(),
            header: &["Shop", "Location", "Owner", "Margin", "Status", "Created"],
            widths: &[
                Constraint::Percentage(22),
                Constraint::Percentage(20),
                Constraint::Percentage(22),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Min(12),
            ],
            selected,
            loading: list.is_loading(),
            empty: "No shops found",
        },
        rows,
        theme,
    );
}
