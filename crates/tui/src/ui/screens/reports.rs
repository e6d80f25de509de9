use admin_core::views::reports::{ReportColumn, ReportTab, SortDirection};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::Row,
};

use super::render_header;
use crate::{
    app::AppState,
    ui::{
        components::{
            table::{self, TableView},
            tabs,
        },
        theme::Theme,
    },
};

const TAB_LABELS: [&str; 2] = ["Retail Report", "Cashier Report"];

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.reports;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Filters
            Constraint::Min(0),    // Table
        ])
        .split(area);

    let active_tab = match view.tab() {
        ReportTab::Shop => 0,
        ReportTab::Cashier => 1,
    };
    tabs::render_tabs(frame, layout[0], &TAB_LABELS, active_tab, theme);

    let shop = view
        .shop_filter()
        .map(|id| {
            view.shops()
                .iter()
                .find(|shop| shop.id == id)
                .map_or_else(|| id.to_string(), |shop| shop.shop_name.clone())
        })
        .unwrap_or_else(|| "All shops".to_string());
    render_header(
        frame,
        layout[1],
        state,
        vec![
            Span::styled(" Range", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {}   ", view.range().label())),
            Span::styled("Shop", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {shop}")),
        ],
        theme,
    );

    let columns = ReportColumn::for_tab(view.tab());
    let labels = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let arrow = match view.sort() {
                Some((sorted, SortDirection::Asc)) if sorted == *column => " ▲",
                Some((sorted, SortDirection::Desc)) if sorted == *column => " ▼",
                _ => "",
            };
            let cursor = if i == state.report_column { "*" } else { "" };
            format!("{cursor}{}{arrow}", column.label())
        })
        .collect::<Vec<_>>();
    let header = labels.iter().map(String::as_str).collect::<Vec<_>>();
    let widths = columns
        .iter()
        .map(|column| match column {
            ReportColumn::Index => Constraint::Length(5),
            ReportColumn::Shop | ReportColumn::Cashier => Constraint::Min(14),
            _ => Constraint::Length(12),
        })
        .collect::<Vec<_>>();

    let rows = view
        .list()
        .items()
        .iter()
        .map(|row| Row::new(columns.iter().map(|column| column.render(row)).collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());
    let empty = match view.tab() {
        ReportTab::Cashier if view.shop_filter().is_none() => {
            "Select a shop (f) to see its cashiers"
        }
        _ => "No report data for this range",
    };

    table::render(
        frame,
        layout[2],
        TableView {
            title: TAB_LABELS[active_tab].to_string(),
            header: &header,
            widths: &widths,
            selected,
            loading: view.list().is_loading(),
            empty,
        },
        rows,
        theme,
    );
}
