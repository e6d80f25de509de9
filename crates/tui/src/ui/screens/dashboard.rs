use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Row},
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            table::{self, TableView},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dashboard = &state.dashboard;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status line
            Constraint::Length(4), // Counters
            Constraint::Min(0),    // Recent records
        ])
        .split(area);

    let refreshed = dashboard
        .last_refresh()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut status = vec![
        Span::styled(" Live", Style::default().fg(theme.text_muted)),
        Span::raw(": "),
        if dashboard.is_connected() {
            Span::styled("connected", Style::default().fg(theme.positive))
        } else {
            Span::styled("disconnected", Style::default().fg(theme.error))
        },
        Span::styled("   Active games", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", dashboard.active_games().len())),
        Span::styled("   Refreshed", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {refreshed}")),
    ];
    if let Some(error) = dashboard.error() {
        status.push(Span::raw("   "));
        status.push(Span::styled(error.to_string(), Style::default().fg(theme.error)));
    }
    frame.render_widget(Paragraph::new(Line::from(status)), layout[0]);

    let Some(snapshot) = dashboard.snapshot() else {
        frame.render_widget(
            Paragraph::new(Line::from("Waiting for dashboard data..."))
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.text_muted))
                .block(Card::new("Dashboard", theme).block()),
            layout[1].union(layout[2]),
        );
        return;
    };

    let counters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(layout[1]);
    let stats = &snapshot.stats;
    StatCard::new(
        "Shop Owners",
        stats.total_shop_owners.value,
        stats.active_shop_owners.value,
        theme,
    )
    .render(frame, counters[0]);
    StatCard::new("Shops", stats.total_shops.value, stats.active_shops.value, theme)
        .render(frame, counters[1]);
    StatCard::new(
        "Cashiers",
        stats.total_cashiers.value,
        stats.active_cashiers.value,
        theme,
    )
    .render(frame, counters[2]);

    let recent = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(layout[2]);

    let owners = snapshot
        .recent_shop_owners
        .iter()
        .map(|owner| {
            Row::new(vec![owner.display_name(), owner.username.clone()])
                .style(table::status_style(owner.is_active, theme))
        })
        .collect();
    table::render(
        frame,
        recent[0],
        TableView {
            title: "Recent Shop Owners".to_string(),
            header: &["Name", "Username"],
            widths: &[Constraint::Percentage(55), Constraint::Percentage(45)],
            selected: None,
            loading: false,
            empty: "No shop owners yet",
        },
        owners,
        theme,
    );

    let shops = snapshot
        .recent_shops
        .iter()
        .map(|shop| Row::new(vec![shop.shop_name.clone(), shop.location.clone()]))
        .collect();
    table::render(
        frame,
        recent[1],
        TableView {
            title: "Recent Shops".to_string(),
            header: &["Shop", "Location"],
            widths: &[Constraint::Percentage(55), Constraint::Percentage(45)],
            selected: None,
            loading: false,
            empty: "No shops yet",
        },
        shops,
        theme,
    );

    let cashiers = snapshot
        .recent_cashiers
        .iter()
        .map(|cashier| {
            let online = if cashier.is_connected.unwrap_or(false) {
                "online"
            } else {
                "offline"
            };
            Row::new(vec![
                cashier.username.clone(),
                cashier.shop.shop_name.clone(),
                online.to_string(),
            ])
        })
        .collect();
    table::render(
        frame,
        recent[2],
        TableView {
            title: "Recent Cashiers".to_string(),
            header: &["Cashier", "Shop", "Display"],
            widths: &[
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ],
            selected: None,
            loading: false,
            empty: "No cashiers yet",
        },
        cashiers,
        theme,
    );
}
