use admin_core::{export::format_number, views::slips::cartela_grid};
use api_types::slip::SlipDetail;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row},
};

use super::{render_header, split_header};
use crate::{
    app::AppState,
    ui::{
        components::{
            centered_rect,
            table::{self, TableView},
        },
        theme::Theme,
    },
};

const CARTELA_LETTERS: [&str; 5] = ["B", "I", "N", "G", "O"];

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.slips;
    let query = &view.query;
    let shop = query
        .shop_id
        .as_deref()
        .and_then(|id| view.catalog().shop_name(id))
        .unwrap_or("-");
    let day = query
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "any".to_string());

    let (header_area, table_area) = split_header(area);
    render_header(
        frame,
        header_area,
        state,
        vec![
            Span::styled(" Shop", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {shop}   ")),
            Span::styled("Date", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {day}   ")),
            Span::styled("Ticket", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {}", or_dash(query.ticket_number()))),
            Span::styled("   Game", Style::default().fg(theme.text_muted)),
            Span::raw(format!(": {}", or_dash(query.game_id()))),
        ],
        theme,
    );

    let rows = view
        .list()
        .items()
        .iter()
        .map(|slip| {
            Row::new(vec![
                slip.ticket_number.clone(),
                slip.game_id.to_string(),
                slip.cashier_name.clone(),
                format_number(slip.stake),
                slip.bet_status.as_str().to_string(),
                format_number(slip.win),
                slip.placed_at.format("%Y-%m-%d %H:%M").to_string(),
            ])
        })
        .collect::<Vec<_>>();
    let selected = (!rows.is_empty()).then(|| state.selected_index());
    let empty = if view.has_searched() {
        "No slips found"
    } else {
        "Press f to search slips"
    };

    table::render(
        frame,
        table_area,
        TableView {
            title: "Slip Details".to_string(),
            header: &["Ticket", "Game", "Cashier", "Stake", "Status", "Win", "Placed"],
            widths: &[
                Constraint::Length(14),
                Constraint::Length(8),
                Constraint::Percentage(18),
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Min(16),
            ],
            selected,
            loading: view.list().is_loading(),
            empty,
        },
        rows,
        theme,
    );
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Slip summary beside its cartela, called numbers highlighted.
pub fn render_detail(frame: &mut Frame<'_>, area: Rect, slip: &SlipDetail, theme: &Theme) {
    let popup = centered_rect(80, 70, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            format!(" Ticket {} ", slip.ticket_number),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.panel));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let label = |name: &str| Span::styled(format!("{name:<14}"), Style::default().fg(theme.text_muted));
    let info = vec![
        Line::from(vec![label("Game"), Span::raw(slip.game_id.to_string())]),
        Line::from(vec![label("Shop"), Span::raw(slip.shop_name.clone())]),
        Line::from(vec![label("Cashier"), Span::raw(slip.cashier_name.clone())]),
        Line::from(vec![label("Cartela"), Span::raw(slip.cartela_id.to_string())]),
        Line::from(vec![label("Stake"), Span::raw(format_number(slip.stake))]),
        Line::from(vec![label("Bet Status"), Span::raw(slip.bet_status.as_str())]),
        Line::from(vec![label("Game Status"), Span::raw(slip.game_status.clone())]),
        Line::from(vec![
            label("Progress"),
            Span::raw(format!("{}%", slip.game_progress)),
        ]),
        Line::from(vec![
            label("Win Pattern"),
            Span::raw(slip.win_pattern.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![label("Win"), Span::raw(format_number(slip.win))]),
        Line::from(vec![
            label("Verified"),
            Span::raw(if slip.is_verified { "yes" } else { "no" }),
        ]),
        Line::from(vec![
            label("Placed"),
            Span::raw(slip.placed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]),
        Line::from(vec![
            label("Called"),
            Span::raw(slip.called_numbers.len().to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Esc close", Style::default().fg(theme.text_muted))),
    ];
    frame.render_widget(Paragraph::new(info), columns[0]);

    let mut grid = vec![Line::from(
        CARTELA_LETTERS
            .iter()
            .map(|letter| {
                Span::styled(
                    format!("{letter:^5}"),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect::<Vec<_>>(),
    )];
    for row in cartela_grid(slip) {
        let cells = row
            .iter()
            .map(|cell| {
                let text = if cell.number == 0 {
                    "FREE".to_string()
                } else {
                    cell.number.to_string()
                };
                let style = if cell.called {
                    Style::default()
                        .fg(theme.positive)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(theme.text)
                };
                Span::styled(format!("{text:^5}"), style)
            })
            .collect::<Vec<_>>();
        grid.push(Line::from(cells));
    }
    frame.render_widget(Paragraph::new(grid), columns[1]);
}
