use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Paragraph, Row, Table, TableState},
};

use crate::ui::{components::card::Card, theme::Theme};

/// Everything a section table needs besides its rows.
pub struct TableView<'a> {
    pub title: String,
    pub header: &'a [&'a str],
    pub widths: &'a [Constraint],
    pub selected: Option<usize>,
    pub loading: bool,
    pub empty: &'a str,
}

pub fn render(frame: &mut Frame<'_>, area: Rect, view: TableView<'_>, rows: Vec<Row<'static>>, theme: &Theme) {
    let block = Card::new(view.title, theme).block();

    if rows.is_empty() {
        let message = if view.loading { "Loading..." } else { view.empty };
        frame.render_widget(
            Paragraph::new(Line::from(message))
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.text_muted))
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(view.header.iter().map(|label| label.to_string()))
        .style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);
    let table = Table::new(rows, view.widths.to_vec())
        .header(header)
        .style(Style::default().fg(theme.text))
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
        .highlight_symbol("» ")
        .column_spacing(1)
        .block(block);

    let mut state = TableState::default();
    state.select(view.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

/// Green/red status cell text.
pub fn status_style(active: bool, theme: &Theme) -> Style {
    if active {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    }
}
