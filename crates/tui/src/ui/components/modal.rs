use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::forms::{FieldKind, FormState},
    ui::{
        components::{centered_box, centered_rect},
        theme::Theme,
    },
};

const LABEL_WIDTH: usize = 20;

fn modal_block(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.panel))
}

/// One line per field plus its error, if any.
pub fn render_form(frame: &mut Frame<'_>, area: Rect, form: &FormState, theme: &Theme) {
    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted)
        };
        let mut value = field.display();
        if field.kind == FieldKind::Choice {
            value = format!("‹ {value} ›");
        } else if focused {
            value.push('│');
        }

        lines.push(Line::from(vec![
            Span::styled(format!("{:<LABEL_WIDTH$}", field.label), label_style),
            Span::styled(value, Style::default().fg(theme.text)),
        ]));
        if let Some(error) = form.errors.get(field.key) {
            lines.push(Line::from(Span::styled(
                format!("{:<LABEL_WIDTH$}{error}", ""),
                Style::default().fg(theme.error),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab/↑↓ move  ←→ choose  Enter save  Esc cancel",
        Style::default().fg(theme.text_muted),
    )));

    let height = lines.len() as u16 + 2;
    let popup = centered_box(64, height, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(modal_block(&form.title, theme)),
        popup,
    );
}

/// Read-only text such as a cashier's launcher script.
pub fn render_text(frame: &mut Frame<'_>, area: Rect, title: &str, body: &str, theme: &Theme) {
    let popup = centered_rect(80, 70, area);
    frame.render_widget(Clear, popup);

    let mut lines = body
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text))))
        .collect::<Vec<_>>();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc close",
        Style::default().fg(theme.text_muted),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(modal_block(title, theme)),
        popup,
    );
}
