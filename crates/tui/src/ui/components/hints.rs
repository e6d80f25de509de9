use ratatui::{style::Style, text::Span};

use crate::{
    app::{AppState, Mode, Section},
    ui::theme::Theme,
};

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

pub mod common {
    use super::KeyHint;

    pub fn list_navigation() -> Vec<KeyHint> {
        vec![KeyHint::new("↑↓", "select"), KeyHint::new("/", "search")]
    }

    pub fn crud_operations() -> Vec<KeyHint> {
        vec![
            KeyHint::new("n", "new"),
            KeyHint::new("e", "edit"),
            KeyHint::new("d", "delete"),
            KeyHint::new("s", "status"),
        ]
    }

    pub fn global_shortcuts() -> Vec<KeyHint> {
        vec![
            KeyHint::new("1-8", "section"),
            KeyHint::new("m", "menu"),
            KeyHint::new("L", "logout"),
            KeyHint::new("q", "quit"),
        ]
    }
}

/// Hints for the active section and mode.
pub fn for_state(state: &AppState) -> Vec<KeyHint> {
    match state.mode {
        Mode::Search => {
            return vec![
                KeyHint::new("type", "filter"),
                KeyHint::new("Enter", "keep"),
                KeyHint::new("Esc", "clear"),
            ];
        }
        Mode::Form => {
            return vec![
                KeyHint::new("Tab", "next"),
                KeyHint::new("Enter", "save"),
                KeyHint::new("Esc", "cancel"),
            ];
        }
        Mode::Confirm => {
            return vec![KeyHint::new("y", "confirm"), KeyHint::new("n", "cancel")];
        }
        Mode::Detail => return vec![KeyHint::new("Esc", "close")],
        Mode::Normal => {}
    }

    let mut hints = Vec::new();
    match state.section {
        Section::Dashboard => hints.push(KeyHint::new("r", "refresh")),
        Section::ShopOwners | Section::Shops => {
            hints.extend(common::list_navigation());
            hints.extend(common::crud_operations());
        }
        Section::Cashiers => {
            hints.extend(common::list_navigation());
            hints.extend(common::crud_operations());
            hints.push(KeyHint::new("f", "shop"));
            hints.push(KeyHint::new("b", "bat"));
            hints.push(KeyHint::new("g", "regen"));
        }
        Section::GameResults => {
            hints.push(KeyHint::new("f", "search"));
            hints.push(KeyHint::new("a", "auto-refresh"));
            hints.push(KeyHint::new("r", "reload"));
        }
        Section::Slips => {
            hints.push(KeyHint::new("f", "search"));
            hints.push(KeyHint::new("Enter", "detail"));
        }
        Section::Reports => {
            hints.push(KeyHint::new("t", "tab"));
            hints.push(KeyHint::new("f", "filters"));
            hints.push(KeyHint::new("←→", "column"));
            hints.push(KeyHint::new("o", "sort"));
            hints.push(KeyHint::new("x/X", "xlsx/csv"));
        }
        Section::Users => {
            hints.extend(common::list_navigation());
            hints.push(KeyHint::new("n", "new"));
            hints.push(KeyHint::new("s", "status"));
            hints.push(KeyHint::new("p", "password"));
            hints.push(KeyHint::new("d", "delete"));
        }
    }
    hints
}
