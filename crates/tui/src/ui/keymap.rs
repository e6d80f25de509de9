use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Input(char),
    None,
}

/// Plain letters stay `Input` so they can be typed into fields; each mode
/// decides which of them are shortcuts.
pub fn map_key(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::BackTab => AppAction::PrevField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> AppAction {
        map_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_c_quits_but_q_is_text() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), AppAction::Quit);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::NONE), AppAction::Input('q'));
        assert_eq!(press(KeyCode::Char('X'), KeyModifiers::SHIFT), AppAction::Input('X'));
    }

    #[test]
    fn back_tab_moves_to_previous_field() {
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), AppAction::PrevField);
    }
}
