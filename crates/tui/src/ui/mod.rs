pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use admin_core::ConnectionState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Detail, Mode, Screen, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

const SIDEBAR_WIDTH: u16 = 22;
const SIDEBAR_COLLAPSED_WIDTH: u16 = 5;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Console => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);

    let sidebar_width = if state.session.sidebar_collapsed() {
        SIDEBAR_COLLAPSED_WIDTH
    } else {
        SIDEBAR_WIDTH
    };
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(layout[1]);

    components::sidebar::render(frame, body[0], state, &theme);

    let content = body[1];
    match state.section {
        Section::Dashboard => screens::dashboard::render(frame, content, state, &theme),
        Section::ShopOwners => screens::shop_owners::render(frame, content, state, &theme),
        Section::Shops => screens::shops::render(frame, content, state, &theme),
        Section::Cashiers => screens::cashiers::render(frame, content, state, &theme),
        Section::GameResults => screens::game_results::render(frame, content, state, &theme),
        Section::Slips => screens::slips::render(frame, content, state, &theme),
        Section::Reports => screens::reports::render(frame, content, state, &theme),
        Section::Users => screens::users::render(frame, content, state, &theme),
    }

    render_bottom_bar(frame, layout[2], state, &theme);
    render_overlay(frame, area, state, &theme);
    components::toast::render(frame, area, state.active_toast(), &theme);
}

fn render_overlay(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    match state.mode {
        Mode::Form => {
            if let Some(form) = &state.form {
                components::modal::render_form(frame, area, form, theme);
            }
        }
        Mode::Confirm => {
            if let Some(confirm) = &state.confirm {
                components::confirm::render(frame, area, &confirm.message, theme);
            }
        }
        Mode::Detail => match &state.detail {
            Some(Detail::Text { title, body }) => {
                components::modal::render_text(frame, area, title, body, theme);
            }
            Some(Detail::Slip) => {
                if let Some(slip) = state.slips.selected() {
                    screens::slips::render_detail(frame, area, slip, theme);
                }
            }
            None => {}
        },
        Mode::Normal | Mode::Search => {}
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map(|user| format!("{} ({})", user.full_name, user.role.as_str()))
        .unwrap_or_else(|| "-".to_string());
    let (live, live_style) = match state.live {
        ConnectionState::Connected => ("Live", Style::default().fg(theme.positive)),
        ConnectionState::Connecting => ("Connecting", Style::default().fg(theme.warning)),
        ConnectionState::Disconnected => ("Offline", Style::default().fg(theme.error)),
    };

    let line = Line::from(vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled(live, live_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints = components::hints::for_state(state);
    let mut parts = components::hints::hints_to_spans(&hints, theme);
    parts.push(components::hints::hint_separator(theme));
    parts.extend(components::hints::hints_to_spans(
        &components::hints::common::global_shortcuts(),
        theme,
    ));
    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
