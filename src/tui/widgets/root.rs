//! Root layout widget - orchestrates main layout structure

use crate::app::state::{AppState, Screen};
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use super::{help, library, lyrics, now_playing, sidebar, timeline};

/// Main layout structure:
/// ┌──────────┬─────────────────────────────────────────┐
/// │  Menu    │           Main Content                  │
/// │          │   (Library / Lyrics + timeline / Help)  │
/// │  Library │                                         │
/// │  Player  │                                         │
/// │  Help    │                                         │
/// ├──────────┴─────────────────────────────────────────┤
/// │ title · progress · speed · volume · mode           │
/// └────────────────────────────────────────────────────┘
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let root = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Top area (sidebar + content)
            Constraint::Length(6), // Now playing bar
        ])
        .split(root);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16), // Sidebar menu
            Constraint::Min(40),    // Main content area
        ])
        .split(rows[0]);

    sidebar::render(frame, state, top_cols[0]);
    render_main_content(frame, state, top_cols[1]);
    now_playing::render(frame, state, rows[1]);
}

fn render_main_content(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let title = match state.screen {
        Screen::Library => format!(" {} Library ", icons.library),
        Screen::Player => format!(" {} Lyrics · {} ", icons.lyrics, state.view_mode.label()),
        Screen::Help => format!(" {} Keybinds ", icons.help),
    };

    let main = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = main.inner(area);
    frame.render_widget(main, area);

    match state.screen {
        Screen::Library => library::render(frame, state, inner),
        Screen::Player => render_player(frame, state, inner),
        Screen::Help => help::render(frame, state, inner),
    }
}

/// Lyrics and word timings side by side, timeline underneath.
fn render_player(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(rows[0]);

    lyrics::render(frame, state, cols[0]);
    lyrics::render_timings(frame, state, cols[1]);
    timeline::render(frame, state, rows[1]);
}
