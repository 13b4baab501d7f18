//! Help screen showing keybindings

use crate::app::state::AppState;
use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, _state: &AppState, area: Rect) {
    let theme = get_theme();

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Left column - Player
    let left_content = vec![
        section_header("Playback", &theme),
        keybind("Space", "Play / pause", &theme),
        keybind("[ / ]", "Seek -5s / +5s", &theme),
        keybind(", / .", "Previous / next line", &theme),
        keybind("< / >", "Slower / faster (0.5x-1.0x)", &theme),
        keybind("- / +", "Volume down / up", &theme),
        keybind("Home", "Back to start", &theme),
        Line::default(),
        section_header("Lyrics", &theme),
        keybind("m", "Cycle karaoke / syllables / simple", &theme),
        keybind("t", "Show / hide translations", &theme),
        keybind("Click word", "Seek to that word", &theme),
        keybind("Click bar", "Seek along the timeline", &theme),
        keybind("Drag bar", "Scrub the timeline", &theme),
    ];
    frame.render_widget(Paragraph::new(left_content).wrap(Wrap { trim: false }), cols[0]);

    // Right column - Library & General
    let right_content = vec![
        section_header("Library", &theme),
        keybind("j / k", "Move down / up", &theme),
        keybind("g / G", "Top / bottom", &theme),
        keybind("Enter", "Open in player", &theme),
        keybind("a", "Add song by URL", &theme),
        keybind("e", "Edit title, artist, language", &theme),
        keybind("d", "Download audio", &theme),
        keybind("s", "Search lyrics", &theme),
        keybind("v", "Verify lyrics", &theme),
        keybind("p", "Process (align + translate)", &theme),
        keybind("x", "Remove song", &theme),
        keybind("Ctrl+r", "Reload library", &theme),
        Line::default(),
        section_header("General", &theme),
        keybind("Tab / 1-2", "Switch screen", &theme),
        keybind("?", "This help", &theme),
        keybind("q / Esc", "Quit", &theme),
    ];
    frame.render_widget(Paragraph::new(right_content).wrap(Wrap { trim: false }), cols[1]);
}

fn section_header(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("━━ {title} ━━"),
        Style::default()
            .fg(theme.palette.accent)
            .add_modifier(Modifier::BOLD),
    )])
}

fn keybind(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{key:12}"),
            Style::default()
                .fg(theme.palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.palette.fg_primary)),
    ])
}
