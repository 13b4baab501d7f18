//! Screen switcher. The Player entry carries a dot once a song's lyrics are in.

use crate::app::state::{AppState, Screen};
use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let cursor = state.sidebar_selected.min(Screen::ALL.len() - 1);
    let loaded = state.session.loaded_from.is_some();

    let items: Vec<ListItem> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, screen)| entry(*screen, i == cursor, loaded && *screen == Screen::Player, &theme))
        .collect();

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Karaoke ")
        .title_style(Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD));

    let mut list_state = ListState::default().with_selected(Some(cursor));
    let list = List::new(items).block(frame_block).highlight_style(
        Style::default()
            .fg(theme.palette.bg_primary)
            .bg(theme.palette.accent),
    );
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn entry(screen: Screen, under_cursor: bool, live: bool, theme: &Theme) -> ListItem<'static> {
    let icons = &theme.icons;
    let (glyph, name) = match screen {
        Screen::Library => (icons.library, "Library"),
        Screen::Player => (icons.music, "Player"),
        Screen::Help => (icons.help, "Help"),
    };
    let marker = if under_cursor { icons.selected } else { icons.unselected };
    let text_style = if under_cursor {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.palette.fg_primary)
    };

    let mut spans = vec![
        Span::styled(format!("{marker} {glyph} "), Style::default().fg(theme.palette.fg_secondary)),
        Span::styled(name, text_style),
    ];
    if live {
        spans.push(Span::styled(" •", Style::default().fg(theme.palette.playing)));
    }
    ListItem::new(Line::from(spans))
}
