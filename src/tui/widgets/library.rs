//! Song library list with virtual scrolling and the inline prompt.

use super::truncate_str;
use crate::app::state::AppState;
use crate::library::song::{LyricsStatus, Song, SongStatus};
use crate::tui::theme::{get_theme, LoadingSpinner, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Songs
            Constraint::Length(1), // Selected song detail
            Constraint::Length(if state.prompt.is_some() { 3 } else { 0 }),
        ])
        .split(area);

    render_list(frame, state, &theme, layout[0]);
    render_detail(frame, state, &theme, layout[1]);
    if state.prompt.is_some() {
        render_prompt(frame, state, &theme, layout[2]);
    }
}

fn render_list(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let list = &mut state.library;

    if list.loading && list.songs.is_empty() {
        let spinner = LoadingSpinner::frame(state.tick);
        let loading = Paragraph::new(Line::from(format!("{spinner} Loading library...")))
            .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(loading, area);
        return;
    }

    if list.songs.is_empty() {
        let empty = Paragraph::new(Line::from("No songs yet. Press a to add one by URL."))
            .style(Style::default().fg(theme.palette.fg_secondary));
        frame.render_widget(empty, area);
        return;
    }

    let visible_height = area.height as usize;
    list.update_scroll(visible_height);
    let scroll_offset = list.scroll_offset;
    let width = area.width as usize;

    let items: Vec<ListItem> = list
        .songs
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(i, song)| song_item(song, i == list.selected, state.tick, width, theme))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(list.selected.saturating_sub(scroll_offset)));

    let widget = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.palette.bg_primary)
                .bg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{f054} ");
    frame.render_stateful_widget(widget, area, &mut list_state);

    // Scroll position indicator
    if list.songs.len() > visible_height {
        let pos_text = format!("{}/{}", list.selected + 1, list.songs.len());
        let pos_len = pos_text.len() as u16;
        let pos_x = area.x + area.width.saturating_sub(pos_len);
        if pos_x > area.x {
            frame.render_widget(
                Paragraph::new(pos_text).style(Style::default().fg(theme.palette.fg_secondary)),
                Rect::new(pos_x, area.y, pos_len, 1),
            );
        }
    }
}

fn song_item(song: &Song, selected: bool, tick: u64, width: usize, theme: &Theme) -> ListItem<'static> {
    let icons = &theme.icons;
    let title_style = if selected {
        Style::default()
            .fg(theme.palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.palette.fg_primary)
    };
    let dim = Style::default().fg(theme.palette.fg_secondary);

    let status_icon = match song.status {
        s if s.is_busy() => LoadingSpinner::frame(tick),
        SongStatus::Ready => icons.success,
        SongStatus::Error => icons.error,
        SongStatus::Downloaded => icons.download,
        _ => icons.unselected,
    };
    let lyrics_mark = match song.lyrics_status {
        LyricsStatus::Verified => icons.success,
        LyricsStatus::UserEdited => icons.edit,
        _ => " ",
    };

    let name = truncate_str(&song.display_name(), width.saturating_sub(36));
    ListItem::new(Line::from(vec![
        Span::styled(format!("{status_icon} "), dim),
        Span::styled(format!("{:<16}", song.status.label()), dim),
        Span::styled(format!("{lyrics_mark} {:<9} ", song.lyrics_status.label()), dim),
        Span::styled(name, title_style),
    ]))
}

fn render_detail(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let Some(song) = state.library.selected_song() else {
        return;
    };
    let width = area.width as usize;
    let line = match &song.error {
        Some(err) if song.status == SongStatus::Error => Line::from(Span::styled(
            truncate_str(&format!("{} {err}", theme.icons.error), width),
            Style::default().fg(theme.palette.error),
        )),
        _ => {
            let duration = song.duration.map(super::fmt_time).unwrap_or_else(|| "--:--".into());
            Line::from(Span::styled(
                truncate_str(
                    &format!(
                        "{}  {}  lang {}  {} source(s)  {}",
                        song.id,
                        duration,
                        song.language,
                        song.lyrics_sources.len(),
                        song.source_url
                    ),
                    width,
                ),
                Style::default().fg(theme.palette.fg_secondary),
            ))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_prompt(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let Some(prompt) = &state.prompt else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .title(format!(" {} ", prompt.kind.label()))
        .title_style(Style::default().fg(theme.palette.accent));

    let p = Paragraph::new(Line::from(format!("{}▏", prompt.buffer)))
        .style(Style::default().fg(theme.palette.fg_primary))
        .block(block);
    frame.render_widget(p, area);
}
