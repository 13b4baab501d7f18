//! Now Playing widget - compact player bar along the bottom

use super::{fmt_time, truncate_str};
use crate::app::state::{AppState, ToastKind};
use crate::lyrics::loader::LoadedFrom;
use crate::tui::theme::{get_theme, Icons};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Player ", icons.music))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1), // Left padding
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Right padding
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title - artist
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time + speed + volume + mode
            Constraint::Min(0),    // Toast or status
        ])
        .split(padded);

    let content_width = padded.width.saturating_sub(1) as usize;
    let session = &state.session;

    // Title - artist
    let title = if session.title.is_empty() { "Nothing loaded" } else { session.title.as_str() };
    let artist = session
        .document
        .as_ref()
        .map(|d| d.artists_label())
        .unwrap_or_default();
    let mut title_spans = vec![Span::styled(
        truncate_str(title, content_width),
        Style::default()
            .fg(theme.palette.fg_primary)
            .add_modifier(Modifier::BOLD),
    )];
    if !artist.is_empty() {
        title_spans.push(Span::styled(
            format!(" - {artist}"),
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    if session.loaded_from == Some(LoadedFrom::Placeholder) {
        title_spans.push(Span::styled(
            "  (no lyrics found)",
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(title_spans)), rows[0]);

    // Progress bar
    let position = session.coordinator.time();
    let duration = session.duration();
    let ratio = if duration > 0.0 {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let progress_bar = render_progress_bar(rows[1].width as usize, ratio, icons);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            progress_bar,
            Style::default().fg(theme.palette.accent),
        ))),
        rows[1],
    );

    // Time, speed, volume, mode
    let play_icon = if session.paused { icons.play } else { icons.pause };
    let vol_icon = if state.volume == 0 {
        icons.volume_mute
    } else if state.volume < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };
    let dim = Style::default().fg(theme.palette.fg_secondary);
    let mut controls = vec![
        Span::styled(format!("{}/{}", fmt_time(position), fmt_time(duration)), dim),
        Span::raw(" "),
        Span::styled(play_icon, Style::default().fg(theme.palette.playing)),
        Span::raw("  "),
        Span::styled(
            state.rate.label(),
            Style::default()
                .fg(theme.palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(vol_icon, dim),
        Span::raw(" "),
        Span::styled(format!("{}%", state.volume), dim),
        Span::raw("  "),
        Span::styled(icons.lyrics, dim),
        Span::raw(" "),
        Span::styled(state.view_mode.label(), dim),
    ];
    if state.show_translations {
        controls.push(Span::styled(" +tr", dim));
    }
    if session.coordinator.seek_pending() {
        controls.push(Span::raw("  "));
        controls.push(Span::styled(icons.loading, dim));
    }
    frame.render_widget(Paragraph::new(Line::from(controls)), rows[2]);

    // Toast wins over the status line.
    if let Some(toast) = &state.toast
        && !toast.is_expired()
    {
        let (prefix, color) = match toast.kind {
            ToastKind::Success => (icons.success, theme.palette.playing),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        let toast_line = Line::from(vec![
            Span::styled(format!("{prefix} "), Style::default().fg(color)),
            Span::styled(
                truncate_str(&toast.message, content_width.saturating_sub(3)),
                Style::default().fg(color),
            ),
        ]);
        frame.render_widget(Paragraph::new(toast_line), rows[3]);
    } else if !state.status.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(truncate_str(&state.status, content_width), dim))),
            rows[3],
        );
    }
}

fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_head_position() {
        let icons = Icons::nerd();
        assert_eq!(render_progress_bar(5, 0.0, &icons), "●────");
        assert_eq!(render_progress_bar(5, 1.0, &icons), "━━━━●");
        assert_eq!(render_progress_bar(2, 0.5, &icons), "");
    }
}
