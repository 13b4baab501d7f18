//! Segment timeline under the lyrics. Clicking it seeks by fraction.

use super::fmt_time;
use crate::app::state::AppState;
use crate::render::timeline::timeline_blocks;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let theme = get_theme();
    let icons = &theme.icons;
    let session = &state.session;
    let duration = session.duration();
    let time = session.coordinator.time();
    let activation = session.activation();

    let segments = session.document.as_ref().map(|d| d.segments.as_slice()).unwrap_or(&[]);
    let blocks = timeline_blocks(segments, duration, area.width, activation.segment);

    // 0 = gap, 1 = segment, 2 = active segment
    let mut cols = vec![0u8; area.width as usize];
    for block in &blocks {
        let kind = if block.active { 2 } else { 1 };
        for c in &mut cols[block.start_col as usize..block.end_col as usize] {
            *c = (*c).max(kind);
        }
    }
    let head = (duration > 0.0).then(|| {
        let f = (time / duration).clamp(0.0, 1.0);
        ((f * f64::from(area.width)) as usize).min(cols.len() - 1)
    });

    let spans: Vec<Span> = cols
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            if head == Some(i) {
                return Span::styled(icons.progress_head, Style::default().fg(theme.palette.accent));
            }
            match kind {
                2 => Span::styled("█", Style::default().fg(theme.palette.accent)),
                1 => Span::styled("▆", Style::default().fg(theme.palette.fg_secondary)),
                _ => Span::styled(icons.progress_empty, Style::default().fg(theme.palette.border)),
            }
        })
        .collect();

    let bar = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(Paragraph::new(Line::from(spans)), bar);
    state.hits.timeline = Some(bar);

    if area.height > 1 {
        let label = match activation.segment {
            Some(i) => format!("{} / {}  line {}/{}", fmt_time(time), fmt_time(duration), i + 1, segments.len()),
            None => format!("{} / {}", fmt_time(time), fmt_time(duration)),
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                label,
                Style::default()
                    .fg(theme.palette.fg_secondary)
                    .add_modifier(Modifier::DIM),
            ))),
            Rect::new(area.x, area.y + 1, area.width, 1),
        );
    }
}
