//! Lyrics panel and word timing panel for the player screen.
//!
//! The lyrics panel shows the previous, current and next segment. Each word
//! is painted into its own rect so clicks can be mapped back to a seek time.

use super::truncate_str;
use crate::app::state::AppState;
use crate::lyrics::model::Segment;
use crate::lyrics::resolve::{active_segments, Timed};
use crate::render::{render_segment, WordCell};
use crate::tui::theme::{get_theme, LoadingSpinner, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::ops::Range;

const WORD_GAP: u16 = 1;

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let session = &state.session;

    let Some(doc) = session.document.as_ref() else {
        render_message(frame, &theme, "Pick a song in the library and press Enter", area);
        return;
    };
    // The placeholder keeps its place until this session's document lands.
    if session.loaded_from.is_none() && area.height > 0 {
        let note = format!("{} loading {}", LoadingSpinner::frame(state.tick), session.source_label);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                truncate_str(&note, area.width as usize),
                Style::default()
                    .fg(theme.palette.fg_secondary)
                    .add_modifier(Modifier::DIM),
            ))),
            Rect::new(area.x, area.y, area.width, 1),
        );
    }
    if doc.segments.is_empty() || area.width == 0 {
        render_message(frame, &theme, "No lyrics in this document", area);
        return;
    }

    let time = session.coordinator.time();
    let activation = session.activation();
    let anchor = activation
        .segment
        .unwrap_or_else(|| upcoming_segment(&doc.segments, time));

    // (cells, is the centre line)
    let blocks: Vec<(Vec<WordCell>, bool)> = [anchor.checked_sub(1), Some(anchor), anchor.checked_add(1)]
        .into_iter()
        .flatten()
        .filter_map(|i| doc.segments.get(i).map(|seg| (i, seg)))
        .map(|(i, seg)| {
            let cells = if activation.segment == Some(i) {
                render_segment(
                    state.view_mode,
                    seg,
                    activation.word,
                    activation.syllable,
                    activation.word_progress,
                    state.show_translations,
                )
            } else {
                render_segment(state.view_mode, seg, None, None, 0.0, state.show_translations)
            };
            (cells, i == anchor)
        })
        .collect();

    let laid_out: Vec<(Vec<u16>, Vec<Range<usize>>)> = blocks
        .iter()
        .map(|(cells, _)| {
            let widths: Vec<u16> = cells.iter().map(|c| cell_width(c).min(area.width)).collect();
            let rows = wrap_cells(&widths, area.width);
            (widths, rows)
        })
        .collect();

    let total_rows: usize =
        laid_out.iter().map(|(_, rows)| rows.len()).sum::<usize>() + laid_out.len().saturating_sub(1);
    let mut y = area.y + (area.height as usize).saturating_sub(total_rows) as u16 / 2;
    let bottom = area.y + area.height;

    for ((cells, centre), (widths, rows)) in blocks.iter().zip(&laid_out) {
        for row in rows {
            if y >= bottom {
                return;
            }
            let row_width = row_width(&widths[row.clone()]);
            let mut x = area.x + area.width.saturating_sub(row_width) / 2;
            for i in row.clone() {
                let rect = Rect::new(x, y, widths[i], 1);
                frame.render_widget(Paragraph::new(Line::from(cell_spans(&cells[i], *centre, &theme))), rect);
                state.hits.words.push((rect, cells[i].seek_to));
                x = x.saturating_add(widths[i] + WORD_GAP);
            }
            y += 1;
        }
        y += 1;
    }
}

/// Segments containing the playhead with their word timings.
pub fn render_timings(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Timing ")
        .title_style(Style::default().fg(theme.palette.fg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(doc) = state.session.document.as_ref() else {
        return;
    };
    let time = state.session.coordinator.time();
    let width = inner.width as usize;
    let dim = Style::default().fg(theme.palette.fg_secondary);

    let mut lines = Vec::new();
    for seg in active_segments(time, &doc.segments) {
        lines.push(Line::from(vec![
            Span::styled(format!("{:.2}-{:.2} ", seg.start, seg.end), dim),
            Span::styled(
                truncate_str(&seg.text, width.saturating_sub(12)),
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        for word in &seg.words {
            let style = if word.contains(time) {
                Style::default()
                    .fg(theme.palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(theme.palette.fg_primary)
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(truncate_str(&word.text, width.saturating_sub(16)), style),
                Span::styled(format!(" {:.2}-{:.2}", word.start, word.end), dim),
            ]));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Between lines", dim)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_message(frame: &mut Frame, theme: &Theme, msg: &str, area: Rect) {
    let top = area.height / 2;
    let rect = Rect::new(area.x, area.y + top, area.width, area.height.saturating_sub(top).min(1));
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(theme.palette.fg_secondary),
        )))
        .alignment(Alignment::Center),
        rect,
    );
}

fn cell_spans(cell: &WordCell, centre: bool, theme: &Theme) -> Vec<Span<'static>> {
    let plain = if centre {
        Style::default().fg(theme.palette.fg_primary)
    } else {
        Style::default().fg(theme.palette.fg_secondary)
    };
    let lit = Style::default()
        .fg(theme.palette.accent)
        .add_modifier(Modifier::BOLD);

    let mut spans = match cell.pieces.as_slice() {
        // Karaoke wipe: sung part lit, the rest dimmed.
        [only] if cell.active && only.active => {
            let chars: Vec<char> = only.text.chars().collect();
            let sung = ((cell.progress.clamp(0.0, 1.0) * chars.len() as f64).round() as usize).min(chars.len());
            vec![
                Span::styled(chars[..sung].iter().collect::<String>(), lit.add_modifier(Modifier::UNDERLINED)),
                Span::styled(
                    chars[sung..].iter().collect::<String>(),
                    Style::default()
                        .fg(theme.palette.fg_secondary)
                        .add_modifier(Modifier::BOLD),
                ),
            ]
        }
        pieces if cell.active => pieces
            .iter()
            .map(|p| {
                let style = if p.active { lit.add_modifier(Modifier::REVERSED) } else { lit };
                Span::styled(p.text.clone(), style)
            })
            .collect(),
        pieces => pieces.iter().map(|p| Span::styled(p.text.clone(), plain)).collect(),
    };

    if let Some(t) = &cell.translation {
        spans.push(Span::styled(
            format!(" ({t})"),
            Style::default()
                .fg(theme.palette.fg_secondary)
                .add_modifier(Modifier::ITALIC),
        ));
    }
    spans
}

fn cell_width(cell: &WordCell) -> u16 {
    Span::raw(cell.display_text()).width().min(u16::MAX as usize) as u16
}

fn row_width(widths: &[u16]) -> u16 {
    let gaps = widths.len().saturating_sub(1) as u16 * WORD_GAP;
    widths.iter().fold(gaps, |acc, w| acc.saturating_add(*w))
}

/// Greedy line breaking. A cell wider than `max` gets a row of its own.
fn wrap_cells(widths: &[u16], max: u16) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used: u16 = 0;
    for (i, w) in widths.iter().enumerate() {
        let needed = if i == start { *w } else { used.saturating_add(WORD_GAP).saturating_add(*w) };
        if i > start && needed > max {
            rows.push(start..i);
            start = i;
            used = *w;
        } else {
            used = needed;
        }
    }
    if start < widths.len() {
        rows.push(start..widths.len());
    }
    rows
}

/// Segment to centre on between lines: the next one to start, or the last.
fn upcoming_segment(segments: &[Segment], time: f64) -> usize {
    segments
        .iter()
        .position(|s| s.start > time)
        .unwrap_or(segments.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::Hit;
    use crate::lyrics::model::{LyricsDocument, Word};
    use ratatui::{backend::TestBackend, Terminal};

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.into(),
            start,
            end,
            confidence: 1.0,
            syllables: Vec::new(),
            translation: None,
        }
    }

    fn seg(id: &str, start: f64, words: Vec<Word>) -> Segment {
        let end = words.last().map(|w| w.end).unwrap_or(start);
        Segment {
            id: id.into(),
            text: words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" "),
            start,
            end,
            words,
        }
    }

    #[test]
    fn test_wrap_cells() {
        assert_eq!(wrap_cells(&[3, 3, 3], 7), vec![0..2, 2..3]);
        assert_eq!(wrap_cells(&[3, 3, 3], 11), vec![0..3]);
        assert_eq!(wrap_cells(&[12, 2], 10), vec![0..1, 1..2]);
        assert!(wrap_cells(&[], 10).is_empty());
    }

    #[test]
    fn test_upcoming_segment_between_lines() {
        let segs = vec![seg("a", 0.0, vec![word("a", 0.0, 1.0)]), seg("b", 5.0, vec![word("b", 5.0, 6.0)])];
        assert_eq!(upcoming_segment(&segs, 2.0), 1);
        assert_eq!(upcoming_segment(&segs, 9.0), 1);
    }

    #[test]
    fn test_pending_load_keeps_placeholder_on_screen() {
        let mut state = AppState::new();
        state.new_session(None, "song".into(), "doc.json".into());

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| render(f, &mut state, Rect::new(0, 0, 40, 10)))
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("♪ ♪ ♪"));
        assert!(screen.contains("loading doc.json"));
        assert_eq!(state.hits.words.len(), 1);
    }

    #[test]
    fn test_painted_words_are_clickable() {
        let mut state = AppState::new();
        state.new_session(None, "song".into(), "doc.json".into());
        state.session.document = Some(LyricsDocument {
            metadata: Default::default(),
            segments: vec![
                seg("0", 0.0, vec![word("one", 0.0, 1.0), word("two", 1.0, 2.0)]),
                seg("1", 3.0, vec![word("three", 3.0, 4.0)]),
            ],
        });

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| render(f, &mut state, Rect::new(0, 0, 40, 10)))
            .unwrap();

        let seek_times: Vec<f64> = state.hits.words.iter().map(|(_, t)| *t).collect();
        assert_eq!(seek_times, vec![0.0, 1.0, 3.0]);
        let (rect, _) = state.hits.words[1];
        assert_eq!(state.hits.hit_test(rect.x, rect.y), Some(Hit::Word(1.0)));
    }
}
