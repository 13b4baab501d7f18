//! Segment timeline: one block per segment, scaled to the track duration.

use crate::lyrics::model::Segment;
use crate::lyrics::resolve::Timed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBlock {
    pub segment_index: usize,
    /// First column covered.
    pub start_col: u16,
    /// One past the last column covered.
    pub end_col: u16,
    pub active: bool,
}

/// Lay segments out over `width` columns. Blocks are at least one column
/// wide; segments with inverted intervals or starting past the end are
/// left out.
pub fn timeline_blocks(
    segments: &[Segment],
    duration: f64,
    width: u16,
    active: Option<usize>,
) -> Vec<TimelineBlock> {
    if width == 0 || duration.is_nan() || duration <= 0.0 {
        return Vec::new();
    }
    let w = f64::from(width);
    segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.start() <= s.end() && s.start <= duration)
        .map(|(i, s)| {
            let from = (s.start / duration).clamp(0.0, 1.0);
            let to = (s.end / duration).clamp(0.0, 1.0);
            let start_col = ((from * w).floor() as u16).min(width - 1);
            let end_col = ((to * w).ceil() as u16).clamp(start_col + 1, width);
            TimelineBlock {
                segment_index: i,
                start_col,
                end_col,
                active: active == Some(i),
            }
        })
        .collect()
}

/// Fraction of the timeline at a column relative to its left edge.
pub fn fraction_at(column: u16, width: u16) -> f64 {
    if width == 0 {
        return 0.0;
    }
    ((f64::from(column) + 0.5) / f64::from(width)).clamp(0.0, 1.0)
}

pub fn seek_fraction(fraction: f64, duration: f64) -> f64 {
    let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    f * duration.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> Segment {
        Segment {
            id: format!("{start}"),
            text: String::new(),
            start,
            end,
            words: Vec::new(),
        }
    }

    #[test]
    fn test_blocks_scaled_to_width() {
        let segments = vec![seg(0.0, 25.0), seg(50.0, 75.0)];
        let blocks = timeline_blocks(&segments, 100.0, 40, Some(1));
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_col, blocks[0].end_col), (0, 10));
        assert_eq!((blocks[1].start_col, blocks[1].end_col), (20, 30));
        assert!(!blocks[0].active);
        assert!(blocks[1].active);
    }

    #[test]
    fn test_short_segment_gets_one_column() {
        let blocks = timeline_blocks(&[seg(10.0, 10.1)], 100.0, 20, None);
        assert_eq!((blocks[0].start_col, blocks[0].end_col), (2, 3));
    }

    #[test]
    fn test_inverted_and_degenerate_inputs() {
        assert!(timeline_blocks(&[seg(5.0, 1.0)], 100.0, 20, None).is_empty());
        assert!(timeline_blocks(&[seg(0.0, 1.0)], 0.0, 20, None).is_empty());
        assert!(timeline_blocks(&[seg(0.0, 1.0)], 10.0, 0, None).is_empty());
    }

    #[test]
    fn test_segment_at_end_stays_in_bounds() {
        let blocks = timeline_blocks(&[seg(99.9, 100.0)], 100.0, 10, None);
        assert_eq!((blocks[0].start_col, blocks[0].end_col), (9, 10));
    }

    #[test]
    fn test_click_fraction_to_seek() {
        assert_eq!(seek_fraction(0.25, 200.0), 50.0);
        assert_eq!(seek_fraction(1.5, 200.0), 200.0);
        assert_eq!(seek_fraction(-0.5, 200.0), 0.0);
        assert_eq!(fraction_at(0, 4), 0.125);
        assert_eq!(fraction_at(3, 4), 0.875);
    }
}
