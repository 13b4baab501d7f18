//! Temporal activation resolver
//!
//! Maps a playback time onto the active segment, word and syllable of a
//! document. Every lookup scans in document order and the first unit whose
//! closed interval contains the time wins, so overlapping units resolve to the
//! earlier one. Units with an inverted interval (`end < start`) never match.

use super::model::{LyricsDocument, Segment, Syllable, Word};

/// Anything with a closed `[start, end]` interval in seconds.
pub trait Timed {
    fn start(&self) -> f64;
    fn end(&self) -> f64;

    fn contains(&self, time: f64) -> bool {
        let (start, end) = (self.start(), self.end());
        start <= end && start <= time && time <= end
    }
}

impl Timed for Segment {
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

impl Timed for Word {
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

impl Timed for Syllable {
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

/// Index of the first unit containing `time`.
pub fn first_active<T: Timed>(time: f64, units: &[T]) -> Option<usize> {
    units.iter().position(|u| u.contains(time))
}

pub fn active_segment(time: f64, segments: &[Segment]) -> Option<&Segment> {
    first_active(time, segments).map(|i| &segments[i])
}

pub fn active_word(time: f64, segment: &Segment) -> Option<&Word> {
    first_active(time, &segment.words).map(|i| &segment.words[i])
}

pub fn active_syllable(time: f64, word: &Word) -> Option<&Syllable> {
    first_active(time, &word.syllables).map(|i| &word.syllables[i])
}

/// Fraction of `[start, end]` elapsed at `time`, clamped to `[0, 1]`.
///
/// A zero-length interval reads as complete once `time >= start`. An inverted
/// interval is never active and reads as 0.
pub fn progress_within(time: f64, start: f64, end: f64) -> f64 {
    if end < start || time.is_nan() || time < start {
        return 0.0;
    }
    if time >= end {
        return 1.0;
    }
    ((time - start) / (end - start)).clamp(0.0, 1.0)
}

pub fn progress_of<T: Timed>(time: f64, unit: &T) -> f64 {
    progress_within(time, unit.start(), unit.end())
}

/// Every segment containing `time`, in document order. Backs the word timing
/// panel and is recomputed on each tick.
pub fn active_segments(time: f64, segments: &[Segment]) -> Vec<&Segment> {
    segments.iter().filter(|s| s.contains(time)).collect()
}

/// Resolved highlight state for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Activation {
    pub segment: Option<usize>,
    pub word: Option<usize>,
    pub syllable: Option<usize>,
    pub segment_progress: f64,
    pub word_progress: f64,
}

pub fn resolve(time: f64, doc: &LyricsDocument) -> Activation {
    let Some(seg_idx) = first_active(time, &doc.segments) else {
        return Activation::default();
    };
    let segment = &doc.segments[seg_idx];
    let mut activation = Activation {
        segment: Some(seg_idx),
        segment_progress: progress_of(time, segment),
        ..Activation::default()
    };

    if let Some(word_idx) = first_active(time, &segment.words) {
        let word = &segment.words[word_idx];
        activation.word = Some(word_idx);
        activation.word_progress = progress_of(time, word);
        activation.syllable = first_active(time, &word.syllables);
    }

    activation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, start: f64, end: f64) -> Segment {
        Segment {
            id: id.to_string(),
            text: id.to_string(),
            start,
            end,
            words: Vec::new(),
        }
    }

    fn word(text: &str, start: f64, end: f64, syllables: &[(&str, f64, f64)]) -> Word {
        Word {
            text: text.to_string(),
            start,
            end,
            confidence: 1.0,
            syllables: syllables
                .iter()
                .map(|(t, s, e)| Syllable {
                    text: t.to_string(),
                    start: *s,
                    end: *e,
                })
                .collect(),
            translation: None,
        }
    }

    fn sample_doc() -> LyricsDocument {
        let mut s = seg("s1", 0.0, 4.0);
        s.text = "Sample".into();
        s.words = vec![word("Sample", 0.5, 1.5, &[("Sam", 0.5, 1.0), ("ple", 1.0, 1.5)])];
        LyricsDocument {
            segments: vec![s],
            ..LyricsDocument::default()
        }
    }

    #[test]
    fn test_segment_not_selected_before_start() {
        let segments = vec![seg("a", 2.0, 3.0)];
        for t in [-1.0, 0.0, 1.0, 1.999] {
            assert!(active_segment(t, &segments).is_none(), "t={t}");
        }
    }

    #[test]
    fn test_segment_selected_inside_inclusive_bounds() {
        let segments = vec![seg("a", 2.0, 3.0)];
        for t in [2.0, 2.5, 3.0] {
            assert_eq!(active_segment(t, &segments).map(|s| s.id.as_str()), Some("a"));
        }
        assert!(active_segment(3.0001, &segments).is_none());
    }

    #[test]
    fn test_overlap_resolves_to_document_order() {
        let segments = vec![seg("A", 0.0, 5.0), seg("B", 4.0, 9.0)];
        assert_eq!(active_segment(4.5, &segments).unwrap().id, "A");
        assert_eq!(active_segment(5.5, &segments).unwrap().id, "B");

        // Order is document order, not start time.
        let reversed = vec![seg("B", 4.0, 9.0), seg("A", 0.0, 5.0)];
        assert_eq!(active_segment(4.5, &reversed).unwrap().id, "B");
    }

    #[test]
    fn test_boundary_tie_prefers_earlier_segment() {
        let segments = vec![seg("A", 0.0, 2.0), seg("B", 2.0, 4.0)];
        assert_eq!(active_segment(2.0, &segments).unwrap().id, "A");
    }

    #[test]
    fn test_inverted_interval_never_active() {
        let segments = vec![seg("bad", 5.0, 3.0), seg("ok", 3.0, 6.0)];
        assert_eq!(active_segment(4.0, &segments).unwrap().id, "ok");
        assert_eq!(progress_within(4.0, 5.0, 3.0), 0.0);
    }

    #[test]
    fn test_nan_time_matches_nothing() {
        let segments = vec![seg("a", 0.0, 10.0)];
        assert!(active_segment(f64::NAN, &segments).is_none());
        assert_eq!(progress_within(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_progress_endpoints_and_monotonic() {
        assert_eq!(progress_within(2.0, 2.0, 4.0), 0.0);
        assert_eq!(progress_within(4.0, 2.0, 4.0), 1.0);
        assert_eq!(progress_within(1.0, 2.0, 4.0), 0.0);
        assert_eq!(progress_within(9.0, 2.0, 4.0), 1.0);

        let mut last = 0.0;
        for i in 0..=100 {
            let t = 2.0 + (i as f64) * 0.02;
            let p = progress_within(t, 2.0, 4.0);
            assert!(p >= last, "t={t} p={p} last={last}");
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn test_progress_degenerate_interval() {
        assert_eq!(progress_within(0.9, 1.0, 1.0), 0.0);
        assert_eq!(progress_within(1.0, 1.0, 1.0), 1.0);
        assert_eq!(progress_within(1.5, 1.0, 1.0), 1.0);
    }

    #[test]
    fn test_word_start_is_inclusive() {
        let doc = sample_doc();
        let w = &doc.segments[0].words[0];
        let a = resolve(w.start, &doc);
        assert_eq!(a.word, Some(0));
        assert_eq!(active_word(w.start, &doc.segments[0]).unwrap().text, "Sample");
    }

    #[test]
    fn test_resolve_sample_document() {
        let doc = sample_doc();
        let a = resolve(1.2, &doc);
        assert_eq!(a.segment, Some(0));
        assert_eq!(a.word, Some(0));
        assert_eq!(a.syllable, Some(1));
        assert!((a.word_progress - 0.7).abs() < 1e-9);
        assert!((a.segment_progress - 0.3).abs() < 1e-9);

        let word = &doc.segments[0].words[0];
        assert_eq!(active_syllable(1.2, word).unwrap().text, "ple");
        // Shared boundary goes to the first syllable.
        assert_eq!(active_syllable(1.0, word).unwrap().text, "Sam");
    }

    #[test]
    fn test_resolve_gap_between_words() {
        let mut doc = sample_doc();
        doc.segments[0].words.push(word("again", 2.0, 3.0, &[]));
        let a = resolve(1.7, &doc);
        assert_eq!(a.segment, Some(0));
        assert_eq!(a.word, None);
        assert_eq!(a.syllable, None);
        assert_eq!(a.word_progress, 0.0);

        let a = resolve(2.5, &doc);
        assert_eq!(a.word, Some(1));
        assert_eq!(a.syllable, None);
    }

    #[test]
    fn test_active_segments_filters_all_matches() {
        let segments = vec![seg("A", 0.0, 5.0), seg("B", 4.0, 9.0), seg("C", 10.0, 12.0)];
        let ids: Vec<_> = active_segments(4.5, &segments).iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(active_segments(9.5, &segments).is_empty());
    }
}
