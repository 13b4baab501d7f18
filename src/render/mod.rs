//! Lyric view strategies.
//!
//! Each strategy turns one segment plus its resolved activation into a row of
//! [`WordCell`]s. Cells are plain data; the TUI paints them and maps clicks
//! back through `seek_to`.

pub mod timeline;

use crate::lyrics::model::Segment;
use crate::lyrics::resolve::Activation;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Karaoke,
    Syllables,
    Simple,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Karaoke => ViewMode::Syllables,
            ViewMode::Syllables => ViewMode::Simple,
            ViewMode::Simple => ViewMode::Karaoke,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Karaoke => "Karaoke",
            ViewMode::Syllables => "Syllables",
            ViewMode::Simple => "Simple",
        }
    }
}

/// A run of text inside a word: the whole word, or one syllable.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub text: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordCell {
    pub word_index: usize,
    pub pieces: Vec<Piece>,
    /// Word-level emphasis.
    pub active: bool,
    /// Elapsed fraction of the word, meaningful when `active`.
    pub progress: f64,
    pub translation: Option<String>,
    /// Where selecting this word seeks to.
    pub seek_to: f64,
}

impl WordCell {
    pub fn text(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }

    /// Text plus the translation suffix, as painted.
    pub fn display_text(&self) -> String {
        match &self.translation {
            Some(t) => format!("{} ({t})", self.text()),
            None => self.text(),
        }
    }
}

/// Render one segment.
///
/// `active_word`/`active_syllable` are indices into the segment's words and
/// the active word's syllables, as produced by the resolver.
pub fn render_segment(
    mode: ViewMode,
    segment: &Segment,
    active_word: Option<usize>,
    active_syllable: Option<usize>,
    progress: f64,
    show_translations: bool,
) -> Vec<WordCell> {
    segment
        .words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let is_active = active_word == Some(i);
            let whole = |active: bool| {
                vec![Piece {
                    text: word.text.clone(),
                    active,
                }]
            };
            let (pieces, active) = match mode {
                ViewMode::Karaoke => (whole(is_active), is_active),
                ViewMode::Syllables if is_active && !word.syllables.is_empty() => {
                    let pieces = word
                        .syllables
                        .iter()
                        .enumerate()
                        .map(|(j, s)| Piece {
                            text: s.text.clone(),
                            active: active_syllable == Some(j),
                        })
                        .collect();
                    (pieces, true)
                }
                ViewMode::Syllables => (whole(false), is_active),
                ViewMode::Simple => (whole(false), false),
            };
            let translation = if show_translations {
                word.translation.as_ref().map(|t| t.literal.clone())
            } else {
                None
            };
            WordCell {
                word_index: i,
                pieces,
                active,
                progress: if is_active { progress } else { 0.0 },
                translation,
                seek_to: word.start,
            }
        })
        .collect()
}

/// Render the segment an activation points at, if any.
pub fn render_active(
    mode: ViewMode,
    segments: &[Segment],
    activation: &Activation,
    show_translations: bool,
) -> Option<Vec<WordCell>> {
    let segment = segments.get(activation.segment?)?;
    Some(render_segment(
        mode,
        segment,
        activation.word,
        activation.syllable,
        activation.word_progress,
        show_translations,
    ))
}

/// Plain-text form for headless output: emphasised runs are bracketed.
pub fn to_plain_text(cells: &[WordCell]) -> String {
    cells
        .iter()
        .map(|cell| {
            let split = cell.pieces.len() > 1;
            let mut out = String::new();
            if cell.active && !split {
                out.push('[');
            }
            for piece in &cell.pieces {
                if piece.active && split {
                    out.push('[');
                    out.push_str(&piece.text);
                    out.push(']');
                } else {
                    out.push_str(&piece.text);
                }
            }
            if cell.active && !split {
                out.push(']');
            }
            if let Some(t) = &cell.translation {
                out.push_str(&format!(" ({t})"));
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}
