//! Timed lyric data model
//!
//! A document is an ordered list of segments, each segment an ordered list of
//! words, each word an ordered list of syllables. Every unit carries a closed
//! `[start, end]` interval in seconds. The shapes mirror the processed JSON
//! written by the preprocessing pipeline; unknown fields are ignored and
//! optional collections default to empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllable {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub literal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub syllables: Vec<Syllable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,
}

fn default_confidence() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    pub artists: Vec<String>,
    pub duration: f64,
    pub language: String,
    pub alignment_method: String,
    pub alignment_quality: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            artists: Vec::new(),
            duration: 0.0,
            language: "auto".to_string(),
            alignment_method: "unknown".to_string(),
            alignment_quality: 0.0,
            processing_version: None,
            processed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricsDocument {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl LyricsDocument {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Timeline length: declared duration, or the last segment end when the
    /// metadata has none.
    pub fn duration(&self) -> f64 {
        if self.metadata.duration > 0.0 {
            return self.metadata.duration;
        }
        self.segments
            .iter()
            .map(|s| s.end)
            .filter(|e| e.is_finite())
            .fold(0.0, f64::max)
    }

    pub fn artists_label(&self) -> String {
        self.metadata.artists.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let raw = r#"{
            "metadata": {"title": "Yana Yana", "artists": ["Semicenk"], "duration": 180.5,
                         "language": "tr", "alignment_method": "smart_processing",
                         "alignment_quality": 0.82, "source_info": {"audio_file": "x.mp3"}},
            "segments": [
                {"id": "s1", "text": "Sample", "start": 0.0, "end": 4.0,
                 "words": [{"text": "Sample", "start": 0.5, "end": 1.5}]}
            ],
            "processing_info": {"pipeline_version": "2.0.0"}
        }"#;
        let doc = LyricsDocument::from_json(raw).unwrap();
        assert_eq!(doc.metadata.title, "Yana Yana");
        assert_eq!(doc.segments.len(), 1);
        let word = &doc.segments[0].words[0];
        assert!(word.syllables.is_empty());
        assert_eq!(word.confidence, 1.0);
        assert!(word.translation.is_none());
    }

    #[test]
    fn test_missing_words_default_empty() {
        let raw = r#"{"segments": [{"id": "a", "start": 1.0, "end": 2.0}]}"#;
        let doc = LyricsDocument::from_json(raw).unwrap();
        assert!(doc.segments[0].words.is_empty());
        assert_eq!(doc.metadata.language, "auto");
    }

    #[test]
    fn test_duration_falls_back_to_last_segment() {
        let raw = r#"{"segments": [
            {"id": "a", "start": 1.0, "end": 2.0},
            {"id": "b", "start": 3.0, "end": 7.5}
        ]}"#;
        let doc = LyricsDocument::from_json(raw).unwrap();
        assert_eq!(doc.duration(), 7.5);
    }

    #[test]
    fn test_translation_roundtrips_optional_contextual() {
        let raw = r#"{"text": "sevdik", "start": 0.0, "end": 1.0,
                      "translation": {"literal": "we loved"}}"#;
        let word: Word = serde_json::from_str(raw).unwrap();
        let t = word.translation.unwrap();
        assert_eq!(t.literal, "we loved");
        assert!(t.contextual.is_none());
    }
}
