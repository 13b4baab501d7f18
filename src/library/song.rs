//! Song records and their lifecycle.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SongStatus {
    New,
    Downloading,
    Downloaded,
    LyricsSearching,
    LyricsFound,
    Processing,
    Ready,
    Error,
}

impl SongStatus {
    /// Allowed lifecycle moves. `Error` is reachable from anywhere and every
    /// long-running step can be retried from `Error`.
    pub fn can_transition_to(self, next: SongStatus) -> bool {
        use SongStatus::*;
        if next == Error {
            return true;
        }
        matches!(
            (self, next),
            (New, Downloading)
                | (New, LyricsSearching)
                | (Downloading, Downloaded)
                | (Downloaded, Downloading)
                | (Downloaded, LyricsSearching)
                | (Downloaded, Processing)
                | (LyricsSearching, LyricsFound)
                | (LyricsFound, LyricsSearching)
                | (LyricsFound, Downloading)
                | (LyricsFound, Processing)
                | (Processing, Ready)
                | (Ready, Downloading)
                | (Ready, LyricsSearching)
                | (Ready, Processing)
                | (Error, Downloading)
                | (Error, LyricsSearching)
                | (Error, Processing)
        )
    }

    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SongStatus::Downloading | SongStatus::LyricsSearching | SongStatus::Processing
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SongStatus::New => "new",
            SongStatus::Downloading => "downloading",
            SongStatus::Downloaded => "downloaded",
            SongStatus::LyricsSearching => "searching lyrics",
            SongStatus::LyricsFound => "lyrics found",
            SongStatus::Processing => "processing",
            SongStatus::Ready => "ready",
            SongStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsStatus {
    None,
    Searching,
    Found,
    Verified,
    UserEdited,
}

impl LyricsStatus {
    pub fn can_transition_to(self, next: LyricsStatus) -> bool {
        use LyricsStatus::*;
        matches!(
            (self, next),
            (None, Searching)
                | (None, UserEdited)
                | (Searching, Found)
                | (Searching, None)
                | (Found, Verified)
                | (Found, Searching)
                | (Found, UserEdited)
                | (Verified, Searching)
                | (Verified, UserEdited)
                | (UserEdited, Searching)
                | (UserEdited, UserEdited)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            LyricsStatus::None => "none",
            LyricsStatus::Searching => "searching",
            LyricsStatus::Found => "found",
            LyricsStatus::Verified => "verified",
            LyricsStatus::UserEdited => "edited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsSource {
    pub url: String,
    pub site_name: String,
    pub lyrics: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub source_url: String,
    pub title: String,
    pub artist: String,
    pub language: String,
    pub status: SongStatus,
    pub lyrics_status: LyricsStatus,
    #[serde(default)]
    pub lyrics_sources: Vec<LyricsSource>,
    #[serde(default)]
    pub final_lyrics: String,
    #[serde(default)]
    pub lyrics_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Song {
    pub fn new(source_url: &str, title: &str, artist: &str, now_unix: i64) -> Self {
        let language = super::language::detect_language(&format!("{title} {artist}")).to_string();
        Self {
            id: song_id(source_url),
            source_url: source_url.trim().to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            language,
            status: SongStatus::New,
            lyrics_status: LyricsStatus::None,
            lyrics_sources: Vec::new(),
            final_lyrics: String::new(),
            lyrics_verified: false,
            duration: None,
            audio_file_path: None,
            created_at: now_unix,
            updated_at: now_unix,
            error: None,
        }
    }

    pub fn set_status(&mut self, next: SongStatus) -> anyhow::Result<()> {
        if !self.status.can_transition_to(next) {
            anyhow::bail!(
                "song {}: cannot go from {} to {}",
                self.id,
                self.status.label(),
                next.label()
            );
        }
        if next != SongStatus::Error {
            self.error = None;
        }
        self.status = next;
        Ok(())
    }

    pub fn set_lyrics_status(&mut self, next: LyricsStatus) -> anyhow::Result<()> {
        if !self.lyrics_status.can_transition_to(next) {
            anyhow::bail!(
                "song {}: lyrics cannot go from {} to {}",
                self.id,
                self.lyrics_status.label(),
                next.label()
            );
        }
        self.lyrics_status = next;
        Ok(())
    }

    /// Record a failed step. Always allowed.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(song = %self.id, "{message}");
        self.status = SongStatus::Error;
        self.error = Some(message);
        if self.lyrics_status == LyricsStatus::Searching {
            self.lyrics_status = LyricsStatus::None;
        }
    }

    pub fn display_name(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

/// Stable id: first 12 hex chars of the SHA-1 of the trimmed source URL.
pub fn song_id(source_url: &str) -> String {
    let normalized = source_url.trim().trim_end_matches('/');
    let mut hasher = Sha1::new();
    hasher.update(normalized.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

pub fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub fn parse_songs(raw: &str) -> anyhow::Result<Vec<Song>> {
    serde_json::from_str(raw).context("parse song collection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_lifecycle() {
        let mut song = Song::new("https://youtu.be/Q3cj3lVCxr0", "Yana Yana", "Semicenk", 1);
        for next in [
            SongStatus::Downloading,
            SongStatus::Downloaded,
            SongStatus::LyricsSearching,
            SongStatus::LyricsFound,
            SongStatus::Processing,
            SongStatus::Ready,
        ] {
            song.set_status(next).unwrap();
        }
        assert_eq!(song.status, SongStatus::Ready);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut song = Song::new("u", "t", "a", 1);
        assert!(song.set_status(SongStatus::Ready).is_err());
        assert_eq!(song.status, SongStatus::New);
        assert!(song.set_status(SongStatus::Processing).is_err());
    }

    #[test]
    fn test_error_is_retriable() {
        let mut song = Song::new("u", "t", "a", 1);
        song.set_status(SongStatus::Downloading).unwrap();
        song.fail("network down");
        assert_eq!(song.status, SongStatus::Error);
        assert_eq!(song.error.as_deref(), Some("network down"));

        song.set_status(SongStatus::Downloading).unwrap();
        assert!(song.error.is_none());
    }

    #[test]
    fn test_lyrics_status_table() {
        assert!(LyricsStatus::None.can_transition_to(LyricsStatus::Searching));
        assert!(LyricsStatus::Found.can_transition_to(LyricsStatus::Verified));
        assert!(!LyricsStatus::None.can_transition_to(LyricsStatus::Verified));
        assert!(!LyricsStatus::Searching.can_transition_to(LyricsStatus::Verified));
    }

    #[test]
    fn test_song_id_is_stable() {
        let a = song_id("https://youtu.be/abc");
        assert_eq!(a.len(), 12);
        assert_eq!(a, song_id("  https://youtu.be/abc/ "));
        assert_ne!(a, song_id("https://youtu.be/abd"));
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let song = Song::new("https://x", "t", "a", 5);
        let v = serde_json::to_value(&song).unwrap();
        assert_eq!(v["sourceUrl"], "https://x");
        assert_eq!(v["lyricsStatus"], "none");
        assert_eq!(v["status"], "new");
        assert!(v.get("error").is_none());

        let raw = r#"[{"id":"1","sourceUrl":"u","title":"t","artist":"a","language":"tr",
                      "status":"lyrics_found","lyricsStatus":"user_edited",
                      "createdAt":1,"updatedAt":2}]"#;
        let songs = parse_songs(raw).unwrap();
        assert_eq!(songs[0].status, SongStatus::LyricsFound);
        assert_eq!(songs[0].lyrics_status, LyricsStatus::UserEdited);
        assert!(songs[0].lyrics_sources.is_empty());
    }
}
