//! Lyrics document loading with a primary → fallback → placeholder chain.
//!
//! Each failure is logged and swallowed; the chain always yields a document.

use super::model::{LyricsDocument, Metadata, Segment, Word};
use anyhow::Context;
use once_cell::sync::Lazy;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Processed-document version written by the preprocessing pipeline.
pub const PIPELINE_VERSION: &str = "2.0.0";

static PLACEHOLDER: Lazy<LyricsDocument> = Lazy::new(|| LyricsDocument {
    metadata: Metadata {
        title: "No lyrics loaded".to_string(),
        alignment_method: "placeholder".to_string(),
        duration: 5.0,
        ..Metadata::default()
    },
    segments: vec![Segment {
        id: "placeholder".to_string(),
        text: "♪ ♪ ♪".to_string(),
        start: 0.0,
        end: 5.0,
        words: vec![Word {
            text: "♪ ♪ ♪".to_string(),
            start: 0.0,
            end: 5.0,
            confidence: 0.0,
            syllables: Vec::new(),
            translation: None,
        }],
    }],
});

pub fn placeholder() -> LyricsDocument {
    PLACEHOLDER.clone()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
}

impl DocumentSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Versioned primary and unversioned fallback for a processed song.
    pub fn for_song(processed_dir: &Path, song_id: &str) -> (Self, Self) {
        (
            Self::File(processed_dir.join(format!("{song_id}_processed_v{PIPELINE_VERSION}.json"))),
            Self::File(processed_dir.join(format!("{song_id}_processed.json"))),
        )
    }

    pub fn label(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
        }
    }
}

/// Where the loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadedFrom {
    Primary,
    Fallback,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Loader {
    http: reqwest::Client,
}

impl Loader {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build reqwest client")?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, source: &DocumentSource) -> anyhow::Result<LyricsDocument> {
        let raw = match source {
            DocumentSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read {}", path.display()))?,
            DocumentSource::Url(url) => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("fetch {url}"))?;
                if !response.status().is_success() {
                    anyhow::bail!("fetch {url}: {}", response.status());
                }
                response.text().await.with_context(|| format!("read body {url}"))?
            }
        };
        LyricsDocument::from_json(&raw).with_context(|| format!("parse {}", source.label()))
    }

    pub async fn load(
        &self,
        primary: &DocumentSource,
        fallback: Option<&DocumentSource>,
    ) -> (LyricsDocument, LoadedFrom) {
        match self.fetch(primary).await {
            Ok(doc) => {
                tracing::info!(source = %primary.label(), segments = doc.segments.len(), "lyrics loaded");
                return (doc, LoadedFrom::Primary);
            }
            Err(e) => tracing::warn!("primary lyrics unavailable: {e:#}"),
        }

        if let Some(fallback) = fallback {
            match self.fetch(fallback).await {
                Ok(doc) => {
                    tracing::info!(source = %fallback.label(), segments = doc.segments.len(), "fallback lyrics loaded");
                    return (doc, LoadedFrom::Fallback);
                }
                Err(e) => tracing::warn!("fallback lyrics unavailable: {e:#}"),
            }
        }

        tracing::warn!("using placeholder lyrics");
        (placeholder(), LoadedFrom::Placeholder)
    }
}

/// Recently loaded documents keyed by their primary source.
pub struct DocumentCache {
    inner: lru::LruCache<DocumentSource, (LyricsDocument, LoadedFrom)>,
}

impl DocumentCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: lru::LruCache::new(cap),
        }
    }

    pub fn get(&mut self, source: &DocumentSource) -> Option<(LyricsDocument, LoadedFrom)> {
        self.inner.get(source).cloned()
    }

    /// Placeholders are never cached so a later load can still succeed.
    pub fn put(&mut self, source: DocumentSource, doc: LyricsDocument, from: LoadedFrom) {
        if from != LoadedFrom::Placeholder {
            self.inner.put(source, (doc, from));
        }
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
