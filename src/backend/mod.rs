//! Client for the song-processing backend.
//!
//! Every call is a JSON POST under `<base_url>/api/`. Transport errors and
//! non-success statuses come back as `Err`; callers record them on the song.

use crate::library::song::LyricsSource;
use anyhow::Context;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LyricsSearch {
    #[serde(default)]
    pub sources: Vec<LyricsSource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessResult {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    const USER_AGENT: &'static str = concat!("karaoke/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, name: &str, body: &B) -> anyhow::Result<T> {
        let url = self.endpoint(name);
        tracing::debug!(%url, "backend request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = error_detail(&text).unwrap_or(text);
            anyhow::bail!("{name} failed: {status} {}", detail.trim());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("decode {name} response"))
    }

    pub async fn extract_metadata(&self, url: &str) -> anyhow::Result<Metadata> {
        self.post("extract-metadata", &json!({ "url": url })).await
    }

    pub async fn download_audio(&self, url: &str, song_id: &str) -> anyhow::Result<DownloadResult> {
        self.post("download-audio", &json!({ "url": url, "songId": song_id }))
            .await
    }

    pub async fn search_lyrics(&self, title: &str, artist: &str, language: &str) -> anyhow::Result<LyricsSearch> {
        self.post(
            "search-lyrics",
            &json!({ "title": title, "artist": artist, "language": language }),
        )
        .await
    }

    pub async fn process_song(&self, song_id: &str) -> anyhow::Result<ProcessResult> {
        self.post("process-song", &json!({ "songId": song_id })).await
    }
}

/// Pull `error` or `message` out of a JSON error body.
fn error_detail(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("error")
        .or_else(|| v.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
