//! Long-running song operations: backend call bracketed by status updates.
//!
//! A backend failure is recorded on the song (`status = error`) and the
//! updated song is returned as `Ok`. `Err` is reserved for storage problems
//! and disallowed transitions.

use super::Library;
use super::song::{Song, SongStatus};
use crate::backend::BackendClient;
use crate::storage::StorageHandle;
use anyhow::Context;

async fn with_library<T, F>(storage: &StorageHandle, f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Library<StorageHandle>) -> anyhow::Result<T> + Send + 'static,
{
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || f(&Library::new(storage)))
        .await
        .context("storage task panicked")?
}

/// Look up title and artist, then add the song. Metadata failures still add
/// the song, titled by its URL.
pub async fn add_from_url(backend: &BackendClient, storage: &StorageHandle, url: &str) -> anyhow::Result<Song> {
    let url = url.trim().to_string();
    let (title, artist, duration) = match backend.extract_metadata(&url).await {
        Ok(m) => (m.title, m.artist, m.duration),
        Err(e) => {
            tracing::warn!(%url, "metadata lookup failed: {e:#}");
            (url.clone(), String::new(), None)
        }
    };

    with_library(storage, move |lib| {
        let song = lib.add(&url, &title, &artist)?;
        match duration {
            Some(d) if song.duration.is_none() => lib.update(&song.id, |s| {
                s.duration = Some(d);
                Ok(())
            }),
            _ => Ok(song),
        }
    })
    .await
}

pub async fn download(backend: &BackendClient, storage: &StorageHandle, id: &str) -> anyhow::Result<Song> {
    let song = begin(storage, id, SongStatus::Downloading).await?;
    let id = song.id.clone();

    match backend.download_audio(&song.source_url, &id).await {
        Ok(r) if r.success => {
            tracing::info!(song = %id, path = ?r.file_path, "audio downloaded");
            with_library(storage, move |lib| lib.finish_download(&id, r.file_path, r.duration)).await
        }
        Ok(r) => {
            let msg = r.error.unwrap_or_else(|| "download failed".to_string());
            fail(storage, id, msg).await
        }
        Err(e) => fail(storage, id, format!("{e:#}")).await,
    }
}

pub async fn search_lyrics(backend: &BackendClient, storage: &StorageHandle, id: &str) -> anyhow::Result<Song> {
    let song = begin(storage, id, SongStatus::LyricsSearching).await?;
    let id = song.id.clone();

    match backend.search_lyrics(&song.title, &song.artist, &song.language).await {
        Ok(found) => {
            tracing::info!(song = %id, sources = found.sources.len(), "lyrics search done");
            with_library(storage, move |lib| lib.apply_lyrics_sources(&id, found.sources)).await
        }
        Err(e) => fail(storage, id, format!("{e:#}")).await,
    }
}

pub async fn process(backend: &BackendClient, storage: &StorageHandle, id: &str) -> anyhow::Result<Song> {
    let song = begin(storage, id, SongStatus::Processing).await?;
    let id = song.id.clone();

    match backend.process_song(&id).await {
        Ok(r) if r.success => {
            tracing::info!(song = %id, "processing done");
            with_library(storage, move |lib| lib.finish_processing(&id)).await
        }
        Ok(r) => {
            let msg = r.error.unwrap_or_else(|| "processing failed".to_string());
            fail(storage, id, msg).await
        }
        Err(e) => fail(storage, id, format!("{e:#}")).await,
    }
}

async fn begin(storage: &StorageHandle, id: &str, status: SongStatus) -> anyhow::Result<Song> {
    let id = id.to_string();
    with_library(storage, move |lib| lib.begin(&id, status)).await
}

async fn fail(storage: &StorageHandle, id: String, message: String) -> anyhow::Result<Song> {
    with_library(storage, move |lib| lib.fail(&id, &message)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::song::LyricsStatus;
    use std::time::Duration;

    fn scratch_storage(name: &str) -> StorageHandle {
        let path = std::env::temp_dir().join(format!("karaoke-wf-{}-{name}.sqlite3", std::process::id()));
        let _ = std::fs::remove_file(&path);
        StorageHandle::new(path)
    }

    // Nothing listens on port 9; every call fails at the transport level.
    fn dead_backend() -> BackendClient {
        BackendClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_backend_records_error() {
        let storage = scratch_storage("dl");
        let backend = dead_backend();
        let song = add_from_url(&backend, &storage, "https://youtu.be/abc").await.unwrap();
        assert_eq!(song.title, "https://youtu.be/abc");

        let song = download(&backend, &storage, &song.id).await.unwrap();
        assert_eq!(song.status, SongStatus::Error);
        assert!(song.error.is_some());

        // Retrying from error is allowed.
        let song = search_lyrics(&backend, &storage, &song.id).await.unwrap();
        assert_eq!(song.status, SongStatus::Error);
        assert_eq!(song.lyrics_status, LyricsStatus::None);
        let _ = std::fs::remove_file(storage.path());
    }

    #[tokio::test]
    async fn test_disallowed_step_is_err() {
        let storage = scratch_storage("proc");
        let backend = dead_backend();
        let song = add_from_url(&backend, &storage, "https://youtu.be/def").await.unwrap();
        // New songs cannot be processed before download.
        assert!(process(&backend, &storage, &song.id).await.is_err());
        let _ = std::fs::remove_file(storage.path());
    }
}
