//! Song library: CRUD over a whole-collection repository.
//!
//! Every mutation loads the full collection, changes it, and writes it back.
//! The playback core never touches this module.

pub mod language;
pub mod song;
pub mod verify;
pub mod workflow;

use song::{LyricsSource, LyricsStatus, Song, SongStatus, now_unix};

pub trait SongRepository {
    fn load_all(&self) -> anyhow::Result<Vec<Song>>;
    fn save_all(&self, songs: &[Song]) -> anyhow::Result<()>;
}

pub struct Library<R> {
    repo: R,
}

impl<R: SongRepository> Library<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> anyhow::Result<Vec<Song>> {
        self.repo.load_all()
    }

    pub fn get(&self, id: &str) -> anyhow::Result<Song> {
        self.repo
            .load_all()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow::anyhow!("no song with id {id}"))
    }

    /// Add a song by source URL. Adding the same URL twice returns the
    /// existing record.
    pub fn add(&self, source_url: &str, title: &str, artist: &str) -> anyhow::Result<Song> {
        let url = source_url.trim();
        if url.is_empty() {
            anyhow::bail!("source url is empty");
        }
        let mut songs = self.repo.load_all()?;
        let id = song::song_id(url);
        if let Some(existing) = songs.iter().find(|s| s.id == id) {
            return Ok(existing.clone());
        }
        let song = Song::new(url, title, artist, now_unix());
        tracing::info!(id = %song.id, url, "song added");
        songs.push(song.clone());
        self.repo.save_all(&songs)?;
        Ok(song)
    }

    pub fn remove(&self, id: &str) -> anyhow::Result<()> {
        let mut songs = self.repo.load_all()?;
        let before = songs.len();
        songs.retain(|s| s.id != id);
        if songs.len() == before {
            anyhow::bail!("no song with id {id}");
        }
        self.repo.save_all(&songs)
    }

    /// Apply `f` to one song and persist the collection. The change is
    /// discarded if `f` fails.
    pub fn update<F>(&self, id: &str, f: F) -> anyhow::Result<Song>
    where
        F: FnOnce(&mut Song) -> anyhow::Result<()>,
    {
        let mut songs = self.repo.load_all()?;
        let song = songs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow::anyhow!("no song with id {id}"))?;
        f(song)?;
        song.updated_at = now_unix();
        let updated = song.clone();
        self.repo.save_all(&songs)?;
        Ok(updated)
    }

    pub fn edit_metadata(
        &self,
        id: &str,
        title: Option<&str>,
        artist: Option<&str>,
        language: Option<&str>,
    ) -> anyhow::Result<Song> {
        self.update(id, |song| {
            if let Some(t) = title {
                song.title = t.to_string();
            }
            if let Some(a) = artist {
                song.artist = a.to_string();
            }
            if let Some(l) = language {
                song.language = l.to_string();
            }
            Ok(())
        })
    }

    /// Hand-edited lyrics replace whatever was found and drop verification.
    pub fn set_final_lyrics(&self, id: &str, lyrics: &str) -> anyhow::Result<Song> {
        self.update(id, |song| {
            song.set_lyrics_status(LyricsStatus::UserEdited)?;
            song.final_lyrics = lyrics.trim().to_string();
            song.lyrics_verified = false;
            if song.language == "auto" {
                song.language = language::detect_language(&song.final_lyrics).to_string();
            }
            Ok(())
        })
    }

    pub fn begin(&self, id: &str, status: SongStatus) -> anyhow::Result<Song> {
        self.update(id, |song| {
            song.set_status(status)?;
            if status == SongStatus::LyricsSearching {
                song.set_lyrics_status(LyricsStatus::Searching)?;
            }
            Ok(())
        })
    }

    /// Busy states are only valid while a workflow runs in this process.
    /// Anything still busy at startup was cut off and moves to `Error`, from
    /// which every step can be retried.
    pub fn recover_interrupted(&self) -> anyhow::Result<usize> {
        let mut songs = self.repo.load_all()?;
        let mut recovered = 0;
        for song in songs.iter_mut().filter(|s| s.status.is_busy()) {
            let step = song.status.label();
            song.fail(format!("interrupted while {step}"));
            song.updated_at = now_unix();
            recovered += 1;
        }
        if recovered > 0 {
            tracing::info!(recovered, "reset interrupted songs");
            self.repo.save_all(&songs)?;
        }
        Ok(recovered)
    }

    pub fn fail(&self, id: &str, message: &str) -> anyhow::Result<Song> {
        self.update(id, |song| {
            song.fail(message);
            Ok(())
        })
    }

    pub fn finish_download(
        &self,
        id: &str,
        audio_file_path: Option<String>,
        duration: Option<f64>,
    ) -> anyhow::Result<Song> {
        self.update(id, |song| {
            song.set_status(SongStatus::Downloaded)?;
            if audio_file_path.is_some() {
                song.audio_file_path = audio_file_path;
            }
            if duration.is_some() {
                song.duration = duration;
            }
            Ok(())
        })
    }

    /// Store search results. No sources is an error the user can retry.
    pub fn apply_lyrics_sources(&self, id: &str, sources: Vec<LyricsSource>) -> anyhow::Result<Song> {
        self.update(id, |song| {
            if sources.is_empty() {
                song.fail("no lyrics found");
                return Ok(());
            }
            let result = verify::verify(&sources);
            song.set_status(SongStatus::LyricsFound)?;
            song.set_lyrics_status(LyricsStatus::Found)?;
            if let Some(best) = &result.best {
                song.final_lyrics = best.lyrics.trim().to_string();
            }
            if result.verified {
                song.set_lyrics_status(LyricsStatus::Verified)?;
            }
            song.lyrics_verified = result.verified;
            song.lyrics_sources = sources;
            Ok(())
        })
    }

    /// Re-run the agreement check on the stored sources.
    pub fn verify_lyrics(&self, id: &str) -> anyhow::Result<Song> {
        let current = self.get(id)?;
        if current.lyrics_status == LyricsStatus::Verified {
            return Ok(current);
        }
        self.update(id, |song| {
            let result = verify::verify(&song.lyrics_sources);
            if !result.verified {
                anyhow::bail!(
                    "lyrics for {} not verified ({} sources, confidence {:.2})",
                    song.id,
                    song.lyrics_sources.len(),
                    result.confidence
                );
            }
            song.set_lyrics_status(LyricsStatus::Verified)?;
            if let Some(best) = result.best {
                song.final_lyrics = best.lyrics.trim().to_string();
            }
            song.lyrics_verified = true;
            Ok(())
        })
    }

    pub fn finish_processing(&self, id: &str) -> anyhow::Result<Song> {
        self.update(id, |song| song.set_status(SongStatus::Ready))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Counts full rewrites.
    #[derive(Default)]
    struct MemoryRepo {
        songs: RefCell<Vec<Song>>,
        writes: RefCell<usize>,
    }

    impl SongRepository for &MemoryRepo {
        fn load_all(&self) -> anyhow::Result<Vec<Song>> {
            Ok(self.songs.borrow().clone())
        }

        fn save_all(&self, songs: &[Song]) -> anyhow::Result<()> {
            *self.songs.borrow_mut() = songs.to_vec();
            *self.writes.borrow_mut() += 1;
            Ok(())
        }
    }

    fn long_lyrics() -> String {
        "Yana yana sevdik bazen çok kez unutulup gidenin ardından ".repeat(3)
    }

    fn source(site: &str, lyrics: &str, confidence: f64) -> LyricsSource {
        LyricsSource {
            url: format!("https://{site}"),
            site_name: site.into(),
            lyrics: lyrics.into(),
            confidence,
        }
    }

    #[test]
    fn test_add_is_idempotent_per_url() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let a = lib.add("https://youtu.be/x", "Yana Yana", "Semicenk").unwrap();
        let b = lib.add("https://youtu.be/x/", "Other", "Other").unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(lib.list().unwrap().len(), 1);
        assert_eq!(*repo.writes.borrow(), 1);
    }

    #[test]
    fn test_every_mutation_rewrites_collection() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        lib.edit_metadata(&song.id, Some("A2"), None, Some("tr")).unwrap();
        lib.begin(&song.id, SongStatus::Downloading).unwrap();
        assert_eq!(*repo.writes.borrow(), 3);
        let stored = lib.get(&song.id).unwrap();
        assert_eq!(stored.title, "A2");
        assert_eq!(stored.status, SongStatus::Downloading);
    }

    #[test]
    fn test_failed_update_is_not_saved() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        assert!(lib.begin(&song.id, SongStatus::Ready).is_err());
        assert_eq!(*repo.writes.borrow(), 1);
        assert_eq!(lib.get(&song.id).unwrap().status, SongStatus::New);
    }

    #[test]
    fn test_lyrics_search_flow_verifies_agreeing_sources() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        lib.begin(&song.id, SongStatus::LyricsSearching).unwrap();
        let text = long_lyrics();
        let song = lib
            .apply_lyrics_sources(
                &song.id,
                vec![source("a.com", &text, 0.95), source("b.com", &text.to_lowercase(), 0.8)],
            )
            .unwrap();
        assert_eq!(song.status, SongStatus::LyricsFound);
        assert_eq!(song.lyrics_status, LyricsStatus::Verified);
        assert!(song.lyrics_verified);
        assert_eq!(song.final_lyrics, text.trim());
    }

    #[test]
    fn test_no_sources_records_error() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        lib.begin(&song.id, SongStatus::LyricsSearching).unwrap();
        let song = lib.apply_lyrics_sources(&song.id, Vec::new()).unwrap();
        assert_eq!(song.status, SongStatus::Error);
        assert_eq!(song.error.as_deref(), Some("no lyrics found"));
        assert_eq!(song.lyrics_status, LyricsStatus::None);
    }

    #[test]
    fn test_user_edit_clears_verification() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        let song = lib.set_final_lyrics(&song.id, "  Çok kez unutulup  ").unwrap();
        assert_eq!(song.lyrics_status, LyricsStatus::UserEdited);
        assert!(!song.lyrics_verified);
        assert_eq!(song.final_lyrics, "Çok kez unutulup");
        assert!(lib.verify_lyrics(&song.id).is_err());
    }

    #[test]
    fn test_interrupted_workflow_can_be_retried() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let a = lib.add("https://a", "A", "x").unwrap();
        let b = lib.add("https://b", "B", "x").unwrap();
        let c = lib.add("https://c", "C", "x").unwrap();
        lib.begin(&a.id, SongStatus::Downloading).unwrap();
        lib.begin(&b.id, SongStatus::LyricsSearching).unwrap();
        // The process went away before either step finished.
        assert!(lib.begin(&a.id, SongStatus::Downloading).is_err());

        assert_eq!(lib.recover_interrupted().unwrap(), 2);
        let a = lib.get(&a.id).unwrap();
        assert_eq!(a.status, SongStatus::Error);
        assert_eq!(a.error.as_deref(), Some("interrupted while downloading"));
        let b = lib.get(&b.id).unwrap();
        assert_eq!(b.lyrics_status, LyricsStatus::None);
        assert_eq!(lib.get(&c.id).unwrap().status, SongStatus::New);

        lib.begin(&a.id, SongStatus::Downloading).unwrap();
        lib.begin(&b.id, SongStatus::LyricsSearching).unwrap();
        lib.begin(&c.id, SongStatus::Processing).unwrap_err();
    }

    #[test]
    fn test_recover_without_busy_songs_does_not_write() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        lib.add("https://a", "A", "x").unwrap();
        assert_eq!(lib.recover_interrupted().unwrap(), 0);
        assert_eq!(*repo.writes.borrow(), 1);
    }

    #[test]
    fn test_verifying_twice_is_a_noop() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        let song = lib.add("https://a", "A", "x").unwrap();
        lib.begin(&song.id, SongStatus::LyricsSearching).unwrap();
        let text = long_lyrics();
        let found = lib
            .apply_lyrics_sources(&song.id, vec![source("a.com", &text, 0.9), source("b.com", &text, 0.9)])
            .unwrap();
        assert_eq!(found.lyrics_status, LyricsStatus::Verified);

        let again = lib.verify_lyrics(&song.id).unwrap();
        assert_eq!(again.lyrics_status, LyricsStatus::Verified);
        assert_eq!(again.final_lyrics, found.final_lyrics);
        assert!(again.lyrics_verified);
    }

    #[test]
    fn test_remove_unknown_id_fails() {
        let repo = MemoryRepo::default();
        let lib = Library::new(&repo);
        assert!(lib.remove("nope").is_err());
        let song = lib.add("https://a", "A", "x").unwrap();
        lib.remove(&song.id).unwrap();
        assert!(lib.list().unwrap().is_empty());
    }
}
