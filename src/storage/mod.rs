use crate::library::SongRepository;
use crate::library::song::{Song, parse_songs};
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// Key holding the whole song collection.
pub const SONGS_KEY: &str = "songs";

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let s = Self {
            conn: Connection::open_in_memory().context("open in-memory db")?,
        };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |row| row.get(0))
            .optional()
            .with_context(|| format!("read key {key}"))
    }

    pub fn set(&self, key: &str, value: &str, now_unix: i64) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO kv(key, value, updated_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value=excluded.value,
  updated_at=excluded.updated_at
"#,
                params![key, value, now_unix],
            )
            .with_context(|| format!("write key {key}"))?;
        Ok(())
    }
}

impl SongRepository for Storage {
    fn load_all(&self) -> anyhow::Result<Vec<Song>> {
        match self.get(SONGS_KEY)? {
            Some(raw) => parse_songs(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, songs: &[Song]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(songs).context("encode song collection")?;
        self.set(SONGS_KEY, &raw, crate::library::song::now_unix())?;
        tracing::debug!(count = songs.len(), "library saved");
        Ok(())
    }
}

// Simple way to use rusqlite from async tasks: open per-operation.
#[derive(Debug, Clone)]
pub struct StorageHandle {
    path: PathBuf,
}

impl StorageHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> anyhow::Result<Storage> {
        Storage::open(&self.path)
    }
}

impl SongRepository for StorageHandle {
    fn load_all(&self) -> anyhow::Result<Vec<Song>> {
        self.open()?.load_all()
    }

    fn save_all(&self, songs: &[Song]) -> anyhow::Result<()> {
        self.open()?.save_all(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_nothing() {
        let s = Storage::in_memory().unwrap();
        assert!(s.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_all_overwrites_collection() {
        let s = Storage::in_memory().unwrap();
        let a = Song::new("https://a", "A", "x", 1);
        let b = Song::new("https://b", "B", "y", 2);
        s.save_all(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(s.load_all().unwrap().len(), 2);

        s.save_all(&[b.clone()]).unwrap();
        let loaded = s.load_all().unwrap();
        assert_eq!(loaded, vec![b]);
    }

    #[test]
    fn test_kv_roundtrip() {
        let s = Storage::in_memory().unwrap();
        assert!(s.get("k").unwrap().is_none());
        s.set("k", "v1", 1).unwrap();
        s.set("k", "v2", 2).unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_handle_reopens_file() {
        let path = std::env::temp_dir().join(format!("karaoke-storage-{}.sqlite3", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let handle = StorageHandle::new(path.clone());
        handle.save_all(&[Song::new("https://a", "A", "x", 1)]).unwrap();
        assert_eq!(handle.load_all().unwrap().len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
