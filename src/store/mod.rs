//! Persistent lyrics cache and manual override store.
//!
//! One SQLite connection, opened at process start and injected everywhere as
//! `Arc<Store>`. Methods are blocking; async callers wrap them in
//! `tokio::task::spawn_blocking`. Entries never expire.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::common::errors::StoreError;

pub struct Store {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone)]
pub struct CachedLyrics {
    pub artist: String,
    pub track: String,
    pub source: String,
    pub lyrics_text: String,
}

#[derive(Debug, Clone)]
pub struct ManualLyrics {
    pub artist: String,
    pub track: String,
    pub lyrics_text: String,
}

/// Normalized override key: lowercased `"artist track"`, empty when both
/// parts are empty.
pub fn search_key(artist: &str, track: &str) -> String {
    format!("{} {}", artist, track).trim().to_lowercase()
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS lyrics_cache (
  video_id TEXT PRIMARY KEY,
  video_title TEXT NOT NULL,
  artist TEXT NOT NULL,
  track TEXT NOT NULL,
  source TEXT NOT NULL,
  lyrics_text TEXT NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS manual_lyrics (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  search_key TEXT UNIQUE NOT NULL,
  artist TEXT NOT NULL,
  track TEXT NOT NULL,
  lyrics_text TEXT NOT NULL,
  created_at TEXT NOT NULL
);
"#,
        )?;
        Ok(())
    }

    pub fn cached_lyrics(&self, video_id: &str) -> Result<Option<CachedLyrics>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT artist, track, source, lyrics_text FROM lyrics_cache WHERE video_id=?1",
        )?;
        let mut rows = stmt.query(params![video_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(CachedLyrics {
                artist: row.get(0)?,
                track: row.get(1)?,
                source: row.get(2)?,
                lyrics_text: row.get(3)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Insert-or-update keyed by video id. An update refreshes `updated_at`
    /// and keeps the original `created_at`.
    pub fn save_lyrics(
        &self,
        video_id: &str,
        video_title: &str,
        artist: &str,
        track: &str,
        source: &str,
        lyrics_text: &str,
    ) -> Result<(), StoreError> {
        let now = now_rfc3339();
        self.conn.lock().execute(
            r#"
INSERT INTO lyrics_cache(video_id, video_title, artist, track, source, lyrics_text, created_at, updated_at)
VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
ON CONFLICT(video_id) DO UPDATE SET
  video_title=excluded.video_title,
  artist=excluded.artist,
  track=excluded.track,
  source=excluded.source,
  lyrics_text=excluded.lyrics_text,
  updated_at=excluded.updated_at
"#,
            params![video_id, video_title, artist, track, source, lyrics_text, now],
        )?;
        Ok(())
    }

    /// Exact key match first, then substring.
    pub fn manual_lyrics(&self, key: &str) -> Result<Option<ManualLyrics>, StoreError> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT artist, track, lyrics_text FROM manual_lyrics WHERE search_key=?1",
        )?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Self::manual_from_row(row)?));
        }
        drop(rows);
        drop(stmt);

        let mut stmt = conn.prepare(
            "SELECT artist, track, lyrics_text FROM manual_lyrics WHERE search_key LIKE ?1",
        )?;
        let pattern = format!("%{}%", key);
        let mut rows = stmt.query(params![pattern])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Self::manual_from_row(row)?));
        }
        Ok(None)
    }

    fn manual_from_row(row: &rusqlite::Row<'_>) -> Result<ManualLyrics, StoreError> {
        Ok(ManualLyrics {
            artist: row.get(0)?,
            track: row.get(1)?,
            lyrics_text: row.get(2)?,
        })
    }

    /// Upsert an override keyed by the normalized search key. Returns false
    /// when artist and track are both empty (nothing to key on).
    pub fn save_manual(
        &self,
        artist: &str,
        track: &str,
        lyrics_text: &str,
    ) -> Result<bool, StoreError> {
        let key = search_key(artist, track);
        if key.is_empty() {
            return Ok(false);
        }

        let now = now_rfc3339();
        self.conn.lock().execute(
            r#"
INSERT INTO manual_lyrics(search_key, artist, track, lyrics_text, created_at)
VALUES(?1, ?2, ?3, ?4, ?5)
ON CONFLICT(search_key) DO UPDATE SET
  artist=excluded.artist,
  track=excluded.track,
  lyrics_text=excluded.lyrics_text
"#,
            params![key, artist, track, lyrics_text, now],
        )?;
        Ok(true)
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> Store {
        Store::open(Path::new(":memory:")).expect("open in-memory store")
    }

    #[test]
    fn cache_upsert_is_idempotent_per_key() {
        let store = memory_store();
        store
            .save_lyrics("vid1", "Adele - Hello", "Adele", "Hello", "lrclib", "first")
            .expect("first save");
        store
            .save_lyrics("vid1", "Adele - Hello", "Adele", "Hello", "genius", "second")
            .expect("second save");

        let hit = store
            .cached_lyrics("vid1")
            .expect("lookup")
            .expect("entry present");
        assert_eq!(hit.lyrics_text, "second");
        assert_eq!(hit.source, "genius");

        let count: i64 = {
            let conn = store.conn.lock();
            conn.query_row(
                "SELECT COUNT(*) FROM lyrics_cache WHERE video_id='vid1'",
                [],
                |row| row.get(0),
            )
            .expect("count")
        };
        assert_eq!(count, 1);
    }

    #[test]
    fn cache_miss_is_none() {
        let store = memory_store();
        assert!(store.cached_lyrics("nope").expect("lookup").is_none());
    }

    #[test]
    fn manual_exact_match_before_substring() {
        let store = memory_store();
        store
            .save_manual("Adele", "Hello", "full lyrics")
            .expect("save");

        let exact = store
            .manual_lyrics("adele hello")
            .expect("lookup")
            .expect("exact hit");
        assert_eq!(exact.lyrics_text, "full lyrics");

        // Substring of the stored key still matches.
        let partial = store
            .manual_lyrics("hello")
            .expect("lookup")
            .expect("substring hit");
        assert_eq!(partial.artist, "Adele");
    }

    #[test]
    fn manual_key_is_case_insensitive() {
        let store = memory_store();
        store
            .save_manual("Adele", "Hello", "lyrics")
            .expect("save");
        assert!(
            store
                .manual_lyrics("ADELE HELLO")
                .expect("lookup")
                .is_some()
        );
    }

    #[test]
    fn manual_upsert_replaces_lyrics() {
        let store = memory_store();
        store.save_manual("A", "B", "old").expect("save");
        store.save_manual("A", "B", "new").expect("save");
        let hit = store.manual_lyrics("a b").expect("lookup").expect("hit");
        assert_eq!(hit.lyrics_text, "new");
    }

    #[test]
    fn empty_key_is_rejected() {
        let store = memory_store();
        assert!(!store.save_manual("", "", "lyrics").expect("save"));
        assert!(store.manual_lyrics("").expect("lookup").is_none());
    }

    #[test]
    fn key_normalization() {
        assert_eq!(search_key("Adele", "Hello"), "adele hello");
        assert_eq!(search_key("", "Hello"), "hello");
        assert_eq!(search_key("", ""), "");
    }
}
