//! SQLite storage for surah and ayah rows.
//!
//! The schema mirrors what the Android client's Room entities expect when
//! the file is bundled as a prepackaged asset: explicit `NOT NULL` primary
//! keys, `index_<table>_<column>` index names, and no foreign keys.
use rusqlite::{Connection, OpenFlags, Result};
use std::path::Path;
use tracing::info;

pub mod models;
pub mod quran;
pub mod verify;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS surah (
    id INTEGER NOT NULL PRIMARY KEY,
    name_simple TEXT NOT NULL,
    name_arabic TEXT NOT NULL,
    revelation_place TEXT NOT NULL,
    verses_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS ayah (
    id INTEGER NOT NULL PRIMARY KEY,
    surah_id INTEGER NOT NULL,
    verse_number INTEGER NOT NULL,
    page_number INTEGER NOT NULL,
    juz_number INTEGER NOT NULL,
    text_uthmani TEXT NOT NULL,
    translation_id TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS index_ayah_surah_id ON ayah(surah_id);
CREATE INDEX IF NOT EXISTS index_ayah_page_number ON ayah(page_number);
CREATE INDEX IF NOT EXISTS index_ayah_juz_number ON ayah(juz_number);
"#;

/// A wrapper around a SQLite connection to the Quran content database.
pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    /// Open (or create) a database at the given path and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Initializing database: {}", path.display());

        let conn = Connection::open(path)?;

        // journal_mode returns the resulting mode as a row
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
        info!("Journal mode: {mode}");

        conn.execute_batch(SCHEMA_SQL)?;

        info!("Database initialized successfully");

        Ok(Self { conn })
    }

    /// Open a database that must already exist. The schema is left untouched.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database connection (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Close the connection, flushing the WAL back into the main file.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_init() {
        let db = Db::open_in_memory().expect("Failed to open in-memory DB");

        let tables: usize = db
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name IN ('surah', 'ayah')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);

        let indexes: usize = db
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='index' AND name LIKE 'index_ayah_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 3);
    }

    #[test]
    fn test_no_foreign_keys() {
        let db = Db::open_in_memory().unwrap();
        let fks: usize = db
            .conn
            .query_row("SELECT count(*) FROM pragma_foreign_key_list('ayah')", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(fks, 0);
    }

    #[test]
    fn test_open_on_disk_uses_wal() {
        let temp = tempfile::tempdir().unwrap();
        let db = Db::open(temp.path().join("quran.db")).unwrap();
        let mode: String = db
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().unwrap();
    }

    #[test]
    fn test_open_existing_requires_file() {
        let temp = tempfile::tempdir().unwrap();
        assert!(Db::open_existing(temp.path().join("missing.db")).is_err());
    }
}
