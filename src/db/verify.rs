//! Post-load verification.
//!
//! Nothing in the schema enforces the shape of the data, so after a load the
//! counts and ranges are compared against the reference values of the
//! standard mushaf. The pass is read-only and purely diagnostic.
use std::fmt;
use std::path::Path;

use rusqlite::{OptionalExtension, Result};

use super::Db;

/// Reference values a complete database must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectations {
    pub surahs: i64,
    pub ayahs: i64,
    pub pages: (i64, i64),
    pub juz: (i64, i64),
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            surahs: 114,
            ayahs: 6236,
            pages: (1, 604),
            juz: (1, 30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseCountMismatch {
    pub surah_id: i64,
    pub name_simple: String,
    pub expected: i64,
    pub actual: i64,
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub expected: Expectations,
    pub surah_count: i64,
    pub ayah_count: i64,
    pub page_range: (Option<i64>, Option<i64>),
    pub juz_range: (Option<i64>, Option<i64>),
    pub first_verse: Option<String>,
    pub last_verse: Option<String>,
    pub sample_translation: Option<String>,
    pub file_size_bytes: Option<u64>,
    pub mismatches: Vec<VerseCountMismatch>,
}

impl VerificationReport {
    pub fn surah_count_ok(&self) -> bool {
        self.surah_count == self.expected.surahs
    }

    pub fn ayah_count_ok(&self) -> bool {
        self.ayah_count == self.expected.ayahs
    }

    pub fn page_range_ok(&self) -> bool {
        range_matches(self.page_range, self.expected.pages)
    }

    pub fn juz_range_ok(&self) -> bool {
        range_matches(self.juz_range, self.expected.juz)
    }

    /// All reference checks pass and every surah has its declared number of ayahs.
    pub fn is_ok(&self) -> bool {
        self.surah_count_ok()
            && self.ayah_count_ok()
            && self.page_range_ok()
            && self.juz_range_ok()
            && self.mismatches.is_empty()
    }
}

fn range_matches(actual: (Option<i64>, Option<i64>), expected: (i64, i64)) -> bool {
    actual == (Some(expected.0), Some(expected.1))
}

fn mark(ok: bool) -> &'static str {
    if ok { "✅" } else { "❌" }
}

fn show(v: Option<i64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn preview(text: Option<&str>, max_chars: usize) -> String {
    match text {
        Some(t) => format!("{}...", t.chars().take(max_chars).collect::<String>()),
        None => "(missing)".to_string(),
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Surah count     : {} {}",
            self.surah_count,
            mark(self.surah_count_ok())
        )?;
        writeln!(
            f,
            "  Ayah count      : {} {}",
            self.ayah_count,
            mark(self.ayah_count_ok())
        )?;
        writeln!(
            f,
            "  Page range      : {} - {} {}",
            show(self.page_range.0),
            show(self.page_range.1),
            mark(self.page_range_ok())
        )?;
        writeln!(
            f,
            "  Juz range       : {} - {} {}",
            show(self.juz_range.0),
            show(self.juz_range.1),
            mark(self.juz_range_ok())
        )?;
        writeln!(f, "  First verse     : {}", preview(self.first_verse.as_deref(), 50))?;
        writeln!(f, "  Last verse (114): {}", preview(self.last_verse.as_deref(), 50))?;
        writeln!(
            f,
            "  Translation (1:1): {}",
            preview(self.sample_translation.as_deref(), 60)
        )?;
        if let Some(bytes) = self.file_size_bytes {
            writeln!(f, "  File size       : {:.2} MB", bytes as f64 / (1024.0 * 1024.0))?;
        }

        if self.mismatches.is_empty() {
            writeln!(
                f,
                "  Verse counts    : All {} surahs match ✅",
                self.surah_count
            )?;
        } else {
            writeln!(f)?;
            writeln!(f, "  ⚠ Verse count mismatches: {}", self.mismatches.len())?;
            for m in &self.mismatches {
                writeln!(
                    f,
                    "    Surah {} ({}): expected {}, got {}",
                    m.surah_id, m.name_simple, m.expected, m.actual
                )?;
            }
        }

        writeln!(f)?;
        if self.is_ok() {
            write!(f, "🎉 Database verified successfully!")
        } else {
            write!(f, "⚠ Database has warnings. Please review above.")
        }
    }
}

/// Verify the database file at `path` and record its size.
pub fn verify_file<P: AsRef<Path>>(path: P, expected: &Expectations) -> Result<VerificationReport> {
    let path = path.as_ref();
    let db = Db::open_existing(path)?;
    let mut report = db.verify(expected)?;
    db.close()?;
    report.file_size_bytes = std::fs::metadata(path).ok().map(|m| m.len());
    Ok(report)
}

impl Db {
    /// Run every verification query against the current contents.
    pub fn verify(&self, expected: &Expectations) -> Result<VerificationReport> {
        let surah_count = self.count_surahs()?;
        let ayah_count = self.count_ayahs()?;

        let page_range: (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(page_number), MAX(page_number) FROM ayah",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let juz_range: (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(juz_number), MAX(juz_number) FROM ayah",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let first_verse: Option<String> = self
            .conn
            .query_row(
                "SELECT text_uthmani FROM ayah WHERE surah_id = 1 AND verse_number = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_verse: Option<String> = self
            .conn
            .query_row(
                "SELECT text_uthmani FROM ayah WHERE surah_id = 114 ORDER BY verse_number DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let sample_translation: Option<String> = self
            .conn
            .query_row(
                "SELECT translation_id FROM ayah WHERE surah_id = 1 AND verse_number = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let mismatches = self.verse_count_mismatches()?;

        Ok(VerificationReport {
            expected: expected.clone(),
            surah_count,
            ayah_count,
            page_range,
            juz_range,
            first_verse,
            last_verse,
            sample_translation,
            file_size_bytes: None,
            mismatches,
        })
    }

    /// Surahs whose stored ayah count differs from `verses_count`.
    pub fn verse_count_mismatches(&self) -> Result<Vec<VerseCountMismatch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.name_simple, s.verses_count, COUNT(a.id) AS actual
            FROM surah s
            LEFT JOIN ayah a ON a.surah_id = s.id
            GROUP BY s.id
            HAVING s.verses_count != actual
            ORDER BY s.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VerseCountMismatch {
                surah_id: row.get(0)?,
                name_simple: row.get(1)?,
                expected: row.get(2)?,
                actual: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}
