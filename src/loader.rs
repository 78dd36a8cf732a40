//! Fetch → transform → load pipeline.
//!
//! Chapters are fetched in one request and stored in one transaction.
//! Verses are fetched chapter by chapter, page by page, and each chapter's
//! rows are committed together. A fatal fetch error stops the run: later
//! chapters are never attempted, and a rerun rebuilds everything with
//! replace-or-insert.
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::api::models::{ApiChapter, ApiVerse, ChaptersResponse, VersesResponse};
use crate::api::{ApiClient, Transport};
use crate::config::Config;
use crate::db::Db;
use crate::db::models::{Ayah, Surah};
use crate::text;

/// Verse fields requested from the API.
const VERSE_FIELDS: &str = "text_uthmani,page_number,juz_number";

#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub language: String,
    pub translation_id: u32,
    pub per_page: u32,
    /// Sleep before every verse page request.
    pub rate_limit: Duration,
    pub show_progress: bool,
}

impl LoadSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            translation_id: config.translation_id,
            per_page: config.per_page,
            rate_limit: config.rate_limit(),
            show_progress: true,
        }
    }
}

/// Sequential ayah primary keys, assigned in surah-then-verse order.
#[derive(Debug, Default)]
pub struct AyahIdCounter {
    last: i64,
}

impl AyahIdCounter {
    pub fn next_id(&mut self) -> i64 {
        self.last += 1;
        self.last
    }

    #[must_use]
    pub fn last(&self) -> i64 {
        self.last
    }
}

/// A surah whose fetched ayah count differs from its declared count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterShortfall {
    pub surah_id: i64,
    pub expected: i64,
    pub actual: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub surahs: usize,
    pub ayahs: usize,
    pub shortfalls: Vec<ChapterShortfall>,
}

pub struct Loader<'a, T: Transport> {
    pub db: &'a mut Db,
    pub api: &'a ApiClient<T>,
    pub settings: LoadSettings,
}

impl<'a, T: Transport> Loader<'a, T> {
    pub fn new(db: &'a mut Db, api: &'a ApiClient<T>, settings: LoadSettings) -> Self {
        Self { db, api, settings }
    }

    /// Load all surahs, then all of their ayahs.
    pub fn run(&mut self) -> Result<LoadSummary> {
        let chapters = self.load_chapters()?;
        let mut summary = self.load_verses(&chapters)?;
        summary.surahs = chapters.len();
        Ok(summary)
    }

    /// Fetch the chapter list and replace-or-insert every surah row.
    pub fn load_chapters(&mut self) -> Result<Vec<ApiChapter>> {
        info!("📖 Fetching surah metadata...");
        let resp: ChaptersResponse = self
            .api
            .get("chapters", &[("language", self.settings.language.clone())])
            .context("failed to fetch chapter list")?;

        let rows: Vec<Surah> = resp.chapters.iter().map(Surah::from).collect();
        let inserted = self
            .db
            .upsert_surahs(&rows)
            .context("failed to store surahs")?;
        info!("✅ Inserted {inserted} surahs");

        Ok(resp.chapters)
    }

    /// Fetch and store the ayahs of every chapter, in order.
    pub fn load_verses(&mut self, chapters: &[ApiChapter]) -> Result<LoadSummary> {
        info!("📜 Fetching ayah data (this may take a few minutes)...");

        let pb = self.progress_bar(chapters.len() as u64);
        let mut ids = AyahIdCounter::default();
        let mut summary = LoadSummary::default();

        for ch in chapters {
            pb.set_message(ch.name_simple.clone());

            let verses = self
                .fetch_chapter_verses(ch.id)
                .with_context(|| format!("failed to fetch ayahs of surah {}", ch.id))?;
            let rows = to_ayah_rows(ch.id, &verses, &mut ids);
            self.db
                .upsert_ayahs(&rows)
                .with_context(|| format!("failed to store ayahs of surah {}", ch.id))?;
            summary.ayahs += rows.len();

            let label = format!(
                "[{:3}/{}] {} ({} ayat)...",
                ch.id,
                chapters.len(),
                ch.name_simple,
                ch.verses_count
            );
            if rows.len() as i64 == ch.verses_count {
                pb.suspend(|| info!("{label} ✅"));
            } else {
                pb.suspend(|| warn!("{label} ⚠ got {}", rows.len()));
                summary.shortfalls.push(ChapterShortfall {
                    surah_id: ch.id,
                    expected: ch.verses_count,
                    actual: rows.len(),
                });
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!("📊 Total ayahs inserted: {}", summary.ayahs);
        Ok(summary)
    }

    /// Walk every page of `verses/by_chapter/{id}` until `total_pages`.
    pub fn fetch_chapter_verses(&self, chapter_id: i64) -> Result<Vec<ApiVerse>> {
        let endpoint = format!("verses/by_chapter/{chapter_id}");
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            if !self.settings.rate_limit.is_zero() {
                thread::sleep(self.settings.rate_limit);
            }

            let resp: VersesResponse = self.api.get(
                &endpoint,
                &[
                    ("language", self.settings.language.clone()),
                    ("translations", self.settings.translation_id.to_string()),
                    ("fields", VERSE_FIELDS.to_string()),
                    ("per_page", self.settings.per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )?;
            all.extend(resp.verses);

            if page >= resp.pagination.total_pages {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("█▓░"),
        );
        pb
    }
}

/// Flatten one chapter's verses into rows, taking ids from `ids`.
pub fn to_ayah_rows(chapter_id: i64, verses: &[ApiVerse], ids: &mut AyahIdCounter) -> Vec<Ayah> {
    verses
        .iter()
        .map(|v| Ayah {
            id: ids.next_id(),
            surah_id: chapter_id,
            verse_number: v.verse_number,
            page_number: v.page_number,
            juz_number: v.juz_number,
            text_uthmani: v.text_uthmani.clone(),
            translation: v
                .first_translation()
                .map(text::clean_translation)
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use crate::api::mock::{MockQuran, MockTransport};
    use crate::api::models::ApiTranslation;

    fn settings(per_page: u32) -> LoadSettings {
        LoadSettings {
            language: "id".to_string(),
            translation_id: 33,
            per_page,
            rate_limit: Duration::ZERO,
            show_progress: false,
        }
    }

    fn api(quran: MockQuran) -> ApiClient<MockTransport> {
        ApiClient::new(
            MockTransport::serving(quran),
            "https://api.example.test/api/v4",
            RetryPolicy::immediate(3),
        )
    }

    #[test]
    fn test_counter_is_sequential() {
        let mut ids = AyahIdCounter::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_to_ayah_rows_cleans_first_translation() {
        let verses = vec![
            ApiVerse {
                verse_number: 1,
                page_number: 2,
                juz_number: 1,
                text_uthmani: "الٓمٓ".to_string(),
                translations: vec![
                    ApiTranslation {
                        text: "Alif Lām Mīm.<sup foot_note=9>1</sup>".to_string(),
                    },
                    ApiTranslation {
                        text: "ignored".to_string(),
                    },
                ],
            },
            ApiVerse {
                verse_number: 2,
                page_number: 2,
                juz_number: 1,
                text_uthmani: String::new(),
                translations: vec![],
            },
        ];

        let mut ids = AyahIdCounter::default();
        ids.next_id();
        let rows = to_ayah_rows(2, &verses, &mut ids);

        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].translation, "Alif Lām Mīm.");
        assert_eq!(rows[1].id, 3);
        assert_eq!(rows[1].translation, "");
        assert!(rows.iter().all(|r| r.surah_id == 2));
    }

    #[test]
    fn test_fetch_walks_all_pages() {
        let api = api(MockQuran::synthetic(&[7], 1, 1));
        let mut db = Db::open_in_memory().unwrap();
        let loader = Loader::new(&mut db, &api, settings(3));

        let verses = loader.fetch_chapter_verses(1).unwrap();
        assert_eq!(verses.len(), 7);
        assert_eq!(api.transport().call_count(), 3);

        let last = api.transport().calls().pop().unwrap();
        let query = last.query().unwrap_or_default().to_string();
        assert!(query.contains("page=3"));
        assert!(query.contains("translations=33"));
        assert!(query.contains("per_page=3"));
    }

    #[test]
    fn test_run_loads_everything() {
        let api = api(MockQuran::synthetic(&[7, 5, 3], 4, 2));
        let mut db = Db::open_in_memory().unwrap();

        let summary = Loader::new(&mut db, &api, settings(2)).run().unwrap();
        assert_eq!(summary.surahs, 3);
        assert_eq!(summary.ayahs, 15);
        assert!(summary.shortfalls.is_empty());
        assert_eq!(db.count_surahs().unwrap(), 3);
        assert_eq!(db.count_ayahs().unwrap(), 15);
    }

    #[test]
    fn test_shortfall_is_recorded_not_fatal() {
        let mut quran = MockQuran::synthetic(&[4, 4], 2, 1);
        quran.verses.get_mut(&1).unwrap().pop();
        let api = api(quran);
        let mut db = Db::open_in_memory().unwrap();

        let summary = Loader::new(&mut db, &api, settings(50)).run().unwrap();
        assert_eq!(
            summary.shortfalls,
            vec![ChapterShortfall {
                surah_id: 1,
                expected: 4,
                actual: 3,
            }]
        );
        assert_eq!(summary.ayahs, 7);
    }
}
