//! Mock transport for testing purposes.
//!
//! Serves canned bodies, scripted failures, or a small in-memory copy of the
//! API ([`MockQuran`]) without touching the network.
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use url::Url;

use super::models::{
    ApiChapter, ApiTranslation, ApiVerse, ChaptersResponse, Pagination, VersesResponse,
};
use super::{Transport, TransportError};

type Handler = Box<dyn Fn(&Url) -> Result<String, TransportError> + Send + Sync>;

/// A transport that answers every request through a closure and records
/// the URLs it was asked for.
pub struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<Url>>,
}

impl MockTransport {
    /// Answer every request with `handler`.
    pub fn always<F>(handler: F) -> Self
    where
        F: Fn(&Url) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `failures` requests with a connection error, then
    /// return `body` for every request after that.
    pub fn failing_then(failures: usize, body: &str) -> Self {
        let body = body.to_string();
        let seen = AtomicUsize::new(0);
        Self::always(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) < failures {
                Err(TransportError::Connection("connection reset by peer".to_string()))
            } else {
                Ok(body.clone())
            }
        })
    }

    /// Serve the chapters and paginated verses endpoints from `quran`.
    pub fn serving(quran: MockQuran) -> Self {
        Self::always(move |url| quran.respond(url))
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.clone());
        }
        (self.handler)(url)
    }
}

/// In-memory stand-in for the chapters and verses endpoints.
#[derive(Debug, Clone, Default)]
pub struct MockQuran {
    pub chapters: Vec<ApiChapter>,
    pub verses: HashMap<i64, Vec<ApiVerse>>,
}

impl MockQuran {
    /// Build a dataset with one chapter per entry in `verse_counts`.
    ///
    /// Page and juz numbers are spread evenly over the whole dataset so the
    /// first verse sits on page/juz 1 and the last on `total_pages` /
    /// `total_juz`. Every translation ends in a `<sup>` footnote marker.
    #[must_use]
    pub fn synthetic(verse_counts: &[i64], total_pages: i64, total_juz: i64) -> Self {
        let total_verses: i64 = verse_counts.iter().sum();
        let mut chapters = Vec::with_capacity(verse_counts.len());
        let mut verses = HashMap::new();
        let mut global = 0i64;

        for (idx, &count) in verse_counts.iter().enumerate() {
            let id = idx as i64 + 1;
            chapters.push(ApiChapter {
                id,
                name_simple: format!("Surah {id}"),
                name_arabic: format!("سورة {id}"),
                revelation_place: if id % 2 == 0 { "madinah" } else { "makkah" }.to_string(),
                verses_count: count,
            });

            let list = (1..=count)
                .map(|n| {
                    let position = global;
                    global += 1;
                    ApiVerse {
                        verse_number: n,
                        page_number: 1 + position * total_pages / total_verses.max(1),
                        juz_number: 1 + position * total_juz / total_verses.max(1),
                        text_uthmani: format!("نص {id}:{n}"),
                        translations: vec![ApiTranslation {
                            text: format!(
                                "Terjemahan surah {id} ayat {n} bagi yang bertakwa,<sup foot_note={position}>1</sup>"
                            ),
                        }],
                    }
                })
                .collect();
            verses.insert(id, list);
        }

        Self { chapters, verses }
    }

    /// Route `url` like the real API would.
    pub fn respond(&self, url: &Url) -> Result<String, TransportError> {
        let path = url.path();

        if path.ends_with("/chapters") {
            let body = ChaptersResponse {
                chapters: self.chapters.clone(),
            };
            return serde_json::to_string(&body).map_err(|e| TransportError::Body(e.to_string()));
        }

        let Some(chapter_id) = path
            .rsplit_once("/verses/by_chapter/")
            .and_then(|(_, id)| id.parse::<i64>().ok())
        else {
            return Err(TransportError::Status { status: 404 });
        };

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let per_page: usize = query
            .get("per_page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(10)
            .max(1);

        let all = self.verses.get(&chapter_id).map(Vec::as_slice).unwrap_or(&[]);
        let total_pages = all.len().div_ceil(per_page).max(1);
        let start = (page.saturating_sub(1) * per_page).min(all.len());
        let end = (start + per_page).min(all.len());

        let body = VersesResponse {
            verses: all[start..end].to_vec(),
            pagination: Pagination {
                total_pages: total_pages as u32,
            },
        };
        serde_json::to_string(&body).map_err(|e| TransportError::Body(e.to_string()))
    }
}
