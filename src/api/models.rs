//! Response shapes of the Quran.com API v4 endpoints used by the loader.
//!
//! Optional verse fields default the way the database expects: numbers to
//! `0`, text to an empty string.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChaptersResponse {
    pub chapters: Vec<ApiChapter>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiChapter {
    pub id: i64,
    pub name_simple: String,
    pub name_arabic: String,
    /// `"makkah"` or `"madinah"`.
    pub revelation_place: String,
    pub verses_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersesResponse {
    #[serde(default)]
    pub verses: Vec<ApiVerse>,

    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pagination {
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: default_total_pages(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiVerse {
    pub verse_number: i64,

    #[serde(default)]
    pub page_number: i64,

    #[serde(default)]
    pub juz_number: i64,

    #[serde(default)]
    pub text_uthmani: String,

    #[serde(default)]
    pub translations: Vec<ApiTranslation>,
}

impl ApiVerse {
    /// Raw text of the first translation. Only one translation source is
    /// requested, so any further entries are ignored.
    #[must_use]
    pub fn first_translation(&self) -> Option<&str> {
        self.translations.first().map(|t| t.text.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiTranslation {
    #[serde(default)]
    pub text: String,
}
