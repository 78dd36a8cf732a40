use crate::api::models::ApiChapter;

/// A row of the `surah` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Surah {
    pub id: i64,
    pub name_simple: String,
    pub name_arabic: String,
    pub revelation_place: String,
    pub verses_count: i64,
}

impl From<&ApiChapter> for Surah {
    fn from(ch: &ApiChapter) -> Self {
        Self {
            id: ch.id,
            name_simple: ch.name_simple.clone(),
            name_arabic: ch.name_arabic.clone(),
            revelation_place: ch.revelation_place.clone(),
            verses_count: ch.verses_count,
        }
    }
}

/// A row of the `ayah` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Ayah {
    pub id: i64,
    pub surah_id: i64,
    pub verse_number: i64,
    pub page_number: i64,
    pub juz_number: i64,
    pub text_uthmani: String,
    /// Stored in the `translation_id` column.
    pub translation: String,
}

/// Minimal projection used by the footnote pass.
#[derive(Debug, Clone)]
pub struct AyahTranslation {
    pub id: i64,
    pub translation: String,
}

#[derive(Debug, Clone)]
pub struct AyahSample {
    pub surah_id: i64,
    pub verse_number: i64,
    pub translation: String,
}
