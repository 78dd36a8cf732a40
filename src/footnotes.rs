//! Retrofit pass that removes footnote remnants from an existing database.
//!
//! Uses the same [`text::strip_footnote_remnants`] as the loader, so a
//! database produced before the ingest-time cleanup existed ends up with
//! identical text.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::db::Db;
use crate::db::models::{AyahSample, AyahTranslation};
use crate::text;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub scanned: usize,
    pub updated: usize,
}

/// Strip footnote remnants from every ayah translation. Only rows whose
/// text actually changes are rewritten.
pub fn clean_database(db: &mut Db) -> Result<CleanSummary> {
    let rows = db
        .list_translations()
        .context("failed to read ayah translations")?;

    let updates: Vec<AyahTranslation> = rows
        .iter()
        .filter_map(|row| {
            let cleaned = text::strip_footnote_remnants(&row.translation);
            (cleaned != row.translation.as_str()).then(|| AyahTranslation {
                id: row.id,
                translation: cleaned.into_owned(),
            })
        })
        .collect();

    let updated = db
        .update_translations(&updates)
        .context("failed to update ayah translations")?;
    info!("Cleaned footnote numbers from {updated} ayahs");

    Ok(CleanSummary {
        scanned: rows.len(),
        updated,
    })
}

/// A few translations from surah 2, trimmed to their last 60 characters.
pub fn sample_lines(db: &Db) -> Result<Vec<String>> {
    let samples = db.sample_ayahs(2, 5).context("failed to read samples")?;
    Ok(samples.iter().map(format_sample).collect())
}

fn format_sample(s: &AyahSample) -> String {
    let len = s.translation.chars().count();
    let tail: String = if len > 60 {
        s.translation.chars().skip(len - 60).collect()
    } else {
        s.translation.clone()
    };
    format!("  {}:{} -> ...{tail}", s.surah_id, s.verse_number)
}

/// Copy the database file to the app's asset directory.
pub fn copy_to_assets(db_path: &Path, asset_path: &Path) -> Result<u64> {
    if let Some(parent) = asset_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let bytes = fs::copy(db_path, asset_path).with_context(|| {
        format!(
            "failed to copy {} to {}",
            db_path.display(),
            asset_path.display()
        )
    })?;
    info!("Copied to {}", asset_path.display());
    Ok(bytes)
}
