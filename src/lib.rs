//! # quran-db — Quran content database generator
//!
//! Builds the SQLite database that the Android app ships as a prepackaged
//! asset, using data from the Quran.com API v4.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, and defaults
//! - **[`api`]** — API client with retry and linear backoff, response models, mock transport
//! - **[`db`]** — SQLite schema, surah/ayah writes, and the verification pass
//! - **[`loader`]** — Sequential chapter and verse loading
//! - **[`text`]** — HTML and footnote-remnant cleanup of translation text
//! - **[`footnotes`]** — Footnote cleanup over an existing database and asset copy

pub mod api;
pub mod config;
pub mod db;
pub mod footnotes;
pub mod loader;
pub mod text;
