//! Configuration module for the database generator.
//!
//! Handles loading, validating, and providing default configuration values.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_base_url() -> String {
    "https://api.quran.com/api/v4".to_string()
}

fn default_language() -> String {
    "id".to_string()
}

/// Kemenag RI Indonesian translation.
fn default_translation_id() -> u32 {
    33
}

fn default_per_page() -> u32 {
    50
}

fn default_rate_limit_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_secs() -> u64 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_db_path() -> PathBuf {
    PathBuf::from("quran.db")
}

fn default_asset_path() -> PathBuf {
    PathBuf::from("app/src/main/assets/database/quran.db")
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Response language passed to every API call.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_translation_id")]
    pub translation_id: u32,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Delay before every verse page request.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit; attempt `n` waits `n * retry_backoff_secs`.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Deployment copy written by `fix-footnotes`.
    #[serde(default = "default_asset_path")]
    pub asset_path: PathBuf,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            translation_id: default_translation_id(),
            per_page: default_per_page(),
            rate_limit_ms: default_rate_limit_ms(),
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
            timeout_secs: default_timeout_secs(),
            db_path: default_db_path(),
            asset_path: default_asset_path(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults. Invalid JSON is reported and
    /// also falls back to the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {}: {e}", path.display());
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.base_url.trim().is_empty(), "base_url must not be empty");
        anyhow::ensure!(!self.language.trim().is_empty(), "language must not be empty");
        anyhow::ensure!(self.per_page > 0, "per_page must be positive");
        anyhow::ensure!(self.max_retries > 0, "max_retries must be positive");
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be positive");
        Ok(())
    }

    #[must_use]
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
