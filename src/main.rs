use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quran_db::api::http::HttpTransport;
use quran_db::api::{ApiClient, RetryPolicy};
use quran_db::config::Config;
use quran_db::db::Db;
use quran_db::db::verify::{Expectations, verify_file};
use quran_db::footnotes;
use quran_db::loader::{LoadSettings, Loader};

#[derive(Parser)]
#[command(name = "quran-db", version, about = "Generate the prepackaged Quran SQLite database")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true, default_value = "quran-db.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all surahs and ayahs and build a fresh database
    Generate {
        /// Output database (overrides `db_path`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// Remove footnote remnants from an existing database and copy it to the app assets
    FixFootnotes {
        /// Database to clean (overrides `db_path`)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Deployment copy (overrides `asset_path`)
        #[arg(long)]
        asset: Option<PathBuf>,

        /// Skip copying to the asset path
        #[arg(long)]
        no_copy: bool,
    },
    /// Check counts and ranges of an existing database
    Verify {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;

    match cli.command {
        Command::Generate {
            output,
            no_progress,
        } => {
            let db_path = output.unwrap_or_else(|| config.db_path.clone());
            generate(&config, &db_path, !no_progress)
        }
        Command::FixFootnotes { db, asset, no_copy } => {
            let db_path = db.unwrap_or_else(|| config.db_path.clone());
            let asset_path = asset.unwrap_or_else(|| config.asset_path.clone());
            fix_footnotes(&db_path, (!no_copy).then_some(asset_path.as_path()))
        }
        Command::Verify { db } => {
            let db_path = db.unwrap_or_else(|| config.db_path.clone());
            verify(&db_path)
        }
    }
}

fn generate(config: &Config, db_path: &Path, show_progress: bool) -> Result<()> {
    remove_previous(db_path)?;

    info!("🚀 Generating {}...", db_path.display());
    info!("   API Base: {}", config.base_url);
    info!("   Translation ID: {}", config.translation_id);

    let transport = HttpTransport::new(config.timeout())?;
    let api = ApiClient::new(transport, &config.base_url, RetryPolicy::from_config(config));

    let mut db = Db::open(db_path).context("Failed to open database")?;
    let mut settings = LoadSettings::from_config(config);
    settings.show_progress = show_progress;

    let summary = Loader::new(&mut db, &api, settings).run()?;
    if !summary.shortfalls.is_empty() {
        info!(
            "{} surahs returned an unexpected number of ayahs",
            summary.shortfalls.len()
        );
    }
    db.close().context("Failed to close database")?;

    verify(db_path)
}

fn fix_footnotes(db_path: &Path, asset_path: Option<&Path>) -> Result<()> {
    let mut db = Db::open_existing(db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    let summary = footnotes::clean_database(&mut db)?;
    println!("Cleaned footnote numbers from {} ayahs", summary.updated);
    for line in footnotes::sample_lines(&db)? {
        println!("{line}");
    }
    db.close().context("Failed to close database")?;

    if let Some(asset_path) = asset_path {
        footnotes::copy_to_assets(db_path, asset_path)?;
        println!("Copied to {}", asset_path.display());
    }
    Ok(())
}

/// Prints the report. Failed checks are warnings, never an error exit.
fn verify(db_path: &Path) -> Result<()> {
    info!("🔍 Verifying database...");
    let report = verify_file(db_path, &Expectations::default())
        .with_context(|| format!("Failed to verify {}", db_path.display()))?;
    println!("{report}");
    Ok(())
}

/// Delete an earlier output together with its WAL side files.
fn remove_previous(db_path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut name = db_path.as_os_str().to_owned();
        name.push(suffix);
        let path = PathBuf::from(name);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            if suffix.is_empty() {
                info!("🗑  Removed old {}", path.display());
            }
        }
    }
    Ok(())
}
