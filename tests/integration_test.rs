/// End-to-end tests for the generator pipeline.
///
/// Runs the loader against a mock API:
///   Mock API → Loader → DB → Verification → Footnote pass
use quran_db::api::mock::{MockQuran, MockTransport};
use quran_db::api::{ApiClient, ApiError, RetryPolicy, TransportError};
use quran_db::db::Db;
use quran_db::db::models::Ayah;
use quran_db::db::verify::{Expectations, verify_file};
use quran_db::footnotes;
use quran_db::loader::{LoadSettings, Loader};
use quran_db::text;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

const BASE: &str = "https://api.example.test/api/v4";

/// 113 surahs of 55 ayahs and one of 21: 6236 ayahs in total.
fn full_size_counts() -> Vec<i64> {
    let mut counts = vec![55; 113];
    counts.push(21);
    counts
}

fn settings() -> LoadSettings {
    LoadSettings {
        language: "id".to_string(),
        translation_id: 33,
        per_page: 50,
        rate_limit: Duration::ZERO,
        show_progress: false,
    }
}

fn client(transport: MockTransport) -> ApiClient<MockTransport> {
    ApiClient::new(transport, BASE, RetryPolicy::immediate(3))
}

/// Full pipeline: load → verify → reload → verify again → footnote pass
#[test]
fn test_full_pipeline() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("quran.db");

    let api = client(MockTransport::serving(MockQuran::synthetic(
        &full_size_counts(),
        604,
        30,
    )));

    // 1. Load
    let mut db = Db::open(&db_path).unwrap();
    let summary = Loader::new(&mut db, &api, settings()).run().unwrap();
    assert_eq!(summary.surahs, 114);
    assert_eq!(summary.ayahs, 6236);
    assert!(summary.shortfalls.is_empty());
    db.close().unwrap();

    // 2. Verify against the real reference values
    let report = verify_file(&db_path, &Expectations::default()).unwrap();
    assert!(report.is_ok(), "verification failed:\n{report}");
    assert_eq!(report.page_range, (Some(1), Some(604)));
    assert_eq!(report.juz_range, (Some(1), Some(30)));
    assert_eq!(
        report.sample_translation.as_deref(),
        Some("Terjemahan surah 1 ayat 1 bagi yang bertakwa,"),
        "translation should be stripped of markup and footnote digits"
    );

    // 3. Re-run into the same file: replace-or-insert, no duplicates
    let mut db = Db::open(&db_path).unwrap();
    Loader::new(&mut db, &api, settings()).run().unwrap();
    assert_eq!(db.count_surahs().unwrap(), 114);
    assert_eq!(db.count_ayahs().unwrap(), 6236);

    // 4. Ids follow surah-then-verse order
    let all = db.list_translations().unwrap();
    assert_eq!(all.first().map(|a| a.id), Some(1));
    let last = all.last().unwrap();
    assert_eq!(last.id, 6236);
    assert_eq!(last.translation, "Terjemahan surah 114 ayat 21 bagi yang bertakwa,");

    // 5. Footnote pass has nothing left to clean
    let cleaned = footnotes::clean_database(&mut db).unwrap();
    assert_eq!(cleaned.scanned, 6236);
    assert_eq!(cleaned.updated, 0);
    db.close().unwrap();
}

/// A database written without ingest-time cleanup ends up identical after
/// the retrofit pass.
#[test]
fn test_retrofit_matches_ingest_cleanup() {
    let raw = [
        "Alif Lām Mīm.1",
        "Kitab ini tidak ada keraguan padanya; petunjuk bagi mereka yang bertakwa,2",
        "mereka yang menginfakkan3 sebagian rezeki",
        "selama 40 malam",
    ];

    let mut db = Db::open_in_memory().unwrap();
    let rows: Vec<Ayah> = raw
        .iter()
        .enumerate()
        .map(|(i, t)| Ayah {
            id: i as i64 + 1,
            surah_id: 2,
            verse_number: i as i64 + 1,
            page_number: 2,
            juz_number: 1,
            text_uthmani: String::new(),
            translation: t.to_string(),
        })
        .collect();
    db.upsert_ayahs(&rows).unwrap();

    let summary = footnotes::clean_database(&mut db).unwrap();
    assert_eq!(summary.updated, 3);

    let stored = db.list_translations().unwrap();
    for (row, original) in stored.iter().zip(raw) {
        assert_eq!(row.translation, text::clean_translation(original));
    }
}

/// Two failures then success is invisible to the loader.
#[test]
fn test_transient_failures_recovered() {
    let quran = MockQuran::synthetic(&[7, 5], 2, 1);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let transport = MockTransport::always(move |url| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(TransportError::Timeout("operation timed out".to_string()))
        } else {
            quran.respond(url)
        }
    });
    let api = client(transport);

    let mut db = Db::open_in_memory().unwrap();
    let summary = Loader::new(&mut db, &api, settings()).run().unwrap();
    assert_eq!(summary.ayahs, 12);
    // 2 failures + chapters + one page per surah
    assert_eq!(calls.load(Ordering::SeqCst), 2 + 1 + 2);
}

/// A surah that keeps failing aborts the run; later surahs are not attempted.
#[test]
fn test_persistent_failure_aborts_run() {
    let quran = MockQuran::synthetic(&[3, 3, 3], 3, 1);
    let transport = MockTransport::always(move |url| {
        if url.path().ends_with("/by_chapter/2") {
            Err(TransportError::Status { status: 503 })
        } else {
            quran.respond(url)
        }
    });
    let api = client(transport);

    let mut db = Db::open_in_memory().unwrap();
    let err = Loader::new(&mut db, &api, settings()).run().unwrap_err();

    let api_err = err
        .chain()
        .find_map(|e| e.downcast_ref::<ApiError>())
        .expect("ApiError in chain");
    assert!(matches!(
        api_err,
        ApiError::RetriesExhausted { attempts: 3, .. }
    ));

    // Surah 1 was committed before the failure, surah 3 never requested
    assert_eq!(db.count_ayahs().unwrap(), 3);
    assert!(
        !api.transport()
            .calls()
            .iter()
            .any(|u| u.path().ends_with("/by_chapter/3"))
    );
}

/// Verification flags a partial database without failing.
#[test]
fn test_verification_warns_on_partial_load() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("quran.db");

    let api = client(MockTransport::serving(MockQuran::synthetic(
        &[7, 286],
        50,
        3,
    )));
    let mut db = Db::open(&db_path).unwrap();
    Loader::new(&mut db, &api, settings()).run().unwrap();
    db.close().unwrap();

    let report = verify_file(&db_path, &Expectations::default()).unwrap();
    assert!(!report.is_ok());
    assert!(!report.surah_count_ok());
    assert!(report.mismatches.is_empty());
    assert!(report.to_string().contains("❌"));
}
