//! End-to-end tests driving the engine over a real log directory.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use logdesk::{
    DownloadSource, EngineConfig, FixedClock, LogEngine, LogError, LogLevel, QuerySpec,
    SortOrder, Zone,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const TODAY: &str = "2024-01-03";

// ==================== Helper Functions ====================

fn make_engine(retention: u32) -> (LogEngine, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let config = EngineConfig::new(dir.path())
        .with_retention_days(retention)
        .with_timezone(Zone::utc());
    let today = chrono::NaiveDate::parse_from_str(TODAY, "%Y-%m-%d").expect("parse day");
    let engine = LogEngine::with_clock(config, Arc::new(FixedClock(today))).expect("engine");
    (engine, dir)
}

fn write_file(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("write log file");
}

fn write_gz(dir: &TempDir, name: &str, content: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).expect("compress");
    let bytes = encoder.finish().expect("finish gzip");
    fs::write(dir.path().join(name), bytes).expect("write gz file");
}

fn timed_lines(day: &str, count: usize) -> String {
    (0..count)
        .map(|i| {
            let level = ["info", "warn", "error"][i % 3];
            format!(
                "{{\"time\":\"{day}T{:02}:00:00Z\",\"level\":\"{level}\",\"msg\":\"r{i}\"}}\n",
                i % 24
            )
        })
        .collect()
}

fn token() -> CancellationToken {
    CancellationToken::new()
}

// ==================== Day Listing Tests ====================

#[test]
fn test_list_days_stays_inside_retention() {
    let (engine, dir) = make_engine(2);
    write_file(&dir, "app.log", "today\n");
    write_file(&dir, "app.2024-01-02.log", "yesterday\n");
    write_file(&dir, "app.2024-01-01.log", "too old\n");

    assert_eq!(engine.list_days(None), ["2024-01-03", "2024-01-02"]);
    assert_eq!(engine.list_days(Some(1)), ["2024-01-03"]);
    assert_eq!(engine.list_days(Some(30)).len(), 2);
}

#[test]
fn test_day_outside_retention_is_not_found() {
    let (engine, dir) = make_engine(2);
    write_file(&dir, "app.2024-01-01.log", "too old\n");

    let err = engine
        .query(&QuerySpec::new("2024-01-01"), &token())
        .expect_err("outside retention");
    assert!(err.is_not_found());
}

#[test]
fn test_malformed_day_is_rejected() {
    let (engine, _dir) = make_engine(7);
    let err = engine
        .query(&QuerySpec::new("01/03/2024"), &token())
        .expect_err("bad day");
    assert!(matches!(err, LogError::InvalidDay(_)));
}

// ==================== Query Tests ====================

#[test]
fn test_level_aliases_normalize_across_files() {
    let (engine, dir) = make_engine(7);
    write_file(
        &dir,
        "app.2024-01-02.log",
        concat!(
            r#"{"level":"INFO","msg":"a"}"#, "\n",
            r#"{"level":"ERROR","msg":"b"}"#, "\n",
            r#"{"level":"warning","msg":"c"}"#, "\n",
        ),
    );

    let spec = QuerySpec::new("2024-01-02").with_levels([LogLevel::Error, LogLevel::Warn]);
    let result = engine.query(&spec, &token()).expect("query");
    let levels: Vec<_> = result.items.iter().map(|r| r.level).collect();
    assert_eq!(levels, [LogLevel::Error, LogLevel::Warn]);
}

#[test]
fn test_epoch_seconds_and_millis_agree() {
    let (engine, dir) = make_engine(7);
    write_file(
        &dir,
        "app.2024-01-02.log",
        "{\"ts\":1700000000000,\"msg\":\"millis\"}\n{\"ts\":1700000000,\"msg\":\"seconds\"}\n",
    );

    let result = engine
        .query(&QuerySpec::new("2024-01-02"), &token())
        .expect("query");
    assert_eq!(result.items.len(), 2);
    assert!(result.items[0].timestamp.is_some());
    assert_eq!(result.items[0].timestamp, result.items[1].timestamp);
}

#[test]
fn test_full_scan_paging_matches_single_scan() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app-2024-01-03T00-00-00.000.log", &timed_lines(TODAY, 90));
    write_gz(&dir, "app-2024-01-03T06-00-00.000.log.gz", &timed_lines(TODAY, 45));
    write_file(&dir, "app.log", &timed_lines(TODAY, 20));

    let mut cursor = 0;
    let mut paged = Vec::new();
    loop {
        let spec = QuerySpec::new(TODAY).with_limit(50).with_cursor(cursor);
        let page = engine.query(&spec, &token()).expect("page");
        paged.extend(page.items);
        cursor = page.next_cursor;
        if !page.has_more {
            break;
        }
    }

    let full = engine
        .query(&QuerySpec::new(TODAY).with_limit(1000), &token())
        .expect("full scan");
    assert_eq!(full.items.len(), 155);
    assert_eq!(paged, full.items);
}

#[test]
fn test_tail_desc_returns_latest_first() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app.log", &timed_lines(TODAY, 5));

    let spec = QuerySpec::new(TODAY)
        .with_tail(2)
        .with_order(SortOrder::Desc);
    let result = engine.query(&spec, &token()).expect("query");
    let messages: Vec<_> = result
        .items
        .iter()
        .filter_map(|r| r.message.as_deref())
        .collect();
    assert_eq!(messages, ["r4", "r3"]);
}

#[test]
fn test_compressed_day_is_queryable() {
    let (engine, dir) = make_engine(7);
    write_gz(&dir, "app.2024-01-02.log.gz", &timed_lines("2024-01-02", 6));

    let spec = QuerySpec::new("2024-01-02").with_level(LogLevel::Error);
    let result = engine.query(&spec, &token()).expect("query");
    assert_eq!(result.items.len(), 2);
}

#[test]
fn test_cancelled_query_fails() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app.log", &timed_lines(TODAY, 5));
    let cancel = token();
    cancel.cancel();

    let err = engine
        .query(&QuerySpec::new(TODAY), &cancel)
        .expect_err("cancelled");
    assert!(err.is_cancelled());
}

// ==================== Aggregation Tests ====================

#[test]
fn test_day_stats_counts_by_hour_and_level() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app.log", &timed_lines(TODAY, 6));
    write_file(&dir, "app.2024-01-03.log", "{\"msg\":\"no timestamp\"}\n");

    let stats = engine.day_stats(TODAY, &token()).expect("stats");
    assert_eq!(stats.stats.len(), 24);
    assert_eq!(stats.total(), 6);
    assert_eq!(stats.count(0, LogLevel::Info), 1);
    assert_eq!(stats.count(2, LogLevel::Error), 1);
    assert_eq!(stats.count(23, LogLevel::Debug), 0);
}

#[test]
fn test_summary_omits_empty_days() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app.log", &timed_lines(TODAY, 3));
    write_file(&dir, "app.2024-01-02.log", "{\"msg\":\"untimed\"}\n");
    write_gz(&dir, "app.2024-01-01.log.gz", &timed_lines("2024-01-01", 6));

    let summary = engine.summary(Some(7), &token()).expect("summary");
    assert_eq!(summary.total, 9);
    assert_eq!(summary.levels[&LogLevel::Error], 3);
    assert_eq!(summary.levels[&LogLevel::Fatal], 0);
    let days: Vec<_> = summary.by_day.keys().cloned().collect();
    assert_eq!(days, ["2024-01-01", "2024-01-03"]);
}

#[test]
fn test_summary_defaults_to_configured_days() {
    let (engine, dir) = make_engine(7);
    write_file(&dir, "app.log", &timed_lines(TODAY, 3));

    let summary = engine.summary(None, &token()).expect("summary");
    assert_eq!(summary.total, 3);
}

// ==================== Export Tests ====================

#[test]
fn test_zip_round_trip_matches_individual_files() {
    let (engine, dir) = make_engine(7);
    let first = timed_lines(TODAY, 4);
    write_file(&dir, "app-2024-01-03T00-00-00.000.log", &first);
    write_gz(&dir, "app-2024-01-03T06-00-00.000.log.gz", &timed_lines(TODAY, 2));
    write_file(&dir, "app.log", "{\"msg\":\"live\"}\n");

    let download = engine.download(TODAY, true).expect("download");
    assert_eq!(download.file_name, "app-2024-01-03.zip");
    assert_eq!(download.content_type, "application/zip");

    let mut buffer = Cursor::new(Vec::new());
    download.write_to(&mut buffer, &token()).expect("write zip");

    let files = engine.files_for_day(TODAY).expect("files");
    let expected: Vec<u8> = files
        .iter()
        .flat_map(|f| fs::read(&f.path).expect("read source"))
        .collect();

    let mut archive = zip::ZipArchive::new(buffer).expect("open zip");
    assert_eq!(archive.len(), files.len());
    let mut actual = Vec::new();
    for (index, file) in files.iter().enumerate() {
        let mut entry = archive.by_index(index).expect("entry");
        assert_eq!(entry.name(), file.file_name());
        entry.read_to_end(&mut actual).expect("read entry");
    }
    assert_eq!(actual, expected);
    assert!(actual.starts_with(first.as_bytes()));
}

#[test]
fn test_single_download_serves_first_file() {
    let (engine, dir) = make_engine(7);
    write_gz(&dir, "app.2024-01-02.log.gz", &timed_lines("2024-01-02", 2));

    let download = engine.download("2024-01-02", true).expect("download");
    assert_eq!(download.file_name, "app.2024-01-02.log.gz");
    assert_eq!(download.content_type, "application/gzip");
    assert_eq!(
        download.source,
        DownloadSource::File(dir.path().join("app.2024-01-02.log.gz"))
    );
}

#[test]
fn test_download_unknown_day_is_not_found() {
    let (engine, _dir) = make_engine(7);
    let err = engine.download("2024-01-02", false).expect_err("no files");
    assert!(err.is_not_found());
}
