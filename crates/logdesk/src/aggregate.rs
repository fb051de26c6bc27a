//! Hourly and multi-day level counts.

use chrono::Days;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::locator::FileLocator;
use crate::normalize::RecordNormalizer;
use crate::scanner::LineScanner;
use crate::types::{format_day, DayStats, FileDescriptor, Summary};

/// Computes [`DayStats`] and [`Summary`] by full scans.
#[derive(Debug, Clone)]
pub struct Aggregator {
    locator: FileLocator,
    normalizer: RecordNormalizer,
    max_line_bytes: usize,
}

impl Aggregator {
    /// Creates an aggregator over the locator's files.
    #[must_use]
    pub const fn new(
        locator: FileLocator,
        normalizer: RecordNormalizer,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            locator,
            normalizer,
            max_line_bytes,
        }
    }

    /// Counts records per hour and level for one day.
    ///
    /// Only records with a resolvable timestamp are counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the day has no files or the scan is cancelled.
    pub fn day_stats(&self, day: &str, cancel: &CancellationToken) -> Result<DayStats> {
        let files = self.locator.files_for_day(day)?;
        self.count(day, files, cancel)
    }

    /// Sums level counts over the last `days` days, capped by retention.
    ///
    /// Days without files, or without any counted record, are left out of
    /// the per-day breakdown.
    ///
    /// # Errors
    ///
    /// Returns an error if a scan is cancelled.
    pub fn summary(&self, days: u32, cancel: &CancellationToken) -> Result<Summary> {
        let window = days.clamp(1, self.locator.retention_days());
        let today = self.locator.today();
        let mut summary = Summary::default();

        for offset in 0..window {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };
            let day = format_day(date);
            let files = match self.locator.files_for_day(&day) {
                Ok(files) => files,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            summary.add_day(&self.count(&day, files, cancel)?);
        }

        debug!(window, total = summary.total, days = summary.by_day.len(), "summary complete");
        Ok(summary)
    }

    fn count(
        &self,
        day: &str,
        files: Vec<FileDescriptor>,
        cancel: &CancellationToken,
    ) -> Result<DayStats> {
        let mut stats = DayStats::empty(day);
        for line in LineScanner::new(files, cancel.clone(), self.max_line_bytes)? {
            let record = self.normalizer.normalize(&line?);
            if let Some(hour) = record.hour() {
                stats.record(hour, record.level);
            }
        }
        debug!(day, total = stats.total(), "day stats complete");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{EngineConfig, Zone};
    use crate::error::LogError;
    use crate::types::{parse_day, LogLevel};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn make_aggregator(today: &str, retention: u32) -> (Aggregator, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let config = EngineConfig::new(dir.path())
            .with_retention_days(retention)
            .with_timezone(Zone::utc());
        let clock = Arc::new(FixedClock(parse_day(today).expect("day")));
        let aggregator = Aggregator::new(
            FileLocator::new(&config, clock),
            RecordNormalizer::new(Zone::utc()),
            config.max_line_bytes,
        );
        (aggregator, dir)
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).expect("write file");
    }

    #[test]
    fn day_stats_buckets_by_hour_and_level() {
        let (aggregator, dir) = make_aggregator("2024-01-02", 7);
        write(
            &dir,
            "app.2024-01-01.log",
            concat!(
                r#"{"level":"error","time":"2024-01-01T03:00:00Z"}"#, "\n",
                r#"{"level":"error","time":"2024-01-01T03:59:59Z"}"#, "\n",
                r#"{"level":"debug","ts":1704078000}"#, "\n",
                "2024-01-01 22:00:01 plain text line\n",
                r#"{"level":"fatal","msg":"no time"}"#, "\n",
            ),
        );

        let stats = aggregator
            .day_stats("2024-01-01", &CancellationToken::new())
            .expect("stats");

        assert_eq!(stats.count(3, LogLevel::Error), 2);
        assert_eq!(stats.count(3, LogLevel::Debug), 1);
        assert_eq!(stats.count(22, LogLevel::Info), 1);
        assert_eq!(stats.level_totals()[&LogLevel::Fatal], 0);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn day_stats_shape_is_full_for_quiet_day() {
        let (aggregator, dir) = make_aggregator("2024-01-01", 7);
        write(&dir, "app.log", "no timestamps here\n");

        let stats = aggregator
            .day_stats("2024-01-01", &CancellationToken::new())
            .expect("stats");
        assert_eq!(stats.stats.len(), 24);
        assert!(stats.stats.values().all(|levels| levels.len() == 6));
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn day_stats_unknown_day() {
        let (aggregator, _dir) = make_aggregator("2024-01-01", 7);
        let result = aggregator.day_stats("2024-01-01", &CancellationToken::new());
        assert!(matches!(result, Err(LogError::DayNotFound(_))));
    }

    #[test]
    fn summary_accumulates_and_omits_empty_days() {
        let (aggregator, dir) = make_aggregator("2024-01-03", 7);
        write(
            &dir,
            "app.log",
            concat!(
                r#"{"level":"warn","time":"2024-01-03T01:00:00Z"}"#, "\n",
                r#"{"level":"info","time":"2024-01-03T02:00:00Z"}"#, "\n",
            ),
        );
        write(&dir, "app.2024-01-02.log", "untimed line\n");
        write(
            &dir,
            "app-2024-01-01T00-00-00.000.log",
            concat!(r#"{"level":"error","time":"2024-01-01T09:00:00Z"}"#, "\n"),
        );

        let summary = aggregator
            .summary(7, &CancellationToken::new())
            .expect("summary");

        assert_eq!(summary.total, 3);
        assert_eq!(summary.levels[&LogLevel::Warn], 1);
        assert_eq!(summary.levels[&LogLevel::Error], 1);
        assert_eq!(summary.levels[&LogLevel::Panic], 0);
        assert_eq!(
            summary.by_day.keys().collect::<Vec<_>>(),
            ["2024-01-01", "2024-01-03"]
        );
    }

    #[test]
    fn summary_window_is_capped_by_retention() {
        let (aggregator, dir) = make_aggregator("2024-01-03", 2);
        write(
            &dir,
            "app.2024-01-01.log",
            concat!(r#"{"level":"error","time":"2024-01-01T09:00:00Z"}"#, "\n"),
        );

        let summary = aggregator
            .summary(30, &CancellationToken::new())
            .expect("summary");
        assert_eq!(summary.total, 0);
        assert!(summary.by_day.is_empty());
    }

    #[test]
    fn summary_is_cancellable() {
        let (aggregator, dir) = make_aggregator("2024-01-01", 7);
        write(&dir, "app.log", "2024-01-01 00:00:00 x\n");
        let token = CancellationToken::new();
        token.cancel();

        let result = aggregator.summary(7, &token);
        assert!(matches!(result, Err(LogError::Cancelled)));
    }
}
