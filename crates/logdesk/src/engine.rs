//! The engine facade.
//!
//! [`LogEngine`] wires one of each component to a shared [`FileLocator`]
//! and is the entry point a host layer calls into. It holds no mutable
//! state; clones are cheap and every call scans independently.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregate::Aggregator;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::export::{Download, Exporter};
use crate::locator::FileLocator;
use crate::normalize::RecordNormalizer;
use crate::query::QueryPipeline;
use crate::types::{DayStats, FileDescriptor, QueryResult, QuerySpec, Summary};

/// Query, aggregation, and export over one log directory.
#[derive(Debug, Clone)]
pub struct LogEngine {
    config: EngineConfig,
    locator: FileLocator,
    pipeline: QueryPipeline,
    aggregator: Aggregator,
    exporter: Exporter,
}

impl LogEngine {
    /// Creates an engine reading the system clock in the configured zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let clock = Arc::new(SystemClock::new(config.timezone));
        Self::with_clock(config, clock)
    }

    /// Creates an engine with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        if !config.log_dir.is_dir() {
            warn!(dir = %config.log_dir.display(), "log directory does not exist yet");
        }

        let locator = FileLocator::new(&config, clock);
        let normalizer = RecordNormalizer::new(config.timezone);
        let pipeline = QueryPipeline::new(locator.clone(), normalizer, config.max_line_bytes);
        let aggregator = Aggregator::new(locator.clone(), normalizer, config.max_line_bytes);
        let exporter = Exporter::new(locator.clone());

        info!(
            dir = %config.log_dir.display(),
            prefix = %config.file_prefix,
            retention_days = config.retention_days,
            timezone = %config.timezone,
            "log engine ready"
        );

        Ok(Self {
            config,
            locator,
            pipeline,
            aggregator,
            exporter,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Days with files inside the window, newest first.
    ///
    /// `retention_days` defaults to, and is capped by, the configured window.
    #[must_use]
    pub fn list_days(&self, retention_days: Option<u32>) -> Vec<String> {
        self.locator
            .available_days(retention_days.unwrap_or(self.config.retention_days))
    }

    /// The files holding a day's lines.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed or unknown day.
    pub fn files_for_day(&self, day: &str) -> Result<Vec<FileDescriptor>> {
        self.locator.files_for_day(day)
    }

    /// Runs one page of a query.
    ///
    /// # Errors
    ///
    /// See [`QueryPipeline::query`].
    pub fn query(&self, spec: &QuerySpec, cancel: &CancellationToken) -> Result<QueryResult> {
        self.pipeline.query(spec, cancel)
    }

    /// Hourly level counts for a day.
    ///
    /// # Errors
    ///
    /// See [`Aggregator::day_stats`].
    pub fn day_stats(&self, day: &str, cancel: &CancellationToken) -> Result<DayStats> {
        self.aggregator.day_stats(day, cancel)
    }

    /// Level counts over recent days; `days` defaults to the configured span.
    ///
    /// # Errors
    ///
    /// See [`Aggregator::summary`].
    pub fn summary(&self, days: Option<u32>, cancel: &CancellationToken) -> Result<Summary> {
        self.aggregator
            .summary(days.unwrap_or(self.config.summary_days), cancel)
    }

    /// Prepares a download of a day.
    ///
    /// # Errors
    ///
    /// See [`Exporter::download`].
    pub fn download(&self, day: &str, as_zip: bool) -> Result<Download> {
        self.exporter.download(day, as_zip)
    }
}
