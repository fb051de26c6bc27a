//! Core types for the log query engine.
//!
//! This module provides:
//! - [`LogLevel`] — The six canonical severities
//! - [`LogRecord`] — One normalized log line
//! - [`QuerySpec`] / [`QueryResult`] — Paginated query input and output
//! - [`DayStats`] / [`Summary`] — Aggregates
//! - [`FileDescriptor`] — A located log file

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LogError, Result};
use crate::normalize::{level_from_text, LevelName};

/// Format of a day partition key.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Smallest page size a query may request.
pub const MIN_LIMIT: usize = 50;

/// Largest page size a query may request.
pub const MAX_LIMIT: usize = 1000;

/// Page size used when none is given.
pub const DEFAULT_LIMIT: usize = 200;

/// Largest accepted tail.
pub const MAX_TAIL: usize = 1000;

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Parses a `YYYY-MM-DD` day string.
///
/// # Errors
///
/// Returns [`LogError::InvalidDay`] if the string is not a calendar date in
/// exactly that form.
pub fn parse_day(day: &str) -> Result<NaiveDate> {
    if day.len() != 10 {
        return Err(LogError::InvalidDay(day.to_string()));
    }
    NaiveDate::parse_from_str(day, DAY_FORMAT).map_err(|_| LogError::InvalidDay(day.to_string()))
}

/// Formats a date as a day partition key.
#[must_use]
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Canonical log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning conditions
    Warn,
    /// Error conditions
    Error,
    /// Panics that were recovered
    Panic,
    /// Unrecoverable failures
    Fatal,
}

impl LogLevel {
    /// All levels in severity order.
    pub const ALL: [Self; 6] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Panic,
        Self::Fatal,
    ];

    /// Returns the uppercase name of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Panic => "PANIC",
            Self::Fatal => "FATAL",
        }
    }

    /// A level → count map with every level present at zero.
    #[must_use]
    pub fn zeroed_counts() -> BTreeMap<Self, u64> {
        Self::ALL.into_iter().map(|level| (level, 0)).collect()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    /// Parses level text using the same alias table as record normalization.
    fn from_str(s: &str) -> Result<Self> {
        match level_from_text(s) {
            LevelName::Canonical(level) => Ok(level),
            LevelName::Other(other) => Err(LogError::InvalidQuery(format!("unknown level: {other}"))),
        }
    }
}

/// Sort direction of query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// File order, oldest first.
    #[default]
    Asc,
    /// Reverse file order, newest first.
    Desc,
}

impl FromStr for SortOrder {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(LogError::InvalidQuery(format!("unknown order: {other}"))),
        }
    }
}

/// Naming convention a log file was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `<prefix>.<YYYY-MM-DD>.log[.gz]`
    DailyRotated,
    /// `<prefix>-<rotation timestamp>.log[.gz]`
    TimestampRotated,
    /// The always-open `<prefix>.log`.
    LiveCurrent,
}

/// A log file that belongs to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    /// Full path to the file.
    pub path: PathBuf,
    /// The day the file was located for.
    pub day: NaiveDate,
    /// Whether the file is gzip-compressed.
    pub compressed: bool,
    /// Which naming convention matched.
    pub scheme: NamingScheme,
}

impl FileDescriptor {
    /// Returns the file's base name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A normalized log line.
///
/// Built fresh for every scanned line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// When the line was written, if any encoding of it could be resolved.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Canonical severity.
    pub level: LogLevel,
    /// Unrecognized level text, uppercased, when `level` fell back to INFO.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_level: Option<String>,
    /// The log message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Well-known request fields lifted to top level.
    #[serde(flatten)]
    pub promoted: Map<String, Value>,
    /// All other decoded fields, in line order.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Hour of day in the timestamp's own offset.
    #[must_use]
    pub fn hour(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.hour())
    }

    /// Looks up a key among promoted and ordinary fields.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.promoted.get(key).or_else(|| self.fields.get(key))
    }
}

/// A filtered, paginated query over one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Day partition key (`YYYY-MM-DD`).
    pub day: String,
    /// Levels to keep (empty means all).
    #[serde(default)]
    pub levels: BTreeSet<LogLevel>,
    /// Hour of day to keep.
    pub hour: Option<u32>,
    /// Raw substring a line must contain.
    pub search: Option<String>,
    /// Raw lines to skip before matching.
    #[serde(default)]
    pub cursor: u64,
    /// Maximum matches to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Result ordering.
    #[serde(default)]
    pub order: SortOrder,
    /// Keep only the most recent N matches after ordering.
    pub tail: Option<usize>,
}

impl QuerySpec {
    /// Creates an unfiltered query for `day`.
    #[must_use]
    pub fn new(day: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            levels: BTreeSet::new(),
            hour: None,
            search: None,
            cursor: 0,
            limit: DEFAULT_LIMIT,
            order: SortOrder::Asc,
            tail: None,
        }
    }

    /// Adds a level filter.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.levels.insert(level);
        self
    }

    /// Adds several level filters.
    #[must_use]
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    /// Restricts results to one hour of the day.
    #[must_use]
    pub const fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Adds a raw substring filter. Empty text is ignored.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = (!text.is_empty()).then_some(text);
        self
    }

    /// Sets the resume cursor.
    #[must_use]
    pub const fn with_cursor(mut self, cursor: u64) -> Self {
        self.cursor = cursor;
        self
    }

    /// Sets the page size, clamped to `[MIN_LIMIT, MAX_LIMIT]`.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(MIN_LIMIT, MAX_LIMIT);
        self
    }

    /// Sets the result ordering.
    #[must_use]
    pub const fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the tail size. Zero clears it; values above `MAX_TAIL` are clamped.
    #[must_use]
    pub fn with_tail(mut self, tail: usize) -> Self {
        self.tail = (tail > 0).then(|| tail.min(MAX_TAIL));
        self
    }

    /// Applies the builder rules to a spec built or deserialized directly:
    /// limit clamped, zero tail cleared, large tail capped, empty search
    /// dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(MIN_LIMIT, MAX_LIMIT);
        self.tail = self.tail.filter(|&t| t > 0).map(|t| t.min(MAX_TAIL));
        self.search = self.search.filter(|s| !s.is_empty());
        self
    }

    /// Checks the day format and hour range.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed day or an hour above 23.
    pub fn validate(&self) -> Result<NaiveDate> {
        let date = parse_day(&self.day)?;
        if let Some(hour) = self.hour {
            if hour > 23 {
                return Err(LogError::InvalidQuery(format!("hour out of range: {hour}")));
            }
        }
        Ok(date)
    }

    /// Checks a record against the level and hour filters.
    ///
    /// Records without a timestamp are not excluded by the hour filter.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        if !self.levels.is_empty() && !self.levels.contains(&record.level) {
            return false;
        }
        match (self.hour, record.hour()) {
            (Some(wanted), Some(hour)) => wanted == hour,
            _ => true,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// The day that was queried.
    pub day: String,
    /// Matching records, ordered and tailed.
    pub items: Vec<LogRecord>,
    /// Cursor to pass to the next query.
    pub next_cursor: u64,
    /// True when the page filled up; may be wrong at an exact boundary.
    pub has_more: bool,
}

/// Per-hour, per-level counts for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStats {
    /// The day the stats cover.
    pub day: String,
    /// hour → level → count, all 24 × 6 cells present.
    pub stats: BTreeMap<u32, BTreeMap<LogLevel, u64>>,
}

impl DayStats {
    /// Creates zero-filled stats for `day`.
    #[must_use]
    pub fn empty(day: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            stats: (0..24).map(|hour| (hour, LogLevel::zeroed_counts())).collect(),
        }
    }

    /// Counts one record at `hour`.
    pub fn record(&mut self, hour: u32, level: LogLevel) {
        if let Some(count) = self.stats.get_mut(&hour).and_then(|levels| levels.get_mut(&level)) {
            *count += 1;
        }
    }

    /// Count for one cell.
    #[must_use]
    pub fn count(&self, hour: u32, level: LogLevel) -> u64 {
        self.stats
            .get(&hour)
            .and_then(|levels| levels.get(&level))
            .copied()
            .unwrap_or(0)
    }

    /// Per-level totals across all hours.
    #[must_use]
    pub fn level_totals(&self) -> BTreeMap<LogLevel, u64> {
        let mut totals = LogLevel::zeroed_counts();
        for levels in self.stats.values() {
            for (level, count) in levels {
                *totals.entry(*level).or_insert(0) += count;
            }
        }
        totals
    }

    /// Total records counted.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.stats.values().flat_map(BTreeMap::values).sum()
    }
}

/// Level counts over the most recent days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Records counted across all days.
    pub total: u64,
    /// Per-level totals, all six levels present.
    pub levels: BTreeMap<LogLevel, u64>,
    /// Per-day breakdown; days with no records are omitted.
    pub by_day: BTreeMap<String, BTreeMap<LogLevel, u64>>,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            total: 0,
            levels: LogLevel::zeroed_counts(),
            by_day: BTreeMap::new(),
        }
    }
}

impl Summary {
    /// Folds one day's stats into the summary.
    pub fn add_day(&mut self, stats: &DayStats) {
        let day_total = stats.total();
        if day_total == 0 {
            return;
        }
        let day_levels = stats.level_totals();
        for (level, count) in &day_levels {
            *self.levels.entry(*level).or_insert(0) += count;
        }
        self.total += day_total;
        self.by_day.insert(stats.day.clone(), day_levels);
    }
}
