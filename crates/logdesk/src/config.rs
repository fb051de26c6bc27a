//! Engine configuration.
//!
//! Configuration for the log query engine, including:
//! - Log directory and file name prefix
//! - Retention window
//! - Per-line memory bound
//! - Timezone used for "today" and for naive timestamps

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Default maximum length of a single log line (8 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Smallest accepted line bound.
const MIN_MAX_LINE_BYTES: usize = 1024;

/// Longest accepted retention window in days.
const MAX_RETENTION_DAYS: u32 = 366;

/// Timezone in which days and naive timestamps are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Zone {
    /// The host's local timezone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl Zone {
    /// UTC as a fixed zone.
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Today's calendar date in this zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::Local => Local::now().date_naive(),
            Self::Fixed(offset) => Utc::now().with_timezone(offset).date_naive(),
        }
    }

    /// Interprets a wall-clock time in this zone.
    #[must_use]
    pub fn from_naive(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Self::Fixed(offset) => offset.from_local_datetime(naive).single(),
        }
    }

    /// Converts milliseconds since the Unix epoch into this zone.
    #[must_use]
    pub fn from_unix_millis(&self, millis: i64) -> Option<DateTime<FixedOffset>> {
        let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
        Some(match self {
            Self::Local => utc.with_timezone(&Local).fixed_offset(),
            Self::Fixed(offset) => utc.with_timezone(offset),
        })
    }

    fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Some(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Some(Self::utc());
        }

        let (sign, rest) = match trimmed.as_bytes().first()? {
            b'+' => (1, &trimmed[1..]),
            b'-' => (-1, &trimmed[1..]),
            _ => return None,
        };
        if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return None;
        }
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => rest.split_at(2),
            None => (rest, "0"),
        };
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(Self::Fixed)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Fixed(offset) if offset.local_minus_utc() == 0 => write!(f, "UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl TryFrom<String> for Zone {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unrecognized timezone: {value}"))
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.to_string()
    }
}

/// Configuration for the log query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory the external writer rotates files into.
    pub log_dir: PathBuf,
    /// Base name shared by every log file, e.g. `app` for `app.log`.
    pub file_prefix: String,
    /// Number of most recent days that are queryable.
    pub retention_days: u32,
    /// Upper bound on a single line; longer lines are skipped.
    pub max_line_bytes: usize,
    /// Default number of days covered by a summary.
    pub summary_days: u32,
    /// Timezone for "today" and for timestamps without an offset.
    pub timezone: Zone,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            file_prefix: "app".to_string(),
            retention_days: 7,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            summary_days: 7,
            timezone: Zone::Local,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with the given log directory.
    #[must_use]
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LogError::Config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| LogError::Config(format!("invalid TOML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(LogError::Config("log_dir cannot be empty".to_string()));
        }

        if self.file_prefix.is_empty() {
            return Err(LogError::Config("file_prefix cannot be empty".to_string()));
        }

        if self.file_prefix.contains(['/', '\\']) {
            return Err(LogError::Config(
                "file_prefix must not contain path separators".to_string(),
            ));
        }

        if self.retention_days == 0 || self.retention_days > MAX_RETENTION_DAYS {
            return Err(LogError::Config(format!(
                "retention_days must be between 1 and {MAX_RETENTION_DAYS}"
            )));
        }

        if self.max_line_bytes < MIN_MAX_LINE_BYTES {
            return Err(LogError::Config(format!(
                "max_line_bytes must be at least {MIN_MAX_LINE_BYTES}"
            )));
        }

        if self.summary_days == 0 {
            return Err(LogError::Config(
                "summary_days must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Sets the file prefix.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Sets the retention window in days.
    #[must_use]
    pub const fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Sets the per-line memory bound.
    #[must_use]
    pub const fn with_max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    /// Sets the default summary span.
    #[must_use]
    pub const fn with_summary_days(mut self, days: u32) -> Self {
        self.summary_days = days;
        self
    }

    /// Sets the timezone.
    #[must_use]
    pub const fn with_timezone(mut self, zone: Zone) -> Self {
        self.timezone = zone;
        self
    }
}
