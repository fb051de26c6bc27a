//! Day-partitioned file discovery.
//!
//! The external writer leaves a day's lines in up to three kinds of file:
//!
//! - `<prefix>.<YYYY-MM-DD>.log` and its `.gz` counterpart (daily rotation)
//! - `<prefix>-<rotation timestamp>.log[.gz]` whose name contains the day
//!   as `YYYY-MM-DD` or `YYYY_MM_DD` (size/time rotation)
//! - `<prefix>.log`, the file currently being written, which belongs to today
//!
//! [`FileLocator`] unions all three and orders them by file name.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{LogError, Result};
use crate::types::{format_day, parse_day, FileDescriptor, NamingScheme};

/// Finds the files that hold a day's log lines.
#[derive(Clone)]
pub struct FileLocator {
    log_dir: PathBuf,
    prefix: String,
    retention_days: u32,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLocator")
            .field("log_dir", &self.log_dir)
            .field("prefix", &self.prefix)
            .field("retention_days", &self.retention_days)
            .finish_non_exhaustive()
    }
}

impl FileLocator {
    /// Creates a locator for the configured directory.
    #[must_use]
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            prefix: config.file_prefix.clone(),
            retention_days: config.retention_days,
            clock,
        }
    }

    /// The directory being searched.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The shared file name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The configured retention window in days.
    #[must_use]
    pub const fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Today's date according to the locator's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Returns true if `date` is one of the last `retention_days` days.
    #[must_use]
    pub fn is_within_retention(&self, date: NaiveDate) -> bool {
        let today = self.today();
        let age = (today - date).num_days();
        age >= 0 && age < i64::from(self.retention_days)
    }

    /// Returns the files holding `day`'s lines, ordered by file name.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidDay`] for a malformed day and
    /// [`LogError::DayNotFound`] if the day is outside retention or no file
    /// matches it.
    pub fn files_for_day(&self, day: &str) -> Result<Vec<FileDescriptor>> {
        let date = parse_day(day)?;
        if !self.is_within_retention(date) {
            debug!(day, retention_days = self.retention_days, "day outside retention window");
            return Err(LogError::DayNotFound(day.to_string()));
        }

        let mut found: BTreeMap<String, FileDescriptor> = BTreeMap::new();
        let candidates = self
            .daily_rotated(date)
            .into_iter()
            .chain(self.timestamp_rotated(date))
            .chain(self.live_current(date));
        for file in candidates {
            found.entry(file.file_name()).or_insert(file);
        }

        if found.is_empty() {
            return Err(LogError::DayNotFound(day.to_string()));
        }

        let files: Vec<FileDescriptor> = found.into_values().collect();
        debug!(day, count = files.len(), "located log files");
        Ok(files)
    }

    /// Lists days inside the retention window that have files, newest first.
    ///
    /// `retention_days` is capped by the configured window.
    #[must_use]
    pub fn available_days(&self, retention_days: u32) -> Vec<String> {
        let window = retention_days.min(self.retention_days);
        let today = self.today();

        (0..window)
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(format_day)
            .filter(|day| self.files_for_day(day).is_ok())
            .collect()
    }

    fn daily_rotated(&self, date: NaiveDate) -> Vec<FileDescriptor> {
        let day = format_day(date);
        let plain = format!("{}.{day}.log", self.prefix);
        let compressed = format!("{plain}.gz");

        [plain, compressed]
            .into_iter()
            .map(|name| self.log_dir.join(name))
            .filter(|path| path.is_file())
            .map(|path| FileDescriptor {
                compressed: is_compressed(&path),
                path,
                day: date,
                scheme: NamingScheme::DailyRotated,
            })
            .collect()
    }

    fn timestamp_rotated(&self, date: NaiveDate) -> Vec<FileDescriptor> {
        let dashed = format_day(date);
        let underscored = dashed.replace('-', "_");
        let rotation_prefix = format!("{}-", self.prefix);

        let entries = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.log_dir.display(), error = %e, "cannot read log directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    return false;
                };
                name.starts_with(&rotation_prefix)
                    && (name.contains(&dashed) || name.contains(&underscored))
                    && (name.ends_with(".log") || name.ends_with(".gz"))
            })
            .filter(|path| path.is_file())
            .map(|path| FileDescriptor {
                compressed: is_compressed(&path),
                path,
                day: date,
                scheme: NamingScheme::TimestampRotated,
            })
            .collect()
    }

    fn live_current(&self, date: NaiveDate) -> Option<FileDescriptor> {
        if date != self.today() {
            return None;
        }
        let path = self.log_dir.join(format!("{}.log", self.prefix));
        path.is_file().then(|| FileDescriptor {
            path,
            day: date,
            compressed: false,
            scheme: NamingScheme::LiveCurrent,
        })
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
