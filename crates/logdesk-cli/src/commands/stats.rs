//! Stats and summary command implementation.

use std::io::Write;

use logdesk::LogEngine;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for the stats and summary commands.
pub struct StatsCommand<'a> {
    engine: &'a LogEngine,
}

impl<'a> StatsCommand<'a> {
    /// Creates a new stats command handler.
    #[must_use]
    pub const fn new(engine: &'a LogEngine) -> Self {
        Self { engine }
    }

    /// Prints per-hour level counts for one day.
    ///
    /// # Errors
    ///
    /// Returns error if the day has no files or the scan is cancelled.
    pub fn day<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        day: &str,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let stats = self.engine.day_stats(day, cancel)?;
        format.write(out, &stats)
    }

    /// Prints level counts over the most recent days.
    ///
    /// # Errors
    ///
    /// Returns error if a scan fails or is cancelled.
    pub fn summary<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        days: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let summary = self.engine.summary(days, cancel)?;
        format.write(out, &summary)
    }
}
