//! Days command implementation.

use std::io::Write;

use logdesk::LogEngine;

use crate::error::CliError;
use crate::output::{DayList, OutputFormat};

/// Handler for the days command.
pub struct DaysCommand<'a> {
    engine: &'a LogEngine,
}

impl<'a> DaysCommand<'a> {
    /// Creates a new days command handler.
    #[must_use]
    pub const fn new(engine: &'a LogEngine) -> Self {
        Self { engine }
    }

    /// Lists days with files inside the retention window.
    ///
    /// # Errors
    ///
    /// Returns error if writing the output fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        retention: Option<u32>,
    ) -> Result<(), CliError> {
        let list = DayList {
            days: self.engine.list_days(retention),
        };
        format.write(out, &list)
    }
}
