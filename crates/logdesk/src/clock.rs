//! Source of "today" for day-partitioned lookups.
//!
//! The live file and the retention window both depend on the current date,
//! so the engine reads it through [`Clock`] instead of the system directly.

use chrono::NaiveDate;

use crate::config::Zone;

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    /// Returns today's date in the clock's timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in a configured timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    /// Creates a clock reading the system time in `zone`.
    #[must_use]
    pub const fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        self.zone.today()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
