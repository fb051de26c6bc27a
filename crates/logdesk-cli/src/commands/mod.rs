//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`days`] - Days with log files
//! - [`query`] - Filtered record queries
//! - [`stats`] - Hourly level counts and multi-day summaries
//! - [`download`] - Single-file and zip downloads

pub mod days;
pub mod download;
pub mod query;
pub mod stats;

pub use days::DaysCommand;
pub use download::DownloadCommand;
pub use query::QueryCommand;
pub use stats::StatsCommand;
