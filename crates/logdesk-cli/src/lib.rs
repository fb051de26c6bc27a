//! # logdesk-cli
//!
//! Command-line front end for the [`logdesk`] engine.
//!
//! Provides commands for:
//! - Listing the days that have log files
//! - Querying a day with level, hour, and substring filters
//! - Hourly statistics and multi-day summaries
//! - Downloading a day as a single file or a zip archive
//!
//! # Architecture
//!
//! The CLI builds a [`logdesk::LogEngine`] from a TOML config file and
//! flag overrides, then runs one blocking engine call per invocation.
//!
//! ```text
//! ┌──────────────┐   EngineConfig    ┌──────────────┐   files   ┌──────────┐
//! │ logdesk-cli  │──────────────────►│  LogEngine   │──────────►│ log dir  │
//! └──────────────┘                   └──────────────┘           └──────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, QueryArgs};
pub use error::CliError;
pub use output::OutputFormat;
