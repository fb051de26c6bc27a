//! # logdesk
//!
//! Query and aggregation engine for rotated structured log files.
//!
//! An external writer appends JSON lines to files in a log directory and
//! rotates them by day or by size, optionally gzip-compressing old files.
//! This crate reads them back, one calendar day at a time, without an index.
//!
//! This crate provides:
//!
//! - [`FileLocator`] — Finds a day's files across three naming schemes
//! - [`LineScanner`] — Lazily streams bounded lines with cancellation
//! - [`RecordNormalizer`] — Turns raw lines into [`LogRecord`]s
//! - [`QueryPipeline`] — Filtered, raw-offset paginated queries
//! - [`Aggregator`] — Hourly [`DayStats`] and multi-day [`Summary`]
//! - [`Exporter`] — Single-file or zip [`Download`]s
//! - [`LogEngine`] — Facade wiring all of the above to an [`EngineConfig`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use logdesk::{EngineConfig, LogEngine, LogLevel, QuerySpec, SortOrder};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = LogEngine::new(EngineConfig::new("/var/log/site"))?;
//! let spec = QuerySpec::new("2024-01-01")
//!     .with_level(LogLevel::Error)
//!     .with_order(SortOrder::Desc)
//!     .with_tail(20);
//! let page = engine.query(&spec, &CancellationToken::new())?;
//! println!("{} errors, next cursor {}", page.items.len(), page.next_cursor);
//! # Ok::<(), logdesk::LogError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod locator;
pub mod normalize;
pub mod query;
pub mod scanner;
pub mod types;

// Re-export main types
pub use aggregate::Aggregator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, Zone};
pub use engine::LogEngine;
pub use error::{LogError, Result};
pub use export::{Download, DownloadSource, Exporter};
pub use locator::FileLocator;
pub use normalize::{LevelName, RecordNormalizer};
pub use query::QueryPipeline;
pub use scanner::LineScanner;
pub use types::{
    DayStats, FileDescriptor, LogLevel, LogRecord, NamingScheme, QueryResult, QuerySpec,
    SortOrder, Summary,
};
