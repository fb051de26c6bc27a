//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use logdesk::{LogLevel, SortOrder};

/// Logdesk - query and aggregate rotated log files.
#[derive(Parser, Debug, Clone)]
#[command(name = "logdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML engine config.
    #[arg(short, long, env = "LOGDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log directory, overriding the config file.
    #[arg(short = 'd', long, env = "LOGDESK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List days that have log files, newest first.
    Days {
        /// Look back at most this many days (capped by retention).
        #[arg(short, long)]
        retention: Option<u32>,
    },

    /// Query one day's records.
    Query(QueryArgs),

    /// Show per-hour level counts for a day.
    Stats {
        /// Day to count (YYYY-MM-DD).
        day: String,
    },

    /// Show level counts over recent days.
    Summary {
        /// Number of days to cover (capped by retention).
        #[arg(short = 'n', long)]
        days: Option<u32>,
    },

    /// Download a day's log files.
    Download(DownloadArgs),
}

/// Arguments for the query command.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Day to query (YYYY-MM-DD).
    pub day: String,

    /// Levels to keep (comma-separated, aliases accepted).
    #[arg(short, long, value_delimiter = ',', value_parser = parse_level)]
    pub level: Vec<LogLevel>,

    /// Hour of day to keep (0-23).
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,

    /// Case-sensitive substring a line must contain.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Maximum records per page (clamped to 50..=1000).
    #[arg(long)]
    pub limit: Option<usize>,

    /// Cursor from a previous page.
    #[arg(long, default_value_t = 0)]
    pub cursor: u64,

    /// Result order.
    #[arg(short, long, value_enum, default_value_t = Order::Asc)]
    pub order: Order,

    /// Keep only the last N matches (at most 1000).
    #[arg(short, long)]
    pub tail: Option<usize>,
}

/// Arguments for the download command.
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Day to download (YYYY-MM-DD).
    pub day: String,

    /// Pack every file of the day into one zip archive.
    #[arg(short, long)]
    pub zip: bool,

    /// Destination path; `-` writes to stdout. Defaults to the suggested file name.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Sort order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Order {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => Self::Asc,
            Order::Desc => Self::Desc,
        }
    }
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    s.parse().map_err(|e: logdesk::LogError| e.to_string())
}
