//! CLI error types.

use logdesk::LogError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine rejected or failed the request.
    #[error(transparent)]
    Engine(#[from] LogError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// The blocking worker panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
