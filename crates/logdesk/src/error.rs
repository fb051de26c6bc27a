//! Error types for the log query engine.

use thiserror::Error;

/// Errors that can occur while locating, scanning, or exporting logs.
#[derive(Debug, Error)]
pub enum LogError {
    /// The day string is not a valid `YYYY-MM-DD` date.
    #[error("invalid day: {0}")]
    InvalidDay(String),

    /// No file matches the requested day, or the day is outside retention.
    #[error("no log files for day: {0}")]
    DayNotFound(String),

    /// The scanner was handed an empty file list.
    #[error("no log files to scan")]
    NoFiles,

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid query parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building a zip archive failed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl LogError {
    /// Returns true for errors a host layer should report as "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DayNotFound(_) | Self::NoFiles)
    }

    /// Returns true if the caller gave up.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = LogError::InvalidDay("2024-13-01".to_string());
        assert_eq!(err.to_string(), "invalid day: 2024-13-01");

        let err = LogError::DayNotFound("2024-01-01".to_string());
        assert_eq!(err.to_string(), "no log files for day: 2024-01-01");

        let err = LogError::NoFiles;
        assert_eq!(err.to_string(), "no log files to scan");

        let err = LogError::Cancelled;
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LogError>();
    }

    #[test]
    fn not_found_classification() {
        assert!(LogError::DayNotFound("2024-01-01".to_string()).is_not_found());
        assert!(LogError::NoFiles.is_not_found());
        assert!(!LogError::Cancelled.is_not_found());
        assert!(!LogError::InvalidDay("x".to_string()).is_not_found());
    }

    #[test]
    fn cancelled_is_distinct_from_not_found() {
        let err = LogError::Cancelled;
        assert!(err.is_cancelled());
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LogError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn error_invalid_query() {
        let err = LogError::InvalidQuery("hour out of range: 24".to_string());
        assert_eq!(err.to_string(), "invalid query: hour out of range: 24");
    }
}
