//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use logdesk::{DayStats, LogLevel, LogRecord, QueryResult, Summary};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Days that have log files.
#[derive(Debug, Clone, Serialize)]
pub struct DayList {
    /// Days, newest first.
    pub days: Vec<String>,
}

impl TableDisplay for DayList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.days.is_empty() {
            writeln!(writer, "No log files within retention")?;
            return Ok(());
        }
        for day in &self.days {
            writeln!(writer, "{day}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} day(s)", self.days.len())?;
        Ok(())
    }
}

impl TableDisplay for QueryResult {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for record in &self.items {
            write_record(writer, record)?;
        }
        writeln!(writer)?;
        write!(writer, "{} record(s), next cursor {}", self.items.len(), self.next_cursor)?;
        if self.has_more {
            write!(writer, " (more available)")?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

fn write_record<W: Write>(writer: &mut W, record: &LogRecord) -> Result<(), CliError> {
    let time = record
        .timestamp
        .map_or_else(|| "-".to_string(), |ts| ts.to_rfc3339());
    let level = record.raw_level.as_deref().unwrap_or(record.level.as_str());
    write!(writer, "{time:<32}  {level:<5}  {}", record.message.as_deref().unwrap_or(""))?;
    for (key, value) in record.promoted.iter().chain(&record.fields) {
        write!(writer, " {key}={value}")?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_level_header<W: Write>(writer: &mut W, first: &str) -> Result<(), CliError> {
    write!(writer, "{first:<10}")?;
    for level in LogLevel::ALL {
        write!(writer, "  {:>7}", level.as_str())?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", "─".repeat(10 + 9 * LogLevel::ALL.len()))?;
    Ok(())
}

fn write_level_row<W: Write>(
    writer: &mut W,
    label: &str,
    counts: &std::collections::BTreeMap<LogLevel, u64>,
) -> Result<(), CliError> {
    write!(writer, "{label:<10}")?;
    for level in LogLevel::ALL {
        write!(writer, "  {:>7}", counts.get(&level).copied().unwrap_or(0))?;
    }
    writeln!(writer)?;
    Ok(())
}

impl TableDisplay for DayStats {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Hourly Stats for {}", self.day)?;
        writeln!(writer)?;
        write_level_header(writer, "HOUR")?;
        for (hour, counts) in &self.stats {
            write_level_row(writer, &format!("{hour:02}:00"), counts)?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} record(s)", self.total())?;
        Ok(())
    }
}

impl TableDisplay for Summary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.by_day.is_empty() {
            writeln!(writer, "No records in range")?;
            return Ok(());
        }
        write_level_header(writer, "DAY")?;
        for (day, counts) in self.by_day.iter().rev() {
            write_level_row(writer, day, counts)?;
        }
        write_level_row(writer, "TOTAL", &self.levels)?;
        writeln!(writer)?;
        writeln!(writer, "Total: {} record(s)", self.total)?;
        Ok(())
    }
}

/// Result of a download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type of the body.
    pub content_type: String,
    /// Where the body was written.
    pub path: String,
    /// Source bytes copied.
    pub bytes: u64,
}

impl TableDisplay for DownloadReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Downloaded {} ({})", self.file_name, self.content_type)?;
        writeln!(writer, "  Path:   {}", self.path)?;
        writeln!(writer, "  Bytes:  {}", self.bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: Serialize + TableDisplay>(format: Format, value: &T) -> String {
        let mut buf = Vec::new();
        OutputFormat::new(format).write(&mut buf, value).expect("format");
        String::from_utf8(buf).expect("utf-8")
    }

    #[test]
    fn output_format_defaults_to_table() {
        let list = DayList { days: vec![] };
        let mut buf = Vec::new();
        OutputFormat::default().write(&mut buf, &list).expect("format");
        assert_eq!(buf, b"No log files within retention\n");
    }

    #[test]
    fn day_list_table() {
        let list = DayList {
            days: vec!["2024-01-02".into(), "2024-01-01".into()],
        };
        let output = render(Format::Table, &list);
        assert!(output.contains("2024-01-02"));
        assert!(output.contains("Total: 2 day(s)"));
    }

    #[test]
    fn day_list_table_empty() {
        let list = DayList { days: Vec::new() };
        let output = render(Format::Table, &list);
        assert!(output.contains("No log files"));
    }

    #[test]
    fn day_stats_table_has_every_hour() {
        let mut stats = DayStats::empty("2024-01-01");
        stats.record(5, LogLevel::Error);
        let output = render(Format::Table, &stats);
        assert!(output.contains("00:00"));
        assert!(output.contains("23:00"));
        assert!(output.contains("Total: 1 record(s)"));
    }

    #[test]
    fn day_stats_json_shape() {
        let stats = DayStats::empty("2024-01-01");
        let output = render(Format::Json, &stats);
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["day"], "2024-01-01");
        assert_eq!(value["stats"]["0"]["ERROR"], 0);
    }

    #[test]
    fn summary_table_empty() {
        let output = render(Format::Table, &Summary::default());
        assert!(output.contains("No records in range"));
    }

    #[test]
    fn query_result_json_shape() {
        let result = QueryResult {
            day: "2024-01-01".into(),
            items: Vec::new(),
            next_cursor: 0,
            has_more: false,
        };
        let output = render(Format::Json, &result);
        assert!(output.contains("\"next_cursor\": 0"));
        assert!(output.contains("\"has_more\": false"));
    }

    #[test]
    fn download_report_table() {
        let report = DownloadReport {
            file_name: "app-2024-01-01.zip".into(),
            content_type: "application/zip".into(),
            path: "app-2024-01-01.zip".into(),
            bytes: 42,
        };
        let output = render(Format::Table, &report);
        assert!(output.contains("application/zip"));
        assert!(output.contains("Bytes:  42"));
    }
}
