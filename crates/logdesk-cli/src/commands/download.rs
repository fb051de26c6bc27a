//! Download command implementation.
//!
//! Writes a day's export to a file, or to the command output when the path is `-`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use logdesk::LogEngine;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::DownloadArgs;
use crate::error::CliError;
use crate::output::{DownloadReport, OutputFormat};

/// Handler for the download command.
pub struct DownloadCommand<'a> {
    engine: &'a LogEngine,
}

impl<'a> DownloadCommand<'a> {
    /// Creates a new download command handler.
    #[must_use]
    pub const fn new(engine: &'a LogEngine) -> Self {
        Self { engine }
    }

    /// Exports a day and reports where it went.
    ///
    /// # Errors
    ///
    /// Returns error if the day has no files or writing fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &DownloadArgs,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let download = self.engine.download(&args.day, args.zip)?;
        let target = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&download.file_name));

        if target.as_os_str() == "-" {
            download.stream_to(&mut *out, cancel)?;
            return Ok(());
        }

        let file = File::create(&target)?;
        let bytes = match download.write_to(BufWriter::new(file), cancel) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&target);
                return Err(e.into());
            }
        };
        info!(path = %target.display(), bytes, "download written");

        let report = DownloadReport {
            file_name: download.file_name,
            content_type: download.content_type.to_string(),
            path: target.display().to_string(),
            bytes,
        };
        format.write(out, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use logdesk::{EngineConfig, FixedClock};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn make_engine(dir: &TempDir) -> LogEngine {
        let today = "2024-01-01".parse().expect("day");
        let config = EngineConfig::new(dir.path());
        LogEngine::with_clock(config, Arc::new(FixedClock(today))).expect("engine")
    }

    fn parse(args: &[&str]) -> DownloadArgs {
        let mut argv = vec!["logdesk", "download"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Download(args) => args,
            other => panic!("expected download command, got {other:?}"),
        }
    }

    #[test]
    fn download_to_dash_writes_body_to_output() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.log"), "line one\n").expect("write");
        let engine = make_engine(&dir);

        let mut out = Vec::new();
        DownloadCommand::new(&engine)
            .execute(&mut out, &OutputFormat::default(), &parse(&["2024-01-01", "-o", "-"]), &CancellationToken::new())
            .expect("download");
        assert_eq!(out, b"line one\n");
    }

    #[test]
    fn download_zip_to_path_reports_target() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.2024-01-01.log"), "old\n").expect("write");
        fs::write(dir.path().join("app.log"), "new\n").expect("write");
        let engine = make_engine(&dir);
        let target = dir.path().join("out.zip");

        let mut out = Vec::new();
        let args = parse(&["2024-01-01", "--zip", "-o", target.to_str().expect("utf-8 path")]);
        DownloadCommand::new(&engine)
            .execute(&mut out, &OutputFormat::default(), &args, &CancellationToken::new())
            .expect("download");

        let report = String::from_utf8(out).expect("utf-8");
        assert!(report.contains("app-2024-01-01.zip"));
        assert!(report.contains("Bytes:  8"));
        assert!(target.is_file());
    }

    #[test]
    fn download_zip_to_dash_streams_archive() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.2024-01-01.log"), "old\n").expect("write");
        fs::write(dir.path().join("app.log"), "new\n").expect("write");
        let engine = make_engine(&dir);

        let mut out = Vec::new();
        let args = parse(&["2024-01-01", "--zip", "-o", "-"]);
        DownloadCommand::new(&engine)
            .execute(&mut out, &OutputFormat::default(), &args, &CancellationToken::new())
            .expect("download");

        let archive = zip::ZipArchive::new(std::io::Cursor::new(out)).expect("zip body");
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn cancelled_download_leaves_no_file() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.log"), "line\n").expect("write");
        let engine = make_engine(&dir);
        let target = dir.path().join("out.log");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let args = parse(&["2024-01-01", "-o", target.to_str().expect("utf-8 path")]);
        let result = DownloadCommand::new(&engine).execute(&mut Vec::new(), &OutputFormat::default(), &args, &cancel);
        assert!(result.is_err());
        assert!(!target.exists());
    }
}
