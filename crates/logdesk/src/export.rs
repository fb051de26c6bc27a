//! Bulk download of a day's files.
//!
//! A day is exported either as its first file, byte for byte, or as a zip
//! archive holding every file of the day under its original name. Files are
//! copied verbatim; compressed files stay compressed inside the archive.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{LogError, Result};
use crate::locator::FileLocator;
use crate::types::FileDescriptor;

/// Content type of a zip archive.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Content type of a gzip file.
pub const GZIP_CONTENT_TYPE: &str = "application/gzip";

/// Content type of a plain log file.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// What a download writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// One file served as-is.
    File(PathBuf),
    /// Several files packed into a zip archive, in order.
    Zip(Vec<PathBuf>),
}

/// A prepared download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name for the client.
    pub file_name: String,
    /// MIME type of the body.
    pub content_type: &'static str,
    /// Where the body comes from.
    pub source: DownloadSource,
}

impl Download {
    /// Value for a `Content-Disposition` header.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name.replace('"', ""))
    }

    /// Writes the body to a seekable `out`, returning the number of source
    /// bytes copied.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, the archive cannot be
    /// written, or `cancel` fires between files.
    pub fn write_to<W: Write + Seek>(&self, out: W, cancel: &CancellationToken) -> Result<u64> {
        match &self.source {
            DownloadSource::File(path) => copy_file(path, out, cancel),
            DownloadSource::Zip(paths) => write_zip(paths, out, cancel),
        }
    }

    /// Streams the body to any writer, such as stdout or a response body.
    ///
    /// A single file is copied straight through. An archive is built in an
    /// anonymous temporary file and then copied, so memory use stays bounded
    /// by the copy buffer either way.
    ///
    /// # Errors
    ///
    /// Same as [`Download::write_to`], plus failure to create the spool file.
    pub fn stream_to<W: Write>(&self, out: W, cancel: &CancellationToken) -> Result<u64> {
        match &self.source {
            DownloadSource::File(path) => copy_file(path, out, cancel),
            DownloadSource::Zip(paths) => {
                let mut spool = tempfile::tempfile()?;
                let copied = write_zip(paths, &mut spool, cancel)?;
                if cancel.is_cancelled() {
                    return Err(LogError::Cancelled);
                }
                spool.seek(SeekFrom::Start(0))?;
                let mut out = out;
                io::copy(&mut spool, &mut out)?;
                out.flush()?;
                Ok(copied)
            }
        }
    }
}

fn copy_file<W: Write>(path: &Path, mut out: W, cancel: &CancellationToken) -> Result<u64> {
    if cancel.is_cancelled() {
        return Err(LogError::Cancelled);
    }
    let copied = io::copy(&mut File::open(path)?, &mut out)?;
    out.flush()?;
    Ok(copied)
}

fn write_zip<W: Write + Seek>(
    paths: &[PathBuf],
    out: W,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut archive = ZipWriter::new(out);
    let mut copied = 0;

    for path in paths {
        if cancel.is_cancelled() {
            return Err(LogError::Cancelled);
        }
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();
        let method = if path.extension().is_some_and(|ext| ext == "gz") {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .large_file(size >= u64::from(u32::MAX));

        let name = base_name(path);
        archive.start_file(name.as_str(), options)?;
        copied += io::copy(&mut file, &mut archive)?;
    }

    archive.finish()?.flush()?;
    Ok(copied)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Prepares [`Download`]s for a day.
#[derive(Debug, Clone)]
pub struct Exporter {
    locator: FileLocator,
}

impl Exporter {
    /// Creates an exporter over the locator's files.
    #[must_use]
    pub const fn new(locator: FileLocator) -> Self {
        Self { locator }
    }

    /// Prepares a download of `day`.
    ///
    /// With `as_zip` and more than one file the whole day is archived;
    /// otherwise the first file in locator order is served directly.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::DayNotFound`] if the day has no files.
    pub fn download(&self, day: &str, as_zip: bool) -> Result<Download> {
        let files = self.locator.files_for_day(day)?;

        let Some(first) = files.first() else {
            return Err(LogError::DayNotFound(day.to_string()));
        };

        let download = if as_zip && files.len() > 1 {
            Download {
                file_name: format!("{}-{day}.zip", self.locator.prefix()),
                content_type: ZIP_CONTENT_TYPE,
                source: DownloadSource::Zip(files.into_iter().map(|f| f.path).collect()),
            }
        } else {
            single(first)
        };

        debug!(day, file_name = %download.file_name, "prepared download");
        Ok(download)
    }
}

fn single(file: &FileDescriptor) -> Download {
    Download {
        file_name: file.file_name(),
        content_type: if file.compressed {
            GZIP_CONTENT_TYPE
        } else {
            TEXT_CONTENT_TYPE
        },
        source: DownloadSource::File(file.path.clone()),
    }
}
