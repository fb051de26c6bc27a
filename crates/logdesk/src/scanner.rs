//! Streaming line reader over a day's file set.
//!
//! [`LineScanner`] is a lazy iterator: it opens one file at a time, yields
//! complete lines, and never holds more than one line in memory. Consumers
//! decide when to stop; dropping the scanner closes whatever file is open.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use flate2::read::MultiGzDecoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{LogError, Result};
use crate::types::FileDescriptor;

/// Read buffer size per open file.
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Outcome of reading one bounded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStatus {
    Line,
    TooLong,
    Eof,
}

struct OpenFile {
    path: PathBuf,
    reader: Box<dyn BufRead + Send>,
}

/// Yields raw lines from a list of files in order.
///
/// Each item is one line without its terminator. Whitespace-only lines are
/// dropped. Files that cannot be opened or decompressed are logged and
/// skipped; lines longer than the configured bound are discarded whole.
/// Once cancelled, the scanner yields a single [`LogError::Cancelled`] and
/// then ends.
pub struct LineScanner {
    files: std::vec::IntoIter<FileDescriptor>,
    current: Option<OpenFile>,
    cancel: CancellationToken,
    max_line_bytes: usize,
    lines_read: u64,
    done: bool,
}

impl LineScanner {
    /// Creates a scanner over `files`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NoFiles`] if `files` is empty.
    pub fn new(
        files: Vec<FileDescriptor>,
        cancel: CancellationToken,
        max_line_bytes: usize,
    ) -> Result<Self> {
        if files.is_empty() {
            return Err(LogError::NoFiles);
        }
        Ok(Self {
            files: files.into_iter(),
            current: None,
            cancel,
            max_line_bytes,
            lines_read: 0,
            done: false,
        })
    }

    /// Number of lines yielded so far.
    #[must_use]
    pub const fn lines_read(&self) -> u64 {
        self.lines_read
    }

    fn open(file: &FileDescriptor) -> io::Result<Box<dyn BufRead + Send>> {
        let handle = File::open(&file.path)?;
        if file.compressed {
            let mut reader =
                BufReader::with_capacity(READ_BUFFER_BYTES, MultiGzDecoder::new(handle));
            // Surface a bad gzip header now rather than mid-scan.
            reader.fill_buf()?;
            Ok(Box::new(reader))
        } else {
            Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, handle)))
        }
    }

    fn cancel_now(&mut self) -> Option<Result<Vec<u8>>> {
        self.current = None;
        self.done = true;
        debug!(lines_read = self.lines_read, "scan cancelled");
        Some(Err(LogError::Cancelled))
    }
}

impl Iterator for LineScanner {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                return self.cancel_now();
            }

            let Some(open) = self.current.as_mut() else {
                let Some(file) = self.files.next() else {
                    self.done = true;
                    return None;
                };
                match Self::open(&file) {
                    Ok(reader) => {
                        debug!(path = %file.path.display(), "scanning log file");
                        self.current = Some(OpenFile {
                            path: file.path,
                            reader,
                        });
                    }
                    Err(e) => {
                        warn!(path = %file.path.display(), error = %e, "skipping unreadable log file");
                    }
                }
                continue;
            };

            let mut line = Vec::new();
            match read_bounded_line(open.reader.as_mut(), &mut line, self.max_line_bytes) {
                Ok(LineStatus::Eof) => self.current = None,
                Ok(LineStatus::TooLong) => {
                    warn!(
                        path = %open.path.display(),
                        max_line_bytes = self.max_line_bytes,
                        "skipping over-long line"
                    );
                }
                Ok(LineStatus::Line) => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    self.lines_read += 1;
                    return Some(Ok(line));
                }
                Err(e) => {
                    warn!(path = %open.path.display(), error = %e, "abandoning log file after read error");
                    self.current = None;
                }
            }
        }
    }
}

/// Reads up to the next `\n`, keeping at most `max` bytes.
///
/// A line longer than `max` is consumed in full but not kept. A final line
/// without a terminator is returned as a line.
fn read_bounded_line(reader: &mut dyn BufRead, buf: &mut Vec<u8>, max: usize) -> io::Result<LineStatus> {
    let mut overflow = false;
    let mut saw_bytes = false;

    loop {
        let (used, finished) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(match (saw_bytes, overflow) {
                    (false, _) => LineStatus::Eof,
                    (true, true) => LineStatus::TooLong,
                    (true, false) => LineStatus::Line,
                });
            }
            saw_bytes = true;

            let (chunk, used, finished) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };
            if !overflow {
                if buf.len() + chunk.len() > max {
                    overflow = true;
                    buf.clear();
                } else {
                    buf.extend_from_slice(chunk);
                }
            }
            (used, finished)
        };
        reader.consume(used);

        if finished {
            return Ok(if overflow {
                LineStatus::TooLong
            } else {
                LineStatus::Line
            });
        }
    }
}
