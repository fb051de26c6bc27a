//! Filtered, paginated queries over one day.
//!
//! # Pagination
//!
//! The cursor is a raw-line offset: a query skips the first `cursor` lines
//! of the day's file set before any filter runs, and returns
//! `cursor + matched` as the next cursor. Paging without filters visits every
//! line exactly once. With filters the next cursor lands short of the last
//! scanned line, so the following page re-reads lines the previous page
//! already rejected and may return records again.
//!
//! `has_more` is true whenever a page filled up. A day whose match count is
//! an exact multiple of `limit` therefore reports one extra, empty page.

use memchr::memmem;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::locator::FileLocator;
use crate::normalize::RecordNormalizer;
use crate::scanner::LineScanner;
use crate::types::{QueryResult, QuerySpec, SortOrder};

/// Answers [`QuerySpec`]s by scanning a day's files.
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    locator: FileLocator,
    normalizer: RecordNormalizer,
    max_line_bytes: usize,
}

impl QueryPipeline {
    /// Creates a pipeline over the locator's files.
    #[must_use]
    pub const fn new(
        locator: FileLocator,
        normalizer: RecordNormalizer,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            locator,
            normalizer,
            max_line_bytes,
        }
    }

    /// Runs one page of a query.
    ///
    /// Limit and tail are clamped the same way the [`QuerySpec`] builders
    /// clamp them, so directly built or deserialized specs behave alike.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid, the day has no files, or the
    /// scan is cancelled.
    pub fn query(&self, spec: &QuerySpec, cancel: &CancellationToken) -> Result<QueryResult> {
        let spec = spec.clone().normalized();
        spec.validate()?;
        let files = self.locator.files_for_day(&spec.day)?;
        let scanner = LineScanner::new(files, cancel.clone(), self.max_line_bytes)?;
        let finder = spec.search.as_deref().map(memmem::Finder::new);

        let mut items = Vec::new();
        for (index, line) in scanner.enumerate() {
            let line = line?;
            if (index as u64) < spec.cursor {
                continue;
            }
            if let Some(finder) = &finder {
                if finder.find(&line).is_none() {
                    continue;
                }
            }
            let record = self.normalizer.normalize(&line);
            if !spec.matches(&record) {
                continue;
            }
            items.push(record);
            if items.len() >= spec.limit {
                break;
            }
        }

        let matched = items.len();
        if spec.order == SortOrder::Desc {
            items.reverse();
        }
        if let Some(tail) = spec.tail {
            if items.len() > tail {
                match spec.order {
                    SortOrder::Desc => items.truncate(tail),
                    SortOrder::Asc => {
                        items.drain(..items.len() - tail);
                    }
                }
            }
        }

        debug!(
            day = %spec.day,
            cursor = spec.cursor,
            matched,
            returned = items.len(),
            "query complete"
        );

        Ok(QueryResult {
            day: spec.day.clone(),
            items,
            next_cursor: spec.cursor + matched as u64,
            has_more: matched == spec.limit,
        })
    }
}
