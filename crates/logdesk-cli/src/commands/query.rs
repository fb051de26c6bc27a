//! Query command implementation.

use std::io::Write;

use logdesk::{LogEngine, QuerySpec};
use tokio_util::sync::CancellationToken;

use crate::cli::QueryArgs;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for the query command.
pub struct QueryCommand<'a> {
    engine: &'a LogEngine,
}

impl<'a> QueryCommand<'a> {
    /// Creates a new query command handler.
    #[must_use]
    pub const fn new(engine: &'a LogEngine) -> Self {
        Self { engine }
    }

    /// Runs one page of a query and prints it.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails or is cancelled.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &QueryArgs,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let result = self.engine.query(&build_spec(args), cancel)?;
        format.write(out, &result)
    }
}

/// Translates parsed arguments into a [`QuerySpec`].
#[must_use]
pub fn build_spec(args: &QueryArgs) -> QuerySpec {
    let mut spec = QuerySpec::new(&args.day)
        .with_levels(args.level.iter().copied())
        .with_cursor(args.cursor)
        .with_order(args.order.into());
    if let Some(hour) = args.hour {
        spec = spec.with_hour(hour);
    }
    if let Some(search) = &args.search {
        spec = spec.with_search(search);
    }
    if let Some(limit) = args.limit {
        spec = spec.with_limit(limit);
    }
    if let Some(tail) = args.tail {
        spec = spec.with_tail(tail);
    }
    spec
}
