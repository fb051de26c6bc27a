//! Logdesk CLI binary entrypoint.
//!
//! This is the main entry point for the `logdesk` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use logdesk::{EngineConfig, LogEngine};
use logdesk_cli::cli::{Cli, Commands};
use logdesk_cli::commands::{DaysCommand, DownloadCommand, QueryCommand, StatsCommand};
use logdesk_cli::output::OutputFormat;
use logdesk_cli::CliError;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the engine config from the config file and flag overrides.
fn load_config(cli: &Cli) -> Result<EngineConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.log_dir {
        config.log_dir.clone_from(dir);
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let engine = LogEngine::new(load_config(&cli)?)?;
    let format = OutputFormat::new(cli.format);
    let cancel = CancellationToken::new();

    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling scan");
                cancel.cancel();
            }
        })
    };

    let command = cli.command;
    let worker = tokio::task::spawn_blocking(move || execute(&engine, &format, &command, &cancel));
    let result = worker.await.map_err(|e| CliError::Task(e.to_string()))?;

    watcher.abort();
    debug!(ok = result.is_ok(), "command finished");
    result
}

fn execute(
    engine: &LogEngine,
    format: &OutputFormat,
    command: &Commands,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Days { retention } => {
            DaysCommand::new(engine).execute(&mut stdout, format, *retention)?;
        }
        Commands::Query(args) => {
            QueryCommand::new(engine).execute(&mut stdout, format, args, cancel)?;
        }
        Commands::Stats { day } => {
            StatsCommand::new(engine).day(&mut stdout, format, day, cancel)?;
        }
        Commands::Summary { days } => {
            StatsCommand::new(engine).summary(&mut stdout, format, *days, cancel)?;
        }
        Commands::Download(args) => {
            DownloadCommand::new(engine).execute(&mut stdout, format, args, cancel)?;
        }
    }

    Ok(())
}
