//! # Temp Relay CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - configuration loading, overrides and validation
//! - one relay run: fetch, fan out, report
//! - exit status: non-zero only when the run could not start or no reading
//!   was obtained

mod cli;
mod commands;
mod overrides;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_relay, run_validate};
use observability::ObservabilityConfig;

/// Grace period for blocking SSH work still running after a sink timed out
const BLOCKING_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    block_on_bounded(execute(cli), BLOCKING_SHUTDOWN_GRACE)
}

/// Run `future` to completion, then give blocking threads at most `grace`
fn block_on_bounded<F>(future: F, grace: Duration) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(future);
    // Dropping the runtime would wait for detached blocking threads.
    runtime.shutdown_timeout(grace);
    result
}

async fn execute(cli: Cli) -> Result<()> {
    let metrics = observability::init_with_config(&observability_config(&cli))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Temp Relay starting");

    let result = match &cli.command {
        Commands::Run(args) => run_relay(args, metrics.as_ref()).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = format!("{e:#}"), "Command failed");
    }

    result
}

/// Map CLI logging options onto the observability setup
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let metrics_textfile = match &cli.command {
        Commands::Run(args) if !args.dry_run => args.metrics_textfile.clone(),
        _ => None,
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        default_log_level: default_log_level.to_string(),
        force_level: cli.quiet,
        metrics_textfile,
    }
}
