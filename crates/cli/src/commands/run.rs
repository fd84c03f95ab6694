//! `run` command implementation.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use contracts::{HostKeyPolicy, RelayConfig};
use dispatcher::sinks::{telemetry_url, ThingSpeakConfig};
use ingestion::HttpReader;

use crate::cli::RunArgs;
use crate::overrides::resolve_config;

/// Execute the `run` command
///
/// Sink failures are reported but do not fail the command; only a bad
/// configuration or an unreadable sensor does.
pub async fn run_relay(args: &RunArgs, metrics: Option<&PrometheusHandle>) -> Result<()> {
    let result = relay_once(args).await;

    if let (Some(handle), Some(path)) = (metrics, args.metrics_textfile.as_deref()) {
        if let Err(e) = observability::write_metrics_textfile(handle, path) {
            warn!(error = %e, "Metrics textfile not written");
        }
    }

    result
}

async fn relay_once(args: &RunArgs) -> Result<()> {
    let config = resolve_config(&args.config, &args.overrides).inspect_err(|_| {
        observability::record_run_aborted("config");
    })?;

    info!(
        sensor = %config.temperature_host,
        host = %config.host,
        thingsboard = %config.thingsboard_domain,
        mode = ?config.dispatch_mode,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_delivery_plan(&config);
        return Ok(());
    }

    let reader = HttpReader::new(&config.temperature_host, config.reader_timeout())
        .context("Failed to create sensor reader")?;
    let dispatcher = dispatcher::create_dispatcher(&config).context("Failed to create sinks")?;

    let report = dispatcher::relay(&reader, dispatcher)
        .await
        .inspect_err(|_| observability::record_run_aborted("reader"))
        .context("Relay aborted")?;

    for outcome in report.outcomes.iter().filter(|o| !o.status.is_ok()) {
        warn!(sink = %outcome.sink, status = %outcome.status, "Sink did not deliver");
    }

    let summary = observability::record_run(&report.outcomes, report.elapsed);
    info!(
        delivered = summary.delivered,
        failed = summary.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Relay finished"
    );
    print!("{summary}");

    Ok(())
}

/// Print where the reading would go, without secrets
fn print_delivery_plan(config: &RelayConfig) {
    println!("\n=== Delivery Plan ===\n");
    println!("Sensor: {}", config.temperature_host);
    println!("Dispatch: {:?}", config.dispatch_mode);
    match config.sink_timeout() {
        Some(limit) => println!("Sink timeout: {}s", limit.as_secs()),
        None => println!("Sink timeout: none"),
    }

    println!("\nSinks (3):");
    println!(
        "  - remote_shell: {}@{} -> {}",
        config.remote_user, config.host, config.remote_target_path
    );
    if config.host_key_policy == HostKeyPolicy::Skip {
        println!("      host key verification DISABLED");
    }
    println!(
        "  - thingspeak: {} (field{})",
        ThingSpeakConfig::from_relay_config(config).update_url(),
        config.thingspeak_field
    );
    println!(
        "  - thingsboard: {}",
        telemetry_url(&config.thingsboard_scheme, &config.thingsboard_domain, "<token>")
    );
    println!();
}
