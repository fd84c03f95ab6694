//! # Observability
//!
//! Tracing and Prometheus metrics for a relay run.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact)
//! - Prometheus recorder rendered to a textfile at the end of a run
//! - Run summary built from sink outcomes
//!
//! A relay run is one-shot, so metrics are not served over HTTP. They are
//! written once in text exposition format for a node-exporter textfile
//! collector to pick up.
//!
//! ## Example
//!
//! ```ignore
//! let handle = observability::init_with_config(config)?;
//! // ... relay ...
//! observability::metrics::record_run(&outcomes, elapsed);
//! if let (Some(handle), Some(path)) = (handle, &config.metrics_textfile) {
//!     observability::write_metrics_textfile(&handle, path)?;
//! }
//! ```

pub mod metrics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{record_run, record_run_aborted, RunSummary};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Level used when RUST_LOG is not set
    pub default_log_level: String,
    /// Ignore RUST_LOG and use `default_log_level` as is
    pub force_level: bool,
    /// Prometheus textfile (None = metrics disabled)
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            default_log_level: "info".to_string(),
            force_level: false,
            metrics_textfile: None,
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable
    #[default]
    Pretty,
    /// Compact single line
    Compact,
}

/// Initialize tracing, and the Prometheus recorder when a textfile is configured
///
/// Returns the handle used to render the metrics later.
pub fn init_with_config(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    init_tracing(config)?;

    let handle = match config.metrics_textfile {
        Some(ref path) => {
            let handle = init_metrics()?;
            tracing::debug!(path = %path.display(), "Prometheus recorder installed");
            Some(handle)
        }
        None => None,
    };

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_textfile = ?config.metrics_textfile,
        "Observability initialized"
    );

    Ok(handle)
}

fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = if config.force_level {
        EnvFilter::new(&config.default_log_level)
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level))
    };

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

/// Install the global Prometheus recorder without an HTTP listener
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Render all metrics to `path` in text exposition format
///
/// Written to a sibling temp file first, then renamed, so a collector never
/// reads a half-written file.
pub fn write_metrics_textfile(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, handle.render())
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move metrics into {}", path.display()))?;

    tracing::info!(path = %path.display(), "Metrics textfile written");
    Ok(())
}
