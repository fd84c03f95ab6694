//! Run-level metrics
//!
//! Per-sink counters are recorded by the dispatcher as each sink finishes;
//! this module records what a whole run looked like.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{SinkOutcome, SinkStatus};
use metrics::{counter, gauge, histogram};

/// Record a completed run
///
/// ```ignore
/// let report = relay(&reader, dispatcher).await?;
/// observability::record_run(&report.outcomes, report.elapsed);
/// ```
pub fn record_run(outcomes: &[SinkOutcome], elapsed: Duration) -> RunSummary {
    let summary = RunSummary::from_outcomes(outcomes, elapsed);

    counter!("relay_runs_total", "outcome" => "completed").increment(1);
    histogram!("relay_run_duration_seconds").record(elapsed.as_secs_f64());

    gauge!("relay_last_run_sinks", "status" => "delivered").set(summary.delivered as f64);
    gauge!("relay_last_run_sinks", "status" => "skipped").set(summary.skipped as f64);
    gauge!("relay_last_run_sinks", "status" => "failed").set(summary.failed as f64);
    gauge!("relay_last_run_timestamp_seconds").set(unix_now());

    for outcome in outcomes {
        let up = if outcome.status.is_ok() { 1.0 } else { 0.0 };
        gauge!("relay_sink_up", "sink" => outcome.sink.clone()).set(up);
    }

    summary
}

/// Record a run that stopped before dispatch (config or reader failure)
pub fn record_run_aborted(stage: &'static str) {
    counter!("relay_runs_total", "outcome" => "aborted", "stage" => stage).increment(1);
    gauge!("relay_last_run_timestamp_seconds").set(unix_now());
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// What happened to each sink in one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// (sink, status) in dispatch order
    pub sinks: Vec<(String, String)>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[SinkOutcome], elapsed: Duration) -> Self {
        let mut summary = Self {
            attempted: outcomes.len(),
            elapsed,
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome.status {
                SinkStatus::Delivered => summary.delivered += 1,
                SinkStatus::Skipped { .. } => summary.skipped += 1,
                _ => summary.failed += 1,
            }
            summary
                .sinks
                .push((outcome.sink.clone(), outcome.status.to_string()));
        }

        summary
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Summary ===")?;
        writeln!(
            f,
            "Sinks: {} attempted, {} delivered, {} skipped, {} failed",
            self.attempted, self.delivered, self.skipped, self.failed
        )?;
        writeln!(f, "Elapsed: {:.3}s", self.elapsed.as_secs_f64())?;
        for (sink, status) in &self.sinks {
            writeln!(f, "  {}: {}", sink, status)?;
        }
        Ok(())
    }
}
