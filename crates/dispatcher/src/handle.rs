//! SinkHandle - runs one sink in its own task and yields its outcome

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{DataSink, DispatchJob, SinkOutcome, SinkStatus};

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Worker task handle
    worker_handle: JoinHandle<SinkOutcome>,
    /// When the worker was spawned
    started: Instant,
}

impl SinkHandle {
    /// Spawn the worker task delivering `job` to `sink`
    ///
    /// The sink is owned by the task and closed after delivery, failure or
    /// timeout. A sink that panics skips `close()`; unwinding drops it, which
    /// releases whatever it holds.
    pub fn spawn<S: DataSink + Send + 'static>(
        sink: S,
        job: DispatchJob,
        timeout: Option<Duration>,
    ) -> Self {
        let name = sink.name().to_string();
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, job, timeout, worker_name).await
        });

        Self {
            name,
            worker_handle,
            started: Instant::now(),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the worker to finish
    ///
    /// A panicking worker is reported as `Panicked`, never propagated.
    #[instrument(name = "sink_handle_join", skip(self), fields(sink = %self.name))]
    pub async fn join(self) -> SinkOutcome {
        match self.worker_handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(sink = %self.name, error = ?e, "Worker task panicked");
                SinkOutcome::new(self.name, SinkStatus::Panicked, self.started.elapsed())
            }
        }
    }
}

/// Worker task: one delivery attempt, then close
#[instrument(
    name = "sink_worker",
    skip(sink, job, timeout),
    fields(sink = %name)
)]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    job: DispatchJob,
    timeout: Option<Duration>,
    name: String,
) -> SinkOutcome {
    debug!(sink = %name, "Sink worker started");
    let started = Instant::now();

    let attempt = match timeout {
        Some(limit) => tokio::time::timeout(limit, sink.deliver(&job))
            .await
            .map_err(|_| limit),
        None => Ok(sink.deliver(&job).await),
    };

    let status = match attempt {
        Ok(Ok(delivery)) => SinkStatus::from(delivery),
        Ok(Err(e)) => SinkStatus::Failed {
            error: e.to_string(),
        },
        Err(after) => SinkStatus::TimedOut { after },
    };

    // Cleanup
    if let Err(e) = sink.close().await {
        warn!(sink = %name, error = %e, "Close failed");
    }

    let elapsed = started.elapsed();
    match &status {
        SinkStatus::Delivered => {
            info!(sink = %name, elapsed_ms = elapsed.as_millis() as u64, "Reading delivered")
        }
        SinkStatus::Skipped { reason } => {
            info!(sink = %name, reason = %reason, "Reading skipped")
        }
        SinkStatus::Failed { error } => {
            error!(sink = %name, error = %error, "Delivery failed")
        }
        SinkStatus::TimedOut { after } => {
            error!(sink = %name, timeout_ms = after.as_millis() as u64, "Delivery timed out")
        }
        SinkStatus::Panicked => {}
    }

    SinkOutcome::new(name, status, elapsed)
}
