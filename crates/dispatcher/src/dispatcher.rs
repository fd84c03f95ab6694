//! Dispatcher - fans one reading out to every sink and waits for all of them

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use contracts::{DataSink, DispatchJob, DispatchMode, Reading, RelayConfig, SinkOutcome};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::report::DispatchReport;
use crate::sinks::{
    RemoteShellSink, ThingSpeakSink, ThingsBoardSink, REMOTE_SHELL_SINK, THINGSBOARD_SINK,
    THINGSPEAK_SINK,
};

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Concurrent (join barrier) or one sink after another
    pub mode: DispatchMode,
    /// Per-sink bound (None = unbounded)
    pub sink_timeout: Option<Duration>,
}

impl DispatcherConfig {
    pub fn from_relay_config(config: &RelayConfig) -> Self {
        Self {
            mode: config.dispatch_mode,
            sink_timeout: config.sink_timeout(),
        }
    }
}

/// Starts one sink's worker for a reading
type SinkLauncher = Box<dyn FnOnce(Reading, Option<Duration>) -> SinkHandle + Send>;

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    names: Vec<String>,
    launchers: Vec<SinkLauncher>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            names: Vec::new(),
            launchers: Vec::new(),
        }
    }

    /// Register a sink; it is spawned only when a reading is dispatched
    pub fn with_sink<S: DataSink + Send + 'static>(mut self, sink: S) -> Self {
        self.names.push(sink.name().to_string());
        self.launchers.push(Box::new(move |reading, timeout| {
            let job = DispatchJob::new(reading, sink.name());
            SinkHandle::spawn(sink, job, timeout)
        }));
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        if self.launchers.is_empty() {
            return Err(DispatcherError::NoSinks);
        }

        Ok(Dispatcher {
            config: self.config,
            names: self.names,
            launchers: self.launchers,
        })
    }
}

/// Fans a reading out to its sinks
///
/// Consumed by `dispatch`: one dispatcher serves exactly one reading.
pub struct Dispatcher {
    config: DispatcherConfig,
    names: Vec<String>,
    launchers: Vec<SinkLauncher>,
}

impl Dispatcher {
    /// Names of the registered sinks, in dispatch order
    pub fn sink_names(&self) -> &[String] {
        &self.names
    }

    /// Dispatch mode
    pub fn mode(&self) -> DispatchMode {
        self.config.mode
    }

    /// Deliver `reading` to every sink
    ///
    /// Returns only once every sink has finished, whatever its outcome.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, reading),
        fields(sinks = self.launchers.len(), mode = ?self.config.mode)
    )]
    pub async fn dispatch(self, reading: Reading) -> DispatchReport {
        info!(sinks = self.launchers.len(), "Dispatch started");
        let started = Instant::now();
        let timeout = self.config.sink_timeout;

        let outcomes = match self.config.mode {
            DispatchMode::Concurrent => {
                let handles: Vec<SinkHandle> = self
                    .launchers
                    .into_iter()
                    .map(|launch| launch(reading.clone(), timeout))
                    .collect();
                Self::join_all(handles).await
            }
            DispatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(self.launchers.len());
                for launch in self.launchers {
                    let outcome = launch(reading.clone(), timeout).join().await;
                    record_outcome(&outcome);
                    outcomes.push(outcome);
                }
                outcomes
            }
        };

        let report = DispatchReport {
            reading: reading.value().to_string(),
            outcomes,
            elapsed: started.elapsed(),
        };

        info!(
            attempted = report.attempted(),
            delivered = report.delivered_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "All sinks attempted"
        );
        report
    }

    /// Join barrier: wait on every handle
    async fn join_all(handles: Vec<SinkHandle>) -> Vec<SinkOutcome> {
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            debug!(sink = %handle.name(), "Waiting for sink");
            let outcome = handle.join().await;
            record_outcome(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn record_outcome(outcome: &SinkOutcome) {
    metrics::counter!(
        "relay_sink_outcomes_total",
        "sink" => outcome.sink.clone(),
        "status" => outcome.status.label()
    )
    .increment(1);
    metrics::histogram!("relay_sink_duration_seconds", "sink" => outcome.sink.clone())
        .record(outcome.elapsed.as_secs_f64());
}

/// Create the dispatcher for the three production sinks
#[instrument(name = "dispatcher_create", skip(config))]
pub fn create_dispatcher(config: &RelayConfig) -> Result<Dispatcher, DispatcherError> {
    let thingspeak = ThingSpeakSink::from_config(THINGSPEAK_SINK, config)
        .map_err(|e| DispatcherError::sink_creation(THINGSPEAK_SINK, e.to_string()))?;
    let thingsboard = ThingsBoardSink::from_config(THINGSBOARD_SINK, config)
        .map_err(|e| DispatcherError::sink_creation(THINGSBOARD_SINK, e.to_string()))?;

    DispatcherBuilder::new(DispatcherConfig::from_relay_config(config))
        .with_sink(RemoteShellSink::from_config(REMOTE_SHELL_SINK, config))
        .with_sink(thingspeak)
        .with_sink(thingsboard)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, Delivery, HostKeyPolicy, SinkStatus};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tokio::time::sleep;

    /// Records every reading it receives
    struct RecordingSink {
        name: String,
        delay_ms: u64,
        fail: bool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn new(name: &str, seen: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                delay_ms: 0,
                fail: false,
                seen: Arc::clone(seen),
            }
        }
    }

    impl DataSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(&mut self, job: &DispatchJob) -> Result<Delivery, ContractError> {
            sleep(Duration::from_millis(self.delay_ms)).await;
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}={}", job.sink, job.reading.value()));
            if self.fail {
                return Err(ContractError::sink_write(&self.name, "injected"));
            }
            Ok(Delivery::Delivered)
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = DispatcherBuilder::new(DispatcherConfig::default())
            .with_sink(RecordingSink::new("a", &seen))
            .with_sink(RecordingSink::new("b", &seen))
            .with_sink(RecordingSink::new("c", &seen))
            .build()
            .unwrap();
        assert_eq!(dispatcher.sink_names(), ["a", "b", "c"]);

        let report = dispatcher.dispatch(Reading::new("21.5")).await;
        assert_eq!(report.attempted(), 3);
        assert!(report.all_ok());

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["a=21.5", "b=21.5", "c=21.5"]);
    }

    #[tokio::test]
    async fn test_dispatch_waits_for_slowest_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut slow = RecordingSink::new("slow", &seen);
        slow.delay_ms = 500;
        let mut fast = RecordingSink::new("fast", &seen);
        fast.delay_ms = 10;
        let mut medium = RecordingSink::new("medium", &seen);
        medium.delay_ms = 100;

        let dispatcher = DispatcherBuilder::new(DispatcherConfig::default())
            .with_sink(slow)
            .with_sink(fast)
            .with_sink(medium)
            .build()
            .unwrap();

        let started = Instant::now();
        let report = dispatcher.dispatch(Reading::new("22")).await;
        let elapsed = started.elapsed();

        // all three finished before dispatch returned
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert_eq!(report.delivered_count(), 3);
        assert!(elapsed >= Duration::from_millis(500));
        // concurrent: bounded by the slowest, not the sum
        assert!(elapsed < Duration::from_millis(600 + 500));
        assert_eq!(seen.lock().unwrap()[0], "fast=22");
    }

    #[tokio::test]
    async fn test_sequential_mode_preserves_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut slow = RecordingSink::new("first", &seen);
        slow.delay_ms = 50;
        let dispatcher = DispatcherBuilder::new(DispatcherConfig {
            mode: DispatchMode::Sequential,
            sink_timeout: None,
        })
        .with_sink(slow)
        .with_sink(RecordingSink::new("second", &seen))
        .build()
        .unwrap();

        let report = dispatcher.dispatch(Reading::new("19")).await;
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first=19", "second=19"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut failing = RecordingSink::new("failing", &seen);
        failing.fail = true;
        let dispatcher = DispatcherBuilder::new(DispatcherConfig::default())
            .with_sink(failing)
            .with_sink(RecordingSink::new("ok", &seen))
            .build()
            .unwrap();

        let report = dispatcher.dispatch(Reading::new("20")).await;
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.outcome("ok").unwrap().status, SinkStatus::Delivered);
    }

    #[tokio::test]
    async fn test_any_single_failure_spares_the_other_two() {
        let names = ["remote", "thingspeak", "thingsboard"];
        for failing in 0..names.len() {
            for mode in [DispatchMode::Concurrent, DispatchMode::Sequential] {
                let seen = Arc::new(Mutex::new(Vec::new()));
                let mut builder = DispatcherBuilder::new(DispatcherConfig {
                    mode,
                    sink_timeout: Some(Duration::from_secs(5)),
                });
                for (i, name) in names.iter().enumerate() {
                    let mut sink = RecordingSink::new(name, &seen);
                    sink.fail = i == failing;
                    builder = builder.with_sink(sink);
                }

                let report = builder.build().unwrap().dispatch(Reading::new("21")).await;
                assert_eq!(report.attempted(), 3);
                assert_eq!(report.failed_count(), 1, "failing={failing} mode={mode:?}");
                assert_eq!(report.delivered_count(), 2, "failing={failing} mode={mode:?}");
                for (i, name) in names.iter().enumerate() {
                    let status = &report.outcome(name).unwrap().status;
                    if i == failing {
                        assert!(matches!(status, SinkStatus::Failed { .. }), "{name}");
                    } else {
                        assert_eq!(*status, SinkStatus::Delivered, "{name}");
                    }
                }
                // every sink saw the reading, the failing one included
                assert_eq!(seen.lock().unwrap().len(), 3);
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_only_affects_slow_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut slow = RecordingSink::new("slow", &seen);
        slow.delay_ms = 1_000;
        let dispatcher = DispatcherBuilder::new(DispatcherConfig {
            mode: DispatchMode::Concurrent,
            sink_timeout: Some(Duration::from_millis(50)),
        })
        .with_sink(slow)
        .with_sink(RecordingSink::new("fast", &seen))
        .build()
        .unwrap();

        let report = dispatcher.dispatch(Reading::new("20")).await;
        assert!(matches!(
            report.outcome("slow").unwrap().status,
            SinkStatus::TimedOut { .. }
        ));
        assert_eq!(report.outcome("fast").unwrap().status, SinkStatus::Delivered);
        assert!(report.elapsed < Duration::from_millis(1_000));
    }

    #[test]
    fn test_build_without_sinks() {
        let result = DispatcherBuilder::new(DispatcherConfig::default()).build();
        assert!(matches!(result, Err(DispatcherError::NoSinks)));
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let config = RelayConfig {
            key_path: PathBuf::from("/nonexistent/id_rsa"),
            host: "127.0.0.1:1".into(),
            temperature_host: "http://127.0.0.1:1".into(),
            thingspeak_api_key: "TS".into(),
            thingsboard_api_key: "TB".into(),
            thingsboard_domain: "example.com".into(),
            remote_user: "root".into(),
            remote_target_path: "/var/www/html/index.html".into(),
            host_key_policy: HostKeyPolicy::Verify,
            known_hosts_path: None,
            thingspeak_endpoint: "https://api.thingspeak.com".into(),
            thingspeak_field: 1,
            thingsboard_scheme: "https".into(),
            dispatch_mode: DispatchMode::Sequential,
            reader_timeout_secs: 10,
            sink_timeout_secs: 5,
        };

        let dispatcher = create_dispatcher(&config).unwrap();
        assert_eq!(
            dispatcher.sink_names(),
            [REMOTE_SHELL_SINK, THINGSPEAK_SINK, THINGSBOARD_SINK]
        );
        assert_eq!(dispatcher.mode(), DispatchMode::Sequential);
    }
}
