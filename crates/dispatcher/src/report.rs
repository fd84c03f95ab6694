//! DispatchReport - outcomes of one dispatch, for reporting

use std::time::Duration;

use serde::Serialize;

use contracts::{SinkOutcome, SinkStatus};

/// Outcomes of every sink of one run
///
/// Produced only after the join barrier released, so it always holds one
/// outcome per dispatched sink.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Reading that was dispatched
    pub reading: String,
    /// One outcome per sink, in dispatch order
    pub outcomes: Vec<SinkOutcome>,
    /// Time from first spawn to barrier release
    #[serde(serialize_with = "serialize_ms")]
    pub elapsed: Duration,
}

impl DispatchReport {
    /// Number of sinks attempted
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Sinks that delivered
    pub fn delivered_count(&self) -> usize {
        self.count(|s| matches!(s, SinkStatus::Delivered))
    }

    /// Sinks that skipped the reading
    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, SinkStatus::Skipped { .. }))
    }

    /// Sinks that failed, timed out, or panicked
    pub fn failed_count(&self) -> usize {
        self.count(|s| !s.is_ok())
    }

    /// True when no sink faulted
    pub fn all_ok(&self) -> bool {
        self.failed_count() == 0
    }

    /// Outcome of the named sink
    pub fn outcome(&self, sink: &str) -> Option<&SinkOutcome> {
        self.outcomes.iter().find(|o| o.sink == sink)
    }

    fn count(&self, predicate: impl Fn(&SinkStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

fn serialize_ms<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}
