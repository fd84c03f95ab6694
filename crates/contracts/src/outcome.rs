//! SinkOutcome - per-sink result of one dispatch

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::Delivery;

/// Terminal state of one sink after dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkStatus {
    /// Reading delivered
    Delivered,
    /// Sink declined the reading locally, without error
    Skipped { reason: String },
    /// Delivery attempted and failed
    Failed { error: String },
    /// Delivery exceeded the per-sink timeout
    TimedOut {
        #[serde(with = "duration_ms")]
        after: Duration,
    },
    /// Sink task panicked
    Panicked,
}

impl SinkStatus {
    /// Short label (used for metrics)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
            Self::Panicked => "panicked",
        }
    }

    /// True when the sink finished without a fault
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Delivered | Self::Skipped { .. })
    }
}

impl From<Delivery> for SinkStatus {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Delivered => Self::Delivered,
            Delivery::Skipped { reason } => Self::Skipped { reason },
        }
    }
}

impl fmt::Display for SinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Failed { error } => write!(f, "failed: {error}"),
            Self::TimedOut { after } => write!(f, "timed out after {}ms", after.as_millis()),
            Self::Panicked => f.write_str("panicked"),
        }
    }
}

/// Outcome of one sink, logged and reported but never shared with siblings
#[derive(Debug, Clone, Serialize)]
pub struct SinkOutcome {
    /// Sink name
    pub sink: String,

    /// Terminal state
    #[serde(flatten)]
    pub status: SinkStatus,

    /// Wall-clock time spent in the sink
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl SinkOutcome {
    pub fn new(sink: impl Into<String>, status: SinkStatus, elapsed: Duration) -> Self {
        Self {
            sink: sink.into(),
            status,
            elapsed,
        }
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
