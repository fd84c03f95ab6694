//! Reading - Reader output, DispatchJob - Dispatcher to sink input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One temperature reading, fetched once per run
///
/// The value is the raw body returned by the sensor, byte-for-byte.
/// Fields are private so a reading cannot change after it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    value: String,
    fetched_at: DateTime<Utc>,
}

impl Reading {
    /// Create a reading stamped with the current time
    pub fn new(value: impl Into<String>) -> Self {
        Self::at(value, Utc::now())
    }

    /// Create a reading with an explicit fetch time
    pub fn at(value: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            fetched_at,
        }
    }

    /// Raw reading value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the reading was fetched
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// One sink's share of a dispatch
///
/// Exists only for the duration of a single sink call.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    /// The reading, identical for every sink of the run
    pub reading: Reading,

    /// Sink this job is addressed to
    pub sink: String,

    /// When the dispatcher handed the job over
    pub dispatched_at: DateTime<Utc>,
}

impl DispatchJob {
    /// Create a job for the named sink
    pub fn new(reading: Reading, sink: impl Into<String>) -> Self {
        Self {
            reading,
            sink: sink.into(),
            dispatched_at: Utc::now(),
        }
    }
}
