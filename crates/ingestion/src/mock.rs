//! Mock reading source
//!
//! For tests without a sensor on the network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{ContractError, Reading, ReadingSource};
use tracing::debug;

use crate::error::IngestionError;

#[derive(Debug, Clone)]
enum MockBehavior {
    Value(String),
    Fail(String),
}

/// Mock reading source
///
/// Returns a fixed value, or a fixed failure, and counts how often it was read.
#[derive(Debug, Clone)]
pub struct MockReadingSource {
    address: String,
    behavior: MockBehavior,
    reads: Arc<AtomicU64>,
}

impl MockReadingSource {
    /// Source that always yields `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self::new(MockBehavior::Value(value.into()))
    }

    /// Source whose every read fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    fn new(behavior: MockBehavior) -> Self {
        Self {
            address: "mock://sensor".to_string(),
            behavior,
            reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of reads so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl ReadingSource for MockReadingSource {
    fn address(&self) -> &str {
        &self.address
    }

    async fn read(&self) -> Result<Reading, ContractError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        debug!(address = %self.address, "Mock read");
        match &self.behavior {
            MockBehavior::Value(value) => Ok(Reading::new(value.clone())),
            MockBehavior::Fail(message) => Err(IngestionError::Mock {
                address: self.address.clone(),
                message: message.clone(),
            }
            .into()),
        }
    }
}
