//! DataSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, DispatchJob};

/// What a sink did with a job it accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The reading reached the destination
    Delivered,
    /// Local validation rejected the reading; nothing was sent
    Skipped { reason: String },
}

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver the job's reading to the destination
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn deliver(&mut self, job: &DispatchJob) -> Result<Delivery, ContractError>;

    /// Release anything the sink still holds
    async fn close(&mut self) -> Result<(), ContractError>;
}
