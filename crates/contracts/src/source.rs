//! ReadingSource trait - Reader abstraction
//!
//! Decouples the dispatcher from how a reading is obtained, so the real HTTP
//! reader and test doubles share one interface.

use crate::{ContractError, Reading};

/// Source of the run's single reading
///
/// A failed read is fatal to the run: callers must not dispatch anything
/// when `read` returns an error.
#[trait_variant::make(ReadingSource: Send)]
pub trait LocalReadingSource {
    /// Address the reading is fetched from (used for logging)
    fn address(&self) -> &str;

    /// Fetch the reading once
    async fn read(&self) -> Result<Reading, ContractError>;
}
