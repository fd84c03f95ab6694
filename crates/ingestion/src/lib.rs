//! # Ingestion
//!
//! The reader side of a relay run.
//!
//! Responsibilities:
//! - Fetch the single reading from the sensor (HTTP GET)
//! - Report any failure as fatal (`ContractError::SourceUnavailable`)
//! - Provide a mock source for tests
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::ReadingSource;
//! use ingestion::HttpReader;
//! use std::time::Duration;
//!
//! let reader = HttpReader::new("http://192.168.1.4", Duration::from_secs(10))?;
//! let reading = reader.read().await?;
//! println!("{}", reading.value());
//! ```

mod error;
mod http_reader;
mod mock;

pub use contracts::{Reading, ReadingSource};
pub use error::{IngestionError, Result};
pub use http_reader::HttpReader;
pub use mock::MockReadingSource;
