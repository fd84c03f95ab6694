//! # Contracts
//!
//! Frozen interface contracts, defining the data structures and traits shared
//! between the reader, the dispatcher and the sinks.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - A `Reading` carries the UTC instant it was fetched
//! - A `DispatchJob` carries the UTC instant it was handed to its sink

mod error;
mod outcome;
mod reading;
mod relay_config;
mod sink;
mod source;

pub use error::*;
pub use outcome::*;
pub use reading::*;
pub use relay_config::*;
pub use sink::*;
pub use source::{LocalReadingSource, ReadingSource};
