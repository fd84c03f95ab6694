//! # Dispatcher
//!
//! Fan-out of one reading to independent sinks.
//!
//! Responsible for:
//! - running every sink in its own task
//! - isolating sink failures, timeouts and panics from one another
//! - holding the run until every sink has finished (join barrier)

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod relay;
pub mod report;
pub mod sinks;

pub use contracts::{DataSink, DispatchJob, Reading};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use relay::relay;
pub use report::DispatchReport;
pub use sinks::{RemoteShellSink, ThingSpeakSink, ThingsBoardSink};
