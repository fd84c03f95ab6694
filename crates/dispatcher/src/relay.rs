//! relay - one run: read once, then dispatch

use contracts::ReadingSource;
use tracing::{error, info, instrument};

use crate::dispatcher::Dispatcher;
use crate::error::DispatcherError;
use crate::report::DispatchReport;

/// Read the reading and hand it to every sink
///
/// A failed read aborts the run before any sink is touched.
#[instrument(name = "relay", skip(source, dispatcher), fields(source = %source.address()))]
pub async fn relay<S: ReadingSource>(
    source: &S,
    dispatcher: Dispatcher,
) -> Result<DispatchReport, DispatcherError> {
    let reading = match source.read().await {
        Ok(reading) => reading,
        Err(e) => {
            error!(error = %e, "Cannot get reading, nothing dispatched");
            return Err(DispatcherError::Source(e));
        }
    };

    info!(reading = %reading.value().trim_end(), "Reading fetched");
    Ok(dispatcher.dispatch(reading).await)
}
