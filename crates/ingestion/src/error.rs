//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection or request failure
    #[error("request to {address} failed: {source}")]
    Request {
        /// Sensor address
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// Sensor answered with a non-success status
    #[error("sensor {address} answered {status}")]
    Status {
        /// Sensor address
        address: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be read
    #[error("failed to read response body from {address}: {message}")]
    Body {
        /// Sensor address
        address: String,
        /// Error message
        message: String,
    },

    /// Injected failure (mock source)
    #[error("mock source {address} failed: {message}")]
    Mock {
        /// Mock address
        address: String,
        /// Error message
        message: String,
    },
}

impl IngestionError {
    /// Address of the source that failed
    pub fn address(&self) -> &str {
        match self {
            Self::ClientBuild(_) => "",
            Self::Request { address, .. }
            | Self::Status { address, .. }
            | Self::Body { address, .. }
            | Self::Mock { address, .. } => address,
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        ContractError::source_unavailable(err.address().to_string(), err.to_string())
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
