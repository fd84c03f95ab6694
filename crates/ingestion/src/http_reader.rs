//! HttpReader - fetches the reading with one HTTP GET

use std::time::Duration;

use contracts::{ContractError, Reading, ReadingSource};
use tracing::{debug, instrument, warn};

use crate::error::{IngestionError, Result};

/// Reads the sensor value from an HTTP endpoint
///
/// The response body is taken verbatim: no trimming, no parsing, no
/// content-type check.
pub struct HttpReader {
    address: String,
    client: reqwest::Client,
}

impl HttpReader {
    /// Create a reader with its own client bounded by `timeout`
    pub fn new(address: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(IngestionError::ClientBuild)?;

        Ok(Self::with_client(address, client))
    }

    /// Create a reader on top of an existing client
    pub fn with_client(address: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            address: address.into(),
            client,
        }
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.address)
            .send()
            .await
            .map_err(|source| IngestionError::Request {
                address: self.address.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::Status {
                address: self.address.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| IngestionError::Body {
            address: self.address.clone(),
            message: e.to_string(),
        })?;

        String::from_utf8(body.to_vec()).map_err(|e| IngestionError::Body {
            address: self.address.clone(),
            message: format!("body is not valid UTF-8: {e}"),
        })
    }
}

impl ReadingSource for HttpReader {
    fn address(&self) -> &str {
        &self.address
    }

    #[instrument(name = "http_reader_read", skip(self), fields(address = %self.address))]
    async fn read(&self) -> std::result::Result<Reading, ContractError> {
        match self.fetch().await {
            Ok(body) => {
                metrics::counter!("relay_readings_total", "status" => "ok").increment(1);
                debug!(bytes = body.len(), "Reading fetched");
                Ok(Reading::new(body))
            }
            Err(e) => {
                metrics::counter!("relay_readings_total", "status" => "error").increment(1);
                warn!(error = %e, "Reading unavailable");
                Err(e.into())
            }
        }
    }
}
