//! ThingsBoardSink - posts the reading as device telemetry

use contracts::{ContractError, DataSink, Delivery, DispatchJob, RelayConfig};
use serde::Serialize;
use tracing::{debug, instrument};

/// Telemetry body, `{"temperature":"<value>"}`
#[derive(Debug, Serialize)]
pub struct TelemetryPayload<'a> {
    pub temperature: &'a str,
}

/// Device telemetry URL for a ThingsBoard server
pub fn telemetry_url(scheme: &str, domain: &str, api_key: &str) -> String {
    format!("{scheme}://{domain}/api/v1/{api_key}/telemetry")
}

/// Sink that posts the reading to ThingsBoard
pub struct ThingsBoardSink {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl ThingsBoardSink {
    /// Create a new ThingsBoardSink posting to `url`
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }

    /// Create from the relay configuration (for factory)
    pub fn from_config(
        name: impl Into<String>,
        config: &RelayConfig,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))?;
        let url = telemetry_url(
            &config.thingsboard_scheme,
            &config.thingsboard_domain,
            &config.thingsboard_api_key,
        );
        Ok(Self::new(name, url, client))
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn encode(&self, value: &str) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(&TelemetryPayload { temperature: value })
            .map_err(|e| ContractError::sink_payload(&self.name, e.to_string()))
    }
}

impl DataSink for ThingsBoardSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "thingsboard_sink_deliver", skip(self, job), fields(sink = %self.name))]
    async fn deliver(&mut self, job: &DispatchJob) -> Result<Delivery, ContractError> {
        let body = self.encode(job.reading.value())?;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ContractError::sink_connection(&self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::sink_write(
                &self.name,
                format!("telemetry answered {status}"),
            ));
        }

        debug!(sink = %self.name, status = %status, "Telemetry posted");
        Ok(Delivery::Delivered)
    }

    #[instrument(name = "thingsboard_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
