//! ThingSpeakSink - writes the reading to one field of a ThingSpeak channel

use std::collections::BTreeMap;

use contracts::{ContractError, DataSink, Delivery, DispatchJob, RelayConfig};
use tracing::{debug, instrument};

/// ThingSpeak rejects field values longer than this
pub const MAX_FIELD_LEN: usize = 255;

/// Highest field index of a ThingSpeak channel
pub const MAX_FIELD_INDEX: u8 = 8;

/// Pending update of a channel's fields
#[derive(Debug, Clone, Default)]
pub struct ChannelUpdate {
    fields: BTreeMap<u8, String>,
}

impl ChannelUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` for field `index`
    ///
    /// Returns false, leaving the update unchanged, when the index is outside
    /// 1..=8 or the value is blank or longer than 255 characters.
    pub fn add_field(&mut self, index: u8, value: &str) -> bool {
        if !(1..=MAX_FIELD_INDEX).contains(&index) {
            return false;
        }
        if value.trim().is_empty() || value.chars().count() > MAX_FIELD_LEN {
            return false;
        }
        self.fields.insert(index, value.to_string());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Form parameters for the update request
    pub fn form(&self, api_key: &str) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(self.fields.len() + 1);
        form.push(("api_key".to_string(), api_key.to_string()));
        for (index, value) in &self.fields {
            form.push((format!("field{index}"), value.clone()));
        }
        form
    }
}

/// Configuration for ThingSpeakSink
#[derive(Debug, Clone)]
pub struct ThingSpeakConfig {
    /// Channel write key
    pub api_key: String,
    /// API base URL
    pub endpoint: String,
    /// Field index carrying the reading
    pub field: u8,
}

impl ThingSpeakConfig {
    /// Create config from the relay configuration
    pub fn from_relay_config(config: &RelayConfig) -> Self {
        Self {
            api_key: config.thingspeak_api_key.clone(),
            endpoint: config.thingspeak_endpoint.clone(),
            field: config.thingspeak_field,
        }
    }

    /// URL of the update endpoint
    pub fn update_url(&self) -> String {
        format!("{}/update", self.endpoint.trim_end_matches('/'))
    }
}

/// Sink that writes the reading to a ThingSpeak channel
pub struct ThingSpeakSink {
    name: String,
    config: ThingSpeakConfig,
    client: reqwest::Client,
}

impl ThingSpeakSink {
    /// Create a new ThingSpeakSink
    pub fn new(name: impl Into<String>, config: ThingSpeakConfig, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            config,
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
        Ok(Self::new(name, ThingSpeakConfig::from_relay_config(config), client))
    }

    async fn submit(&self, update: &ChannelUpdate) -> Result<String, ContractError> {
        let response = self
            .client
            .post(self.config.update_url())
            .form(&update.form(&self.config.api_key))
            .send()
            .await
            .map_err(|e| ContractError::sink_connection(&self.name, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        if !status.is_success() {
            return Err(ContractError::sink_write(
                &self.name,
                format!("update answered {status}: {}", body.trim()),
            ));
        }

        // Entry id of the new record; 0 means the update was not accepted
        let entry_id = body.trim();
        if entry_id.is_empty() || entry_id == "0" {
            return Err(ContractError::sink_write(
                &self.name,
                "update rejected by channel (rate limit or invalid key)",
            ));
        }
        Ok(entry_id.to_string())
    }
}

impl DataSink for ThingSpeakSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "thingspeak_sink_deliver",
        skip(self, job),
        fields(sink = %self.name, field = self.config.field)
    )]
    async fn deliver(&mut self, job: &DispatchJob) -> Result<Delivery, ContractError> {
        let mut update = ChannelUpdate::new();
        if !update.add_field(self.config.field, job.reading.value()) {
            return Ok(Delivery::Skipped {
                reason: format!("field{} rejected the reading", self.config.field),
            });
        }

        let entry_id = self.submit(&update).await?;
        debug!(sink = %self.name, entry_id = %entry_id, "Channel updated");
        Ok(Delivery::Delivered)
    }

    #[instrument(name = "thingspeak_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
