//! Layered error definitions
//!
//! Categorized by source: config / source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// The reading could not be obtained
    #[error("reading source '{address}' unavailable: {message}")]
    SourceUnavailable { address: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    /// Sink authentication error (credentials or peer identity)
    #[error("sink '{sink_name}' authentication error: {message}")]
    SinkAuth { sink_name: String, message: String },

    /// Payload could not be encoded for a sink
    #[error("sink '{sink_name}' payload error: {message}")]
    SinkPayload { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source unavailable error
    pub fn source_unavailable(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink authentication error
    pub fn sink_auth(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkAuth {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink payload error
    pub fn sink_payload(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkPayload {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// True for errors that abort the whole run rather than a single sink
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::SourceUnavailable { .. }
        )
    }
}
