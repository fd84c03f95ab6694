//! RelayConfig - Config Loader output
//!
//! Describes the whole run: where the reading comes from, and how to reach
//! each of the three sinks.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete relay configuration
///
/// Loaded once at startup and passed by reference to every component.
/// The six legacy camelCase option names are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Private key used for the remote shell session
    #[serde(alias = "keyPath")]
    pub key_path: PathBuf,

    /// Remote shell host (`host:port`)
    pub host: String,

    /// Sensor address (http/https URL)
    #[serde(alias = "temperatureHost")]
    pub temperature_host: String,

    /// ThingSpeak channel write key
    #[serde(alias = "thingspeakApiKey")]
    pub thingspeak_api_key: String,

    /// ThingsBoard device access token
    #[serde(alias = "thingsboardApiKey")]
    pub thingsboard_api_key: String,

    /// ThingsBoard server domain
    #[serde(alias = "thingsboardDomain")]
    pub thingsboard_domain: String,

    /// Remote login user
    #[serde(default = "default_remote_user")]
    pub remote_user: String,

    /// File rewritten on the remote host
    #[serde(default = "default_remote_target_path")]
    pub remote_target_path: String,

    /// How the remote host identity is checked
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    /// known_hosts file (None = `$HOME/.ssh/known_hosts`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_hosts_path: Option<PathBuf>,

    /// ThingSpeak API base URL
    #[serde(default = "default_thingspeak_endpoint")]
    pub thingspeak_endpoint: String,

    /// ThingSpeak field index carrying the reading
    #[serde(default = "default_thingspeak_field")]
    pub thingspeak_field: u8,

    /// ThingsBoard URL scheme
    #[serde(default = "default_thingsboard_scheme")]
    pub thingsboard_scheme: String,

    /// Sink scheduling
    #[serde(default)]
    pub dispatch_mode: DispatchMode,

    /// Sensor request timeout (seconds)
    #[serde(default = "default_reader_timeout_secs")]
    pub reader_timeout_secs: u64,

    /// Per-sink timeout (seconds, 0 = unbounded)
    #[serde(default = "default_sink_timeout_secs")]
    pub sink_timeout_secs: u64,
}

fn default_remote_user() -> String {
    "root".to_string()
}

fn default_remote_target_path() -> String {
    "/var/www/html/index.html".to_string()
}

fn default_thingspeak_endpoint() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_thingspeak_field() -> u8 {
    1
}

fn default_thingsboard_scheme() -> String {
    "https".to_string()
}

fn default_reader_timeout_secs() -> u64 {
    10
}

fn default_sink_timeout_secs() -> u64 {
    30
}

impl RelayConfig {
    /// Sensor request timeout
    pub fn reader_timeout(&self) -> Duration {
        Duration::from_secs(self.reader_timeout_secs)
    }

    /// Per-sink timeout, None when unbounded
    pub fn sink_timeout(&self) -> Option<Duration> {
        match self.sink_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// known_hosts file to verify the remote host against
    pub fn resolved_known_hosts_path(&self) -> Option<PathBuf> {
        self.known_hosts_path.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".ssh/known_hosts"))
        })
    }
}

/// Remote host identity policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyPolicy {
    /// Require the host key to match a known_hosts entry
    #[default]
    Verify,
    /// Accept any host key (insecure, development only)
    Skip,
}

/// How the dispatcher schedules sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// All sinks run as concurrent tasks behind a join barrier
    #[default]
    Concurrent,
    /// Sinks run one after another
    Sequential,
}
