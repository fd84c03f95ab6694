//! Configuration resolution: file first, then command-line overrides.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

use config_loader::{ConfigFormat, ConfigLoader, RelayConfig};
use contracts::{DispatchMode, HostKeyPolicy};

use crate::cli::ConfigOverrides;

/// Required fields left blank, filled in by the overrides
const OVERRIDES_ONLY_BASE: &str = r#"{
    "key_path": "",
    "host": "",
    "temperature_host": "",
    "thingspeak_api_key": "",
    "thingsboard_api_key": "",
    "thingsboard_domain": ""
}"#;

impl ConfigOverrides {
    /// True when none of the six connection options was given
    pub fn is_empty(&self) -> bool {
        self.key_path.is_none()
            && self.host.is_none()
            && self.temperature_host.is_none()
            && self.thingspeak_api_key.is_none()
            && self.thingsboard_api_key.is_none()
            && self.thingsboard_domain.is_none()
    }

    /// Layer the overrides onto `config`
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(ref key_path) = self.key_path {
            info!(key_path = %key_path.display(), "Overriding key path from CLI");
            config.key_path = key_path.clone();
        }
        if let Some(ref host) = self.host {
            info!(host = %host, "Overriding remote host from CLI");
            config.host = host.clone();
        }
        if let Some(ref temperature_host) = self.temperature_host {
            info!(temperature_host = %temperature_host, "Overriding sensor address from CLI");
            config.temperature_host = temperature_host.clone();
        }
        if let Some(ref key) = self.thingspeak_api_key {
            config.thingspeak_api_key = key.clone();
        }
        if let Some(ref key) = self.thingsboard_api_key {
            config.thingsboard_api_key = key.clone();
        }
        if let Some(ref domain) = self.thingsboard_domain {
            info!(domain = %domain, "Overriding ThingsBoard domain from CLI");
            config.thingsboard_domain = domain.clone();
        }
        if let Some(ref known_hosts) = self.known_hosts {
            config.known_hosts_path = Some(known_hosts.clone());
        }
        if self.insecure_skip_host_key_check {
            warn!("Remote host key verification disabled from CLI");
            config.host_key_policy = HostKeyPolicy::Skip;
        }
        if self.sequential {
            config.dispatch_mode = DispatchMode::Sequential;
        }
        if let Some(secs) = self.sink_timeout {
            config.sink_timeout_secs = secs;
        }
    }
}

/// Load `path` (if present), apply `overrides`, then validate the result
pub fn resolve_config(path: &Path, overrides: &ConfigOverrides) -> Result<RelayConfig> {
    let mut config = if path.exists() {
        info!(config = %path.display(), "Loading configuration");
        ConfigLoader::parse_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else if !overrides.is_empty() {
        info!(config = %path.display(), "Configuration file not found, using command-line options");
        ConfigLoader::parse_str(OVERRIDES_ONLY_BASE, ConfigFormat::Json)
            .context("Failed to build configuration from command-line options")?
    } else {
        bail!("Configuration file not found: {}", path.display());
    };

    overrides.apply(&mut config);
    ConfigLoader::validate(&config).context("Invalid configuration")?;
    Ok(config)
}
