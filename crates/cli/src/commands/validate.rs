//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{HostKeyPolicy, RelayConfig};

use crate::cli::ValidateArgs;
use crate::overrides::resolve_config;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    sensor: String,
    remote_host: String,
    remote_target_path: String,
    thingspeak_field: u8,
    thingsboard_domain: String,
    dispatch_mode: String,
    sink_timeout_secs: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match resolve_config(&args.config, &args.overrides) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    sensor: config.temperature_host.clone(),
                    remote_host: config.host.clone(),
                    remote_target_path: config.remote_target_path.clone(),
                    thingspeak_field: config.thingspeak_field,
                    thingsboard_domain: config.thingsboard_domain.clone(),
                    dispatch_mode: format!("{:?}", config.dispatch_mode).to_lowercase(),
                    sink_timeout_secs: config.sink_timeout_secs,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.host_key_policy == HostKeyPolicy::Skip {
        warnings.push("host_key_policy = skip - remote host identity is not verified".to_string());
    } else if config.resolved_known_hosts_path().is_none() {
        warnings.push("No known_hosts file - set known_hosts_path or HOME".to_string());
    }

    if config.sink_timeout().is_none() {
        warnings.push("sink_timeout_secs = 0 - a hung sink blocks the run forever".to_string());
    }

    if config.thingsboard_scheme == "http" {
        warnings.push("thingsboard_scheme = http - device token sent in clear text".to_string());
    }

    if config.thingspeak_endpoint.starts_with("http://") {
        warnings.push("thingspeak_endpoint is plain http - API key sent in clear text".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Sensor: {}", summary.sensor);
            println!(
                "  Remote: {} -> {}",
                summary.remote_host, summary.remote_target_path
            );
            println!("  ThingSpeak field: {}", summary.thingspeak_field);
            println!("  ThingsBoard: {}", summary.thingsboard_domain);
            println!(
                "  Dispatch: {} (sink timeout {}s)",
                summary.dispatch_mode, summary.sink_timeout_secs
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
