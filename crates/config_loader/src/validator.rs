//! Config validation
//!
//! Rules:
//! - required strings are non-empty
//! - `host` is `host:port` with a numeric port
//! - `temperature_host` and `thingspeak_endpoint` are http(s) URLs
//! - `thingspeak_field` is 1..=8
//! - `thingsboard_scheme` is http or https
//! - `thingsboard_domain` is a bare authority (no scheme, no path)

use contracts::{ContractError, RelayConfig};

/// Validate a RelayConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    validate_required(config)?;
    validate_host(&config.host)?;
    validate_http_url("temperature_host", &config.temperature_host)?;
    validate_http_url("thingspeak_endpoint", &config.thingspeak_endpoint)?;
    validate_thingspeak_field(config.thingspeak_field)?;
    validate_thingsboard(config)?;
    Ok(())
}

fn validate_required(config: &RelayConfig) -> Result<(), ContractError> {
    let required = [
        ("key_path", config.key_path.as_os_str().is_empty()),
        ("host", config.host.trim().is_empty()),
        ("temperature_host", config.temperature_host.trim().is_empty()),
        ("thingspeak_api_key", config.thingspeak_api_key.trim().is_empty()),
        ("thingsboard_api_key", config.thingsboard_api_key.trim().is_empty()),
        ("thingsboard_domain", config.thingsboard_domain.trim().is_empty()),
        ("remote_user", config.remote_user.trim().is_empty()),
        ("remote_target_path", config.remote_target_path.trim().is_empty()),
    ];

    for (field, empty) in required {
        if empty {
            return Err(ContractError::config_validation(field, "cannot be empty"));
        }
    }
    Ok(())
}

fn validate_host(host: &str) -> Result<(), ContractError> {
    let (name, port) = host.rsplit_once(':').ok_or_else(|| {
        ContractError::config_validation("host", format!("expected host:port, got '{host}'"))
    })?;

    if name.is_empty() {
        return Err(ContractError::config_validation(
            "host",
            format!("missing host name in '{host}'"),
        ));
    }

    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(ContractError::config_validation(
            "host",
            format!("invalid port '{port}'"),
        )),
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ContractError> {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .ok_or_else(|| {
            ContractError::config_validation(
                field,
                format!("must start with http:// or https://, got '{value}'"),
            )
        })?;

    if rest.is_empty() {
        return Err(ContractError::config_validation(field, "missing host"));
    }
    Ok(())
}

fn validate_thingspeak_field(field: u8) -> Result<(), ContractError> {
    if (1..=8).contains(&field) {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            "thingspeak_field",
            format!("field index must be 1..=8, got {field}"),
        ))
    }
}

fn validate_thingsboard(config: &RelayConfig) -> Result<(), ContractError> {
    if !matches!(config.thingsboard_scheme.as_str(), "http" | "https") {
        return Err(ContractError::config_validation(
            "thingsboard_scheme",
            format!(
                "must be http or https, got '{}'",
                config.thingsboard_scheme
            ),
        ));
    }

    if config.thingsboard_domain.contains("://") || config.thingsboard_domain.contains('/') {
        return Err(ContractError::config_validation(
            "thingsboard_domain",
            "expected a bare domain without scheme or path",
        ));
    }
    Ok(())
}
