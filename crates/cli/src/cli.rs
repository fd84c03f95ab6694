//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Temp Relay - fetch one temperature reading and fan it out
#[derive(Parser, Debug)]
#[command(
    name = "temp-relay",
    author,
    version,
    about = "Relay one temperature reading to a web page, ThingSpeak and ThingsBoard",
    long_about = "Fetches a single temperature reading from an HTTP sensor and delivers it \n\
                  concurrently to three independent sinks: a page rewritten over SSH, a \n\
                  ThingSpeak channel and a ThingsBoard device. A failing sink never \n\
                  prevents the others from completing."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TEMP_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TEMP_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the reading and deliver it to every sink
    Run(RunArgs),

    /// Validate the resolved configuration without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Validate configuration and print the delivery plan without fetching
    #[arg(long)]
    pub dry_run: bool,

    /// Write Prometheus metrics to this file when the run ends
    #[arg(long, env = "RELAY_METRICS_TEXTFILE")]
    pub metrics_textfile: Option<PathBuf>,
}

/// Command-line overrides layered on top of the configuration file
///
/// When the file does not exist, the six connection options alone are
/// enough to run.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Private key for the remote shell session
    #[arg(long, env = "RELAY_KEY_PATH")]
    pub key_path: Option<PathBuf>,

    /// Remote shell host as host:port
    #[arg(long, env = "RELAY_HOST")]
    pub host: Option<String>,

    /// Sensor URL
    #[arg(long, env = "RELAY_TEMPERATURE_HOST")]
    pub temperature_host: Option<String>,

    /// ThingSpeak channel write key
    #[arg(long, env = "THINGSPEAK_API_KEY", hide_env_values = true)]
    pub thingspeak_api_key: Option<String>,

    /// ThingsBoard device access token
    #[arg(long, env = "THINGSBOARD_API_KEY", hide_env_values = true)]
    pub thingsboard_api_key: Option<String>,

    /// ThingsBoard server domain
    #[arg(long, env = "THINGSBOARD_DOMAIN")]
    pub thingsboard_domain: Option<String>,

    /// known_hosts file used to verify the remote host
    #[arg(long, env = "RELAY_KNOWN_HOSTS")]
    pub known_hosts: Option<PathBuf>,

    /// Accept any remote host key (insecure)
    #[arg(long)]
    pub insecure_skip_host_key_check: bool,

    /// Run the sinks one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Per-sink timeout in seconds (0 = no timeout)
    #[arg(long, env = "RELAY_SINK_TIMEOUT")]
    pub sink_timeout: Option<u64>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: PathBuf,

    /// Same overrides as `run`, so the checked configuration is the one a run would use
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
