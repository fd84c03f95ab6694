//! Sink implementations
//!
//! Contains RemoteShellSink, ThingSpeakSink, and ThingsBoardSink.

mod remote_shell;
mod thingsboard;
mod thingspeak;

pub use self::remote_shell::{
    build_remote_command, RemoteShellConfig, RemoteShellSink, UNIX_DATE_FORMAT,
};
pub use self::thingsboard::{telemetry_url, TelemetryPayload, ThingsBoardSink};
pub use self::thingspeak::{ChannelUpdate, ThingSpeakConfig, ThingSpeakSink};

/// Sink name of the remote page updater
pub const REMOTE_SHELL_SINK: &str = "remote_shell";
/// Sink name of the ThingSpeak channel writer
pub const THINGSPEAK_SINK: &str = "thingspeak";
/// Sink name of the ThingsBoard telemetry poster
pub const THINGSBOARD_SINK: &str = "thingsboard";
