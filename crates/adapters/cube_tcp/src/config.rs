//! Cube connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// TCP port the cube listens on.
pub const DEFAULT_PORT: u16 = 62910;

/// Configuration for the cube client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Cube hostname or IP address.
    pub host: String,
    /// Cube TCP port.
    pub port: u16,
    /// Period of the heartbeat/reconnect timer, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// How long a command waits for its acknowledgment, in milliseconds.
    pub command_timeout_ms: u64,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl CubeConfig {
    /// Configuration for `host` with every other field at its default.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Heartbeat period, never shorter than one millisecond.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            heartbeat_interval_ms: 20_000,
            command_timeout_ms: 10_000,
            event_capacity: 64,
        }
    }
}
