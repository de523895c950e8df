//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `maxcube.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use maxcube_adapter_tcp::CubeConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cube connection settings.
    pub cube: CubeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `maxcube.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("maxcube.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MAXCUBE_HOST") {
            self.cube.host = val;
        }
        if let Some(port) = var("MAXCUBE_PORT").and_then(|val| val.parse().ok()) {
            self.cube.port = port;
        }
        if let Some(interval) = var("MAXCUBE_HEARTBEAT_MS").and_then(|val| val.parse().ok()) {
            self.cube.heartbeat_interval_ms = interval;
        }
        if let Some(val) = var("MAXCUBE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cube.host.is_empty() {
            return Err(ConfigError::Validation("cube host must not be empty".to_string()));
        }
        if self.cube.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.cube.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "heartbeat interval must be non-zero".to_string(),
            ));
        }
        if self.cube.command_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "command timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "maxcubed=info,maxcube=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
