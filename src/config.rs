//! Server configuration.
//!
//! Values come from an optional TOML file, then the `PORT` environment
//! variable, then command-line flags, each layer overriding the last.

use crate::actor::DEFAULT_MAILBOX_CAPACITY;
use crate::session::SessionSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Per-side clock budget in seconds. No clock when absent.
    #[serde(default)]
    clock_seconds: Option<u64>,

    /// Starting position in FEN. Standard chess when absent.
    #[serde(default)]
    start_fen: Option<String>,

    /// Depth of the session actor's mailbox.
    #[serde(default = "default_mailbox_capacity")]
    mailbox_capacity: usize,
}

/// Longest per-side clock budget accepted, one week.
pub const MAX_CLOCK_SECONDS: u64 = 7 * 24 * 60 * 60;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_mailbox_capacity() -> usize {
    DEFAULT_MAILBOX_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter(),
            clock_seconds: None,
            start_fen: None,
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

/// Command-line values that override the file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Per-side clock budget in seconds.
    pub clock_seconds: Option<u64>,
    /// Starting position in FEN.
    pub start_fen: Option<String>,
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration: file (or defaults), then the
    /// `PORT` environment variable, then `overrides`.
    #[instrument(skip(overrides))]
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT {:?}: {}", port, e)))?;
        }

        config.apply(overrides);
        config.validate()?;
        info!(
            addr = %format!("{}:{}", config.host, config.port),
            clock_seconds = ?config.clock_seconds,
            custom_start = config.start_fen.is_some(),
            "Config loaded"
        );
        Ok(config)
    }

    /// Replaces fields that `overrides` sets.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(seconds) = overrides.clock_seconds {
            self.clock_seconds = Some(seconds);
        }
        if let Some(fen) = overrides.start_fen {
            self.start_fen = Some(fen);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.clock_seconds {
            Some(0) => return Err(ConfigError::new("clock_seconds must be positive")),
            Some(seconds) if seconds > MAX_CLOCK_SECONDS => {
                return Err(ConfigError::new(format!(
                    "clock_seconds must not exceed {}",
                    MAX_CLOCK_SECONDS
                )));
            }
            _ => {}
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::new("mailbox_capacity must be positive"));
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::new(format!("Invalid bind address: {}", e)))
    }

    /// Session tunables derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            clock: self.clock_seconds.map(Duration::from_secs),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port(), &3000);
        assert_eq!(config.mailbox_capacity(), &DEFAULT_MAILBOX_CAPACITY);
        assert!(config.session_settings().clock.is_none());
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host = \"0.0.0.0\"\nport = 8080\nclock_seconds = 300\nlog_filter = \"debug\""
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), &8080);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(
            config.session_settings().clock,
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.addr().unwrap().port(), 8080);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.message.contains("Failed to read config file"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::from_toml_str("port = \"high\"").is_err());
        assert!(ServerConfig::from_toml_str("clock_seconds = 0").is_err());
        assert!(ServerConfig::from_toml_str("mailbox_capacity = 0").is_err());
    }

    #[test]
    fn caps_clock_budget() {
        let at_cap = format!("clock_seconds = {}", MAX_CLOCK_SECONDS);
        assert!(ServerConfig::from_toml_str(&at_cap).is_ok());

        let over = format!("clock_seconds = {}", MAX_CLOCK_SECONDS + 1);
        let err = ServerConfig::from_toml_str(&over).unwrap_err();
        assert!(err.message.contains("must not exceed"));

        let err = ServerConfig::from_toml_str("clock_seconds = 9223372036854775807").unwrap_err();
        assert!(err.message.contains("must not exceed"));
        assert!(ServerConfig::from_toml_str("clock_seconds = 18446744073709551615").is_err());
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let mut config = ServerConfig::from_toml_str("port = 4000\nclock_seconds = 60").unwrap();
        config.apply(ConfigOverrides {
            host: Some("0.0.0.0".to_string()),
            ..Default::default()
        });
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), &4000);
        assert_eq!(config.clock_seconds(), &Some(60));
    }
}
