//! Relay service configuration
//!
//! Configuration is read from a TOML file. Every key has a default, so an
//! empty file is a valid configuration. Values are validated at load time so
//! a misconfigured service fails before it accepts any request.

use crate::core::constants::DEFAULT_OPENAI_MODEL;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default server port
const DEFAULT_PORT: u16 = 8082;

/// Default time a correlated caller waits for its response, in seconds
const DEFAULT_REPLY_TIMEOUT: u64 = 120;

/// Default number of intents buffered per passive bus subscriber
const DEFAULT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Model used when an OpenAI request names none
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Seconds a correlated caller waits before giving up
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout: u64,
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            reply_timeout: default_reply_timeout(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_reply_timeout() -> u64 {
    DEFAULT_REPLY_TIMEOUT
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The TOML file cannot be read or parsed
    /// - Configuration values are invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the file named by `CONFIG_PATH`
    ///
    /// Looks for config.toml in current directory by default
    pub fn from_env() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(config_path)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.relay.default_model.trim().is_empty(),
            "relay.default_model must not be empty"
        );
        ensure!(
            self.relay.reply_timeout > 0,
            "relay.reply_timeout must be greater than zero"
        );
        ensure!(
            self.relay.bus_capacity > 0,
            "relay.bus_capacity must be greater than zero"
        );
        Ok(())
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.relay.reply_timeout)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
