//! Configuration loading.
//!
//! One TOML file describes every server connection the bot maintains plus
//! the optional listener backends. Timing knobs are policy, not constants:
//! the defaults match long-standing bot behavior but every delay can be
//! tuned per deployment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Session timing policy (reconnect, rejoin, nick revert, idle timeout).
    #[serde(default)]
    pub timing: TimingConfig,
    /// Weather listener backend; the listener is registered only when set.
    pub weather: Option<WeatherConfig>,
    /// Fact listener storage; the listener is registered only when set.
    pub facts: Option<FactsConfig>,
    /// Server connections, one session each.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// One server connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 6697 with TLS, 6667 without).
    pub port: Option<u16>,
    /// Connect over TLS.
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate (default: true).
    #[serde(default = "default_true")]
    pub tls_verify: bool,
    /// Server password, sent as PASS before registration.
    pub server_password: Option<String>,
    /// Nickname to register with.
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Channels to join once registered, in order.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl ConnectionConfig {
    /// The port to dial, applying the protocol defaults.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { 6697 } else { 6667 })
    }
}

/// One channel membership.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, including the leading `#`.
    pub name: String,
    /// Channel key, if the channel requires one.
    pub key: Option<String>,
    /// Listener names that must never run for messages in this channel.
    #[serde(default)]
    pub disabled_listeners: Vec<String>,
}

/// Session timing policy.
///
/// Delays are fixed per deployment; there is no backoff growth and no retry
/// ceiling. The worst case is a session redialing at a steady cadence until
/// the server comes back.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Seconds to wait before redialing after a connection drops (default: 60).
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,

    /// Seconds to wait before rejoining a channel after being kicked (default: 10).
    #[serde(default = "default_rejoin_secs")]
    pub rejoin_secs: u64,

    /// Seconds to hold a collision-suffixed nickname before trying to take
    /// the configured one back (default: 180).
    #[serde(default = "default_nick_revert_secs")]
    pub nick_revert_secs: u64,

    /// Seconds of inactivity after which the connection is considered dead
    /// (default: 180).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl TimingConfig {
    /// Delay before redialing a dropped connection.
    pub fn reconnect(&self) -> Duration {
        Duration::from_secs(self.reconnect_secs)
    }

    /// Delay before rejoining a channel after a kick.
    pub fn rejoin(&self) -> Duration {
        Duration::from_secs(self.rejoin_secs)
    }

    /// Hold period for a collision-suffixed nickname.
    pub fn nick_revert(&self) -> Duration {
        Duration::from_secs(self.nick_revert_secs)
    }

    /// Inactivity window before a connection is treated as dead.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reconnect_secs: default_reconnect_secs(),
            rejoin_secs: default_rejoin_secs(),
            nick_revert_secs: default_nick_revert_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Weather listener backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// REST endpoint queried as `<base_url>/<location>`.
    pub base_url: String,
    /// Locations reported for each `!weather` request, in order.
    pub locations: Vec<String>,
}

/// Fact listener storage.
#[derive(Debug, Clone, Deserialize)]
pub struct FactsConfig {
    /// Path of the JSON fact database.
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_nick() -> String {
    "lurkbot".to_string()
}

fn default_reconnect_secs() -> u64 {
    60
}

fn default_rejoin_secs() -> u64 {
    10
}

fn default_nick_revert_secs() -> u64 {
    180
}

fn default_idle_timeout_secs() -> u64 {
    180
}
