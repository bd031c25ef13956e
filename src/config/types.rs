//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{default_address, default_data_dir, default_idle_timeout, default_log_dir};

/// File names inside a bot's data directory.
const COMMANDS_FILE: &str = "commands.json";
const PROHIBITED_FILE: &str = "prohibited.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat server connection settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// One block per bot identity. Each runs on its own connection.
    #[serde(default, rename = "bot")]
    pub bots: Vec<BotConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text, normalizing channel names.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        for bot in &mut config.bots {
            bot.normalize();
        }
        Ok(config)
    }
}

/// Chat server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the chat server.
    #[serde(default = "default_address")]
    pub address: String,
    /// Seconds a single readiness wait may block (default: 120).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// One bot identity and everything it owns for the lifetime of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Login name.
    pub name: String,
    /// OAuth credential, sent as `PASS`.
    pub oauth: String,
    /// Channels joined at connect time.
    pub channels: Vec<String>,
    /// Users exempt from rate limiting and allowed to run admin commands.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Channels whose chat is appended to the daily log.
    #[serde(default)]
    pub record: Vec<String>,
    /// Whether the bot holds moderator privileges in its channels.
    #[serde(default)]
    pub moderator: bool,
    /// Minimum seconds between bot messages for non-admins (0 disables).
    #[serde(default)]
    pub restriction_seconds: u64,
    /// Directory holding `commands.json` and `prohibited.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Root directory for chat logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl BotConfig {
    pub fn commands_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(COMMANDS_FILE)
    }

    pub fn prohibited_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(PROHIBITED_FILE)
    }

    fn normalize(&mut self) {
        for list in [&mut self.channels, &mut self.record] {
            for channel in list.iter_mut() {
                *channel = normalize_channel(channel);
            }
        }
        for admin in &mut self.admins {
            *admin = admin.trim().to_lowercase();
        }
    }
}

/// `#MyChan` and `mychan` name the same channel.
fn normalize_channel(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}
