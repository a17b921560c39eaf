//! Service configuration types and defaults.
//!
//! This module contains the TOML-backed configuration for a channel service
//! instance: which mode it runs in (authoritative core or delegating
//! resource), which channels to seed at startup, and how logging behaves.

use comms_channels::ChannelType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The default config could not be serialized back to disk
    #[error("Config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Execution mode of a channel service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// Authoritative instance owning the channel state
    Core,
    /// Delegating instance forwarding to a remote core
    Resource,
}

/// Top-level configuration for a channel service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommsConfig {
    /// Mode and identity settings
    pub service: ServiceSettings,
    /// Channel seeding and defaults
    #[serde(default)]
    pub channels: ChannelSettings,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Identity of this instance and of the authority it may delegate to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Whether this instance is the authority or a delegate
    pub mode: ServiceMode,
    /// Name this instance reports as the owner of channels it creates
    pub resource_name: String,
    /// Name of the authoritative instance (used in resource mode)
    pub authority: String,
}

/// Channel seeding and behavior defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Default radius for proximity channels when the caller gives none
    #[serde(default = "default_proximity_radius")]
    pub proximity_default_radius: f64,
    /// Channels created at startup (core mode only)
    #[serde(default)]
    pub static_channels: Vec<StaticChannel>,
}

/// One channel seeded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticChannel {
    /// Channel id, e.g. `global` or `radio:100`
    pub id: String,
    /// Channel flavor
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// Radio frequency, where applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Maximum subscriber count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subscribers: Option<usize>,
    /// Seeded channels survive non-persistent sweeps by default
    #[serde(default = "default_true")]
    pub persistent: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON instead of human-readable lines
    #[serde(default)]
    pub json_format: bool,
}

fn default_proximity_radius() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings {
                mode: ServiceMode::Core,
                resource_name: "comms".to_string(),
                authority: "comms".to_string(),
            },
            channels: ChannelSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            proximity_default_radius: default_proximity_radius(),
            static_channels: vec![StaticChannel {
                id: "global".to_string(),
                channel_type: ChannelType::Global,
                frequency: None,
                max_subscribers: None,
                persistent: true,
            }],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl CommsConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: CommsConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = CommsConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }
}
