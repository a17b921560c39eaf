//! # Comms Service Harness
//!
//! Host-facing wiring for the channel system: TOML configuration, logging
//! setup, and construction of a [`ChannelService`] in either execution mode.
//!
//! The harness owns no game logic and no I/O beyond the config file — the
//! host injects its transport, player directory, and (in resource mode) the
//! remote procedure client.

pub mod config;
pub mod logging;
pub mod service;

pub use config::{
    ChannelSettings, CommsConfig, ConfigError, LoggingSettings, ServiceMode, ServiceSettings,
    StaticChannel,
};
pub use logging::setup_logging;
pub use service::ChannelService;
