//! Channel service wiring.
//!
//! Builds the right registry for the configured mode and hands the rest of
//! the host a uniform `Arc<dyn ChannelRegistry>`:
//!
//! - **Core mode**: an authoritative [`LocalChannelRegistry`] plus its
//!   [`ChannelExports`] surface, with the configured static channels seeded
//!   at startup.
//! - **Resource mode**: a [`RemoteChannelRegistry`] delegating to the
//!   configured authority; no exports, no local state.

use crate::config::{CommsConfig, ServiceMode};
use comms_channels::{
    create_local_registry, create_remote_registry, CallerContext, ChannelError, ChannelExports,
    ChannelId, ChannelMetadata, ChannelRegistry, NetworkTransport, PlayerDirectory,
    RemoteProcedureClient,
};
use std::sync::Arc;
use tracing::{debug, info};

/// A wired channel service instance.
pub struct ChannelService {
    config: CommsConfig,
    registry: Arc<dyn ChannelRegistry>,
    exports: Option<Arc<ChannelExports>>,
}

impl ChannelService {
    /// Builds an authoritative (core mode) service and seeds its static
    /// channels.
    pub async fn new_core(
        config: CommsConfig,
        transport: Arc<dyn NetworkTransport>,
        players: Arc<dyn PlayerDirectory>,
    ) -> Result<Self, ChannelError> {
        let local = create_local_registry(transport, players.clone());
        let exports = Arc::new(ChannelExports::new(local.clone(), players));
        let service = Self {
            config,
            registry: local,
            exports: Some(exports),
        };
        service.seed_static_channels().await?;
        info!(
            "🚀 Channel service up in core mode as '{}'",
            service.config.service.resource_name
        );
        Ok(service)
    }

    /// Builds a delegating (resource mode) service against the configured
    /// authority.
    pub fn new_resource(
        config: CommsConfig,
        rpc: Arc<dyn RemoteProcedureClient>,
        players: Arc<dyn PlayerDirectory>,
    ) -> Self {
        let registry =
            create_remote_registry(rpc, players, config.service.authority.clone());
        info!(
            "🚀 Channel service up in resource mode as '{}', delegating to '{}'",
            config.service.resource_name, config.service.authority
        );
        Self {
            config,
            registry,
            exports: None,
        }
    }

    /// The registry the rest of the host should talk to.
    pub fn registry(&self) -> Arc<dyn ChannelRegistry> {
        self.registry.clone()
    }

    /// The export surface, present only in core mode.
    pub fn exports(&self) -> Option<Arc<ChannelExports>> {
        self.exports.clone()
    }

    /// Mode this instance was built in.
    pub fn mode(&self) -> ServiceMode {
        self.config.service.mode
    }

    /// Default radius for proximity channels.
    pub fn proximity_default_radius(&self) -> f64 {
        self.config.channels.proximity_default_radius
    }

    /// Context attributing channel creations to this instance.
    pub fn caller_context(&self) -> CallerContext {
        CallerContext::new(self.config.service.resource_name.clone())
    }

    /// Forwards a "resource stopped" lifecycle signal to the authority-side
    /// cleanup. A no-op in resource mode; the authority observes the stop
    /// signal itself.
    pub async fn on_resource_stopped(&self, resource: &str) {
        match &self.exports {
            Some(exports) => exports.resource_stopped(resource).await,
            None => debug!(
                "Ignoring stop signal for '{}'; cleanup happens at '{}'",
                resource, self.config.service.authority
            ),
        }
    }

    async fn seed_static_channels(&self) -> Result<(), ChannelError> {
        let ctx = CallerContext::core();
        let seeds = &self.config.channels.static_channels;
        for seed in seeds {
            let mut metadata = ChannelMetadata::of(seed.channel_type);
            metadata.frequency = seed.frequency;
            metadata.persistent = seed.persistent;
            self.registry
                .get_or_create(
                    &ctx,
                    ChannelId::from(seed.id.clone()),
                    metadata,
                    seed.max_subscribers,
                )
                .await?;
        }
        if !seeds.is_empty() {
            info!("🌱 Seeded {} static channel(s)", seeds.len());
        }
        Ok(())
    }
}
