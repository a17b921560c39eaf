//! # Channel Registry
//!
//! The registry is the single source of truth for channel existence,
//! subscription and message fan-out. One trait, two independent
//! implementations selected at construction time:
//!
//! - [`LocalChannelRegistry`] — the authoritative instance. Owns the channel
//!   map, enforces the validator, resolves targets and calls the transport.
//! - [`RemoteChannelRegistry`] — a non-authoritative delegate. Holds no
//!   subscriber state and forwards every operation to the authority over a
//!   remote procedure boundary.
//!
//! Calling code works against `Arc<dyn ChannelRegistry>` and cannot tell
//! which side of the boundary it is on.

mod local;
mod remote;

pub use local::LocalChannelRegistry;
pub use remote::RemoteChannelRegistry;

use crate::context::{NetworkTransport, PlayerDirectory, PlayerRef};
use crate::error::ChannelError;
use crate::rpc::RemoteProcedureClient;
use crate::types::{
    CallerContext, ChannelId, ChannelMetadata, ChannelSnapshot, ChannelType, Color,
    SubscriptionMetadata,
};
use crate::validator::ChannelValidator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Operation surface shared by the authoritative registry and its remote
/// delegate.
///
/// Channel values returned by these methods are [`ChannelSnapshot`]s —
/// point-in-time views, never live handles. Mutating operations that
/// reference a missing channel fail with
/// [`ChannelError::ChannelNotFound`]; read-only queries on a missing channel
/// return empty or falsy results instead.
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    /// Creates a channel. Fails with [`ChannelError::DuplicateChannel`] if
    /// the id is already taken.
    async fn create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError>;

    /// Idempotent variant of [`create`](Self::create); returns the existing
    /// channel if the id is taken.
    async fn get_or_create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError>;

    /// Pure lookup.
    async fn get(&self, id: &ChannelId) -> Result<Option<ChannelSnapshot>, ChannelError>;

    /// Whether a channel with this id exists.
    async fn exists(&self, id: &ChannelId) -> Result<bool, ChannelError>;

    /// Clears and removes a channel. Returns `false` if it was absent
    /// (a no-op, not an error).
    async fn delete(&self, id: &ChannelId) -> Result<bool, ChannelError>;

    /// Subscribes a player. Returns `false` if the validator denies the
    /// subscription, the player is already subscribed, or the channel is
    /// full.
    async fn subscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
        metadata: Option<SubscriptionMetadata>,
    ) -> Result<bool, ChannelError>;

    /// Unsubscribes a player. Returns `false` if the channel is absent or
    /// the player was not subscribed.
    async fn unsubscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError>;

    /// Whether the player is subscribed; `false` if the channel is absent.
    async fn is_subscribed(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError>;

    /// Broadcasts a player message to the channel's current subscribers.
    ///
    /// The subscriber set is resolved at call time. A validator denial drops
    /// the message silently; an absent channel is an error. `author`
    /// defaults to the sender's display name, `color` to
    /// [`Color::WHITE`](crate::types::Color::WHITE).
    async fn broadcast(
        &self,
        id: &ChannelId,
        sender: Arc<dyn PlayerRef>,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError>;

    /// Broadcasts a system message, bypassing the validator.
    ///
    /// `author` defaults to `"SYSTEM"`, `color` to
    /// [`Color::SYSTEM`](crate::types::Color::SYSTEM).
    async fn broadcast_system(
        &self,
        id: &ChannelId,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError>;

    /// Current subscribers of a channel; empty if the channel is absent.
    async fn get_subscribers(
        &self,
        id: &ChannelId,
    ) -> Result<Vec<Arc<dyn PlayerRef>>, ChannelError>;

    /// Every channel of the given type.
    async fn get_channels_by_type(
        &self,
        channel_type: ChannelType,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError>;

    /// Every channel the player is subscribed to. Full scan; channel counts
    /// are small.
    async fn get_channels_by_player(
        &self,
        player: Arc<dyn PlayerRef>,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError>;

    /// Every registered channel.
    async fn get_all_channels(&self) -> Result<Vec<ChannelSnapshot>, ChannelError>;

    /// Clears every channel's subscribers and empties the registry —
    /// including persistent channels. Only
    /// [`clear_non_persistent`](Self::clear_non_persistent) honors the
    /// persistent flag.
    async fn clear(&self);

    /// Removes only channels whose metadata is not persistent; persistent
    /// channels and their subscribers are untouched.
    async fn clear_non_persistent(&self);

    /// Creates a private channel sized to the given players and subscribes
    /// all of them unconditionally (pre-authorized by construction).
    async fn create_private(
        &self,
        ctx: &CallerContext,
        players: Vec<Arc<dyn PlayerRef>>,
        metadata: ChannelMetadata,
    ) -> Result<ChannelSnapshot, ChannelError>;

    /// Creates a proximity channel centered on `origin`, subscribing every
    /// player within `radius` (inclusive) at creation time. Returns
    /// `Ok(None)` — and creates nothing — if the origin has no resolvable
    /// position. Membership is not re-evaluated afterwards.
    async fn create_proximity(
        &self,
        ctx: &CallerContext,
        origin: Arc<dyn PlayerRef>,
        radius: f64,
        id: Option<ChannelId>,
    ) -> Result<Option<ChannelSnapshot>, ChannelError>;

    /// Replaces the active validator, or clears it when `None`.
    /// Unsupported under delegation (logged warning, no-op).
    async fn set_validator(&self, validator: Option<Arc<dyn ChannelValidator>>);
}

/// Counters describing a registry's activity since construction.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Channels currently registered
    pub total_channels: usize,
    /// Subscriptions currently held across all channels
    pub total_subscribers: usize,
    /// Channels created since start
    pub channels_created: u64,
    /// Channels deleted since start
    pub channels_deleted: u64,
    /// Successful subscriptions since start
    pub subscriptions_added: u64,
    /// Broadcasts handed to the transport since start
    pub messages_broadcast: u64,
    /// Broadcasts dropped by the validator since start
    pub broadcasts_dropped: u64,
}

/// Creates an authoritative registry wired to the host's transport and
/// player directory.
pub fn create_local_registry(
    transport: Arc<dyn NetworkTransport>,
    players: Arc<dyn PlayerDirectory>,
) -> Arc<LocalChannelRegistry> {
    Arc::new(LocalChannelRegistry::new(transport, players))
}

/// Creates a delegated registry that forwards every operation to the named
/// authority through `rpc`.
pub fn create_remote_registry(
    rpc: Arc<dyn RemoteProcedureClient>,
    players: Arc<dyn PlayerDirectory>,
    authority: impl Into<String>,
) -> Arc<RemoteChannelRegistry> {
    Arc::new(RemoteChannelRegistry::new(rpc, players, authority))
}
