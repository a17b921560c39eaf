//! # Host Capability Interfaces
//!
//! This module defines the interfaces through which the channel system talks
//! to the surrounding server: player lookup, position queries, and the
//! message transport that performs the actual fan-out. The channel system
//! never owns a socket or a player session; it only consumes these
//! capabilities as trait objects supplied by the host.
//!
//! ## Thread Safety
//!
//! All capability implementations must be `Send + Sync`; registry operations
//! may invoke them from any task.

use crate::types::{ChatPayload, ClientId, PlayerId, Position};
use async_trait::async_trait;
use std::sync::Arc;

/// Event name used when fanning a channel broadcast out to clients.
///
/// Follows the host server's `namespace:event` routing convention.
pub const CHAT_MESSAGE_EVENT: &str = "chat:message";

/// Handle to a connected player.
///
/// Implementations wrap whatever entity type the host engine uses. Position
/// is queried live on every call and may be unavailable (player still
/// spawning, entity despawned), which callers must treat as "cannot
/// participate in spatial queries" rather than as an error.
pub trait PlayerRef: Send + Sync {
    /// Stable identity of this player.
    fn id(&self) -> PlayerId;

    /// Session-scoped network id the transport targets.
    fn client_id(&self) -> ClientId;

    /// Display name used as the default broadcast author.
    fn name(&self) -> &str;

    /// Current world position, if resolvable.
    fn position(&self) -> Option<Position>;
}

impl std::fmt::Debug for dyn PlayerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerRef")
            .field("id", &self.id())
            .field("client_id", &self.client_id())
            .field("name", &self.name())
            .finish()
    }
}

/// Directory of connected players, owned by the host's session layer.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Resolves a raw client id to a player, if connected.
    async fn get_by_client(&self, client_id: ClientId) -> Option<Arc<dyn PlayerRef>>;

    /// Returns every connected player.
    async fn get_all(&self) -> Vec<Arc<dyn PlayerRef>>;

    /// Resolves a batch of client ids; unresolvable ids are skipped.
    async fn get_many(&self, client_ids: &[ClientId]) -> Vec<Arc<dyn PlayerRef>>;
}

/// Fire-and-forget fan-out primitive provided by the host's network layer.
#[async_trait]
pub trait NetworkTransport: Send + Sync {
    /// Emits a named event carrying `payload` to every listed target.
    ///
    /// Delivery is best-effort; the channel system does not observe
    /// per-target outcomes.
    async fn emit_to_targets(&self, event_name: &str, targets: &[ClientId], payload: &ChatPayload);
}
