//! Error types for channel registry operations.
//!
//! Mutating operations that reference a missing channel fail with
//! [`ChannelError::ChannelNotFound`]; read-only lookups on a missing channel
//! return empty/falsy results instead. Authorization denial is never an
//! error: it is a falsy return (subscribe) or a silent drop (broadcast), so
//! hot broadcast paths stay exception-free.

use crate::types::{ChannelId, ClientId};

/// Enumeration of channel system errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// A mutating operation referenced a channel id that is not registered
    #[error("Channel not found: {id}")]
    ChannelNotFound { id: ChannelId },

    /// `create` was called with an id that is already taken
    #[error("Channel already exists: {id}")]
    DuplicateChannel { id: ChannelId },

    /// A raw client id could not be resolved to a connected player
    #[error("Player not found for client {client_id}")]
    PlayerNotFound { client_id: ClientId },

    /// The authoritative registry could not be reached from delegated mode
    #[error(
        "Channel authority '{authority}' is unreachable ({reason}); \
         start the '{authority}' resource before any resource that delegates to it"
    )]
    RemoteAuthorityUnavailable { authority: String, reason: String },

    /// A remote call completed but the authority rejected it or replied
    /// with something the delegate could not interpret
    #[error("Remote channel operation failed: {0}")]
    Remote(String),
}
