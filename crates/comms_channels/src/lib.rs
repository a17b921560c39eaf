//! # Comms Channel System
//!
//! A channel registry and pub/sub broadcast engine for game servers: named,
//! addressable groups of subscribers used to scope chat-style traffic —
//! global chat, proximity chat, radios, phone calls, team chat, private
//! whispers, admin channels.
//!
//! ## Core Features
//!
//! - **Channel lifecycle**: create / get-or-create / delete, plus
//!   specialized constructors for proximity and private channels
//! - **Subscription management**: capacity-bounded, idempotent, with
//!   per-subscription metadata
//! - **Validator-gated broadcast**: a pluggable authorization hook checked
//!   on the authoritative side of every subscribe and broadcast
//! - **Dual-mode execution**: the same [`ChannelRegistry`] operations run
//!   locally in the authoritative process or delegate transparently to a
//!   remote authority over a typed procedure boundary
//! - **Ownership cleanup**: the authority sweeps every channel a caller
//!   created when that caller's resource stops
//!
//! ## Architecture Overview
//!
//! Calling code holds an `Arc<dyn ChannelRegistry>` and cannot tell which
//! mode it is in:
//!
//! - [`LocalChannelRegistry`] owns the channel map, consults the validator,
//!   resolves subscriber snapshots at broadcast time and fans out through
//!   the host's [`NetworkTransport`].
//! - [`RemoteChannelRegistry`] forwards each operation as a named remote
//!   procedure and rebuilds replies into [`ChannelSnapshot`] values.
//! - [`ChannelExports`] is the authority's receiving side: it resolves raw
//!   client ids through the [`PlayerDirectory`] and converts local errors
//!   into falsy sentinels so nothing throws across the boundary.
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use comms_channels::{
//!     create_local_registry, CallerContext, ChannelId, ChannelMetadata, ChannelRegistry,
//!     ChannelType,
//! };
//! # async fn example(
//! #     transport: std::sync::Arc<dyn comms_channels::NetworkTransport>,
//! #     players: std::sync::Arc<dyn comms_channels::PlayerDirectory>,
//! # ) -> Result<(), comms_channels::ChannelError> {
//! let registry = create_local_registry(transport, players);
//! let ctx = CallerContext::core();
//!
//! registry
//!     .create(
//!         &ctx,
//!         ChannelId::from("global"),
//!         ChannelMetadata::of(ChannelType::Global).persistent(),
//!         None,
//!     )
//!     .await?;
//! registry
//!     .broadcast_system(&ChannelId::from("global"), "server is up", None, None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod channel;
pub mod context;
pub mod error;
pub mod exports;
pub mod registry;
pub mod rpc;
pub mod types;
pub mod utils;
pub mod validator;

// tests
#[cfg(test)]
mod test_integration;
#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items for convenience
pub use channel::{Channel, Subscriber};
pub use context::{NetworkTransport, PlayerDirectory, PlayerRef, CHAT_MESSAGE_EVENT};
pub use error::ChannelError;
pub use exports::ChannelExports;
pub use registry::{
    create_local_registry, create_remote_registry, ChannelRegistry, LocalChannelRegistry,
    RegistryStats, RemoteChannelRegistry,
};
pub use rpc::{procedures, RemoteProcedureClient, RpcError};
pub use types::{
    CallerContext, ChannelId, ChannelMetadata, ChannelSnapshot, ChannelType, ChatPayload,
    ClientId, Color, PlayerId, Position, SubscriptionMetadata,
};
pub use utils::current_timestamp;
pub use validator::ChannelValidator;

// External dependencies that hosts commonly need when implementing the
// capability traits
pub use async_trait::async_trait;
