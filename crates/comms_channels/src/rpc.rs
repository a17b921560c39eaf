//! Remote procedure surface between a delegated registry and the channel
//! authority.
//!
//! Every registry operation maps 1:1 to a named procedure. Only primitive,
//! serializable values cross this boundary — channel ids, client ids,
//! numbers and plain metadata objects. No live player or channel references
//! are ever sent; subscriber lists travel as client ids and channels travel
//! as [`ChannelSnapshot`](crate::types::ChannelSnapshot)s.

use crate::types::{
    CallerContext, ChannelId, ChannelMetadata, ChannelType, ClientId, Color, SubscriptionMetadata,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the procedures exported by the channel authority.
pub mod procedures {
    pub const CREATE_CHANNEL: &str = "createChannel";
    pub const GET_OR_CREATE_CHANNEL: &str = "getOrCreateChannel";
    pub const GET_CHANNEL: &str = "getChannel";
    pub const CHANNEL_EXISTS: &str = "channelExists";
    pub const DELETE_CHANNEL: &str = "deleteChannel";
    pub const SUBSCRIBE_TO_CHANNEL: &str = "subscribeToChannel";
    pub const UNSUBSCRIBE_FROM_CHANNEL: &str = "unsubscribeFromChannel";
    pub const IS_SUBSCRIBED_TO_CHANNEL: &str = "isSubscribedToChannel";
    pub const BROADCAST_TO_CHANNEL: &str = "broadcastToChannel";
    pub const BROADCAST_SYSTEM_TO_CHANNEL: &str = "broadcastSystemToChannel";
    pub const GET_CHANNEL_SUBSCRIBERS: &str = "getChannelSubscribers";
    pub const GET_CHANNELS_BY_TYPE: &str = "getChannelsByType";
    pub const GET_CHANNELS_BY_PLAYER: &str = "getChannelsByPlayer";
    pub const GET_ALL_CHANNELS: &str = "getAllChannels";
    pub const CREATE_PRIVATE_CHANNEL: &str = "createPrivateChannel";
    pub const CREATE_PROXIMITY_CHANNEL: &str = "createProximityChannel";
}

/// Error types for remote procedure calls.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The remote endpoint is not running or not yet registered
    #[error("endpoint '{endpoint}' unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// The call left this process but failed in transit
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Typed call surface into a remote procedure host.
///
/// Implemented by the surrounding system over whatever IPC mechanism it
/// uses; the channel system only sees named calls with JSON arguments.
#[async_trait]
pub trait RemoteProcedureClient: Send + Sync {
    /// Invokes `procedure` on the remote host and returns its reply.
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, RpcError>;
}

/// Arguments for `createChannel` / `getOrCreateChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannelRequest {
    /// Resource identity creating the channel, recorded for cleanup
    pub owner: String,
    pub channel_id: ChannelId,
    pub metadata: ChannelMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subscribers: Option<usize>,
}

impl CreateChannelRequest {
    /// Builds a request attributed to the given caller.
    pub fn new(
        ctx: &CallerContext,
        channel_id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Self {
        Self {
            owner: ctx.owner_id.clone(),
            channel_id,
            metadata,
            max_subscribers,
        }
    }
}

/// Arguments for procedures addressed by channel id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelIdRequest {
    pub channel_id: ChannelId,
}

/// Arguments for `subscribeToChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub channel_id: ChannelId,
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SubscriptionMetadata>,
}

/// Arguments for membership queries and removal
/// (`unsubscribeFromChannel`, `isSubscribedToChannel`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRequest {
    pub channel_id: ChannelId,
    pub client_id: ClientId,
}

/// Arguments for `broadcastToChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub channel_id: ChannelId,
    /// Sender's client id; the authority re-resolves and re-validates it
    pub client_id: ClientId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Arguments for `broadcastSystemToChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemBroadcastRequest {
    pub channel_id: ChannelId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Arguments for `getChannelsByType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsByTypeRequest {
    pub channel_type: ChannelType,
}

/// Arguments for `getChannelsByPlayer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsByPlayerRequest {
    pub client_id: ClientId,
}

/// Arguments for `createPrivateChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrivateRequest {
    pub owner: String,
    pub client_ids: Vec<ClientId>,
    pub metadata: ChannelMetadata,
}

/// Arguments for `createProximityChannel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProximityRequest {
    pub owner: String,
    /// Client id of the origin player
    pub client_id: ClientId,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
}
