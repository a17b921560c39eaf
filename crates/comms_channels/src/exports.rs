//! Export boundary: the authority's remotely callable procedure surface.
//!
//! One handler per registry operation. Each handler resolves raw client ids
//! to live players, delegates to the local registry, and translates every
//! local error into a falsy sentinel (`false`, `null`, empty list) plus a
//! warning log — no error ever crosses the remote boundary. This is
//! deliberately asymmetric with the local API's throw-based contract: a
//! remote caller observes `false`/`null`, never a raised error.
//!
//! The boundary also consumes the host's "resource stopped" lifecycle
//! signal and sweeps every channel the stopping resource created.

use crate::context::{PlayerDirectory, PlayerRef};
use crate::error::ChannelError;
use crate::registry::{ChannelRegistry, LocalChannelRegistry};
use crate::rpc::{
    procedures, BroadcastRequest, ChannelIdRequest, ChannelsByPlayerRequest,
    ChannelsByTypeRequest, CreateChannelRequest, CreatePrivateRequest, CreateProximityRequest,
    MembershipRequest, SubscribeRequest, SystemBroadcastRequest,
};
use crate::types::{CallerContext, ChannelSnapshot, ClientId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remotely callable facade over a [`LocalChannelRegistry`].
pub struct ChannelExports {
    registry: Arc<LocalChannelRegistry>,
    players: Arc<dyn PlayerDirectory>,
}

impl ChannelExports {
    /// Creates the export surface for the given authoritative registry.
    pub fn new(registry: Arc<LocalChannelRegistry>, players: Arc<dyn PlayerDirectory>) -> Self {
        Self { registry, players }
    }

    /// Routes a named procedure call to its handler.
    ///
    /// Malformed arguments and unknown procedure names produce the same
    /// falsy results a failed operation would; remote callers never see a
    /// raised error.
    pub async fn dispatch(&self, procedure: &str, args: Value) -> Value {
        match procedure {
            procedures::CREATE_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.create_channel(request).await),
                None => Value::Null,
            },
            procedures::GET_OR_CREATE_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.get_or_create_channel(request).await),
                None => Value::Null,
            },
            procedures::GET_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.get_channel(request).await),
                None => Value::Null,
            },
            procedures::CHANNEL_EXISTS => match parse(procedure, args) {
                Some(request) => to_value(self.channel_exists(request).await),
                None => Value::Bool(false),
            },
            procedures::DELETE_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.delete_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::SUBSCRIBE_TO_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.subscribe_to_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::UNSUBSCRIBE_FROM_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.unsubscribe_from_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::IS_SUBSCRIBED_TO_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.is_subscribed_to_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::BROADCAST_TO_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.broadcast_to_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::BROADCAST_SYSTEM_TO_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.broadcast_system_to_channel(request).await),
                None => Value::Bool(false),
            },
            procedures::GET_CHANNEL_SUBSCRIBERS => match parse(procedure, args) {
                Some(request) => to_value(self.get_channel_subscribers(request).await),
                None => to_value(Vec::<ClientId>::new()),
            },
            procedures::GET_CHANNELS_BY_TYPE => match parse(procedure, args) {
                Some(request) => to_value(self.get_channels_by_type(request).await),
                None => to_value(Vec::<ChannelSnapshot>::new()),
            },
            procedures::GET_CHANNELS_BY_PLAYER => match parse(procedure, args) {
                Some(request) => to_value(self.get_channels_by_player(request).await),
                None => to_value(Vec::<ChannelSnapshot>::new()),
            },
            procedures::GET_ALL_CHANNELS => to_value(self.get_all_channels().await),
            procedures::CREATE_PRIVATE_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.create_private_channel(request).await),
                None => Value::Null,
            },
            procedures::CREATE_PROXIMITY_CHANNEL => match parse(procedure, args) {
                Some(request) => to_value(self.create_proximity_channel(request).await),
                None => Value::Null,
            },
            other => {
                warn!("📪 Unknown channel procedure '{}'", other);
                Value::Null
            }
        }
    }

    /// Sweeps every channel the stopped resource created.
    pub async fn resource_stopped(&self, resource: &str) {
        info!("🧹 Resource '{}' stopped; sweeping its channels", resource);
        self.registry.release_owner(resource).await;
    }

    pub async fn create_channel(&self, request: CreateChannelRequest) -> Option<ChannelSnapshot> {
        let ctx = CallerContext::new(request.owner);
        drop_err(
            procedures::CREATE_CHANNEL,
            self.registry
                .create(&ctx, request.channel_id, request.metadata, request.max_subscribers)
                .await,
        )
    }

    pub async fn get_or_create_channel(
        &self,
        request: CreateChannelRequest,
    ) -> Option<ChannelSnapshot> {
        let ctx = CallerContext::new(request.owner);
        drop_err(
            procedures::GET_OR_CREATE_CHANNEL,
            self.registry
                .get_or_create(&ctx, request.channel_id, request.metadata, request.max_subscribers)
                .await,
        )
    }

    pub async fn get_channel(&self, request: ChannelIdRequest) -> Option<ChannelSnapshot> {
        drop_err(
            procedures::GET_CHANNEL,
            self.registry.get(&request.channel_id).await,
        )
        .flatten()
    }

    pub async fn channel_exists(&self, request: ChannelIdRequest) -> bool {
        drop_err(
            procedures::CHANNEL_EXISTS,
            self.registry.exists(&request.channel_id).await,
        )
        .unwrap_or(false)
    }

    pub async fn delete_channel(&self, request: ChannelIdRequest) -> bool {
        drop_err(
            procedures::DELETE_CHANNEL,
            self.registry.delete(&request.channel_id).await,
        )
        .unwrap_or(false)
    }

    pub async fn subscribe_to_channel(&self, request: SubscribeRequest) -> bool {
        let result = match self.resolve(request.client_id).await {
            Ok(player) => {
                self.registry
                    .subscribe(&request.channel_id, player, request.metadata)
                    .await
            }
            Err(e) => Err(e),
        };
        drop_err(procedures::SUBSCRIBE_TO_CHANNEL, result).unwrap_or(false)
    }

    pub async fn unsubscribe_from_channel(&self, request: MembershipRequest) -> bool {
        let result = match self.resolve(request.client_id).await {
            Ok(player) => self.registry.unsubscribe(&request.channel_id, player).await,
            Err(e) => Err(e),
        };
        drop_err(procedures::UNSUBSCRIBE_FROM_CHANNEL, result).unwrap_or(false)
    }

    pub async fn is_subscribed_to_channel(&self, request: MembershipRequest) -> bool {
        let result = match self.resolve(request.client_id).await {
            Ok(player) => self.registry.is_subscribed(&request.channel_id, player).await,
            Err(e) => Err(e),
        };
        drop_err(procedures::IS_SUBSCRIBED_TO_CHANNEL, result).unwrap_or(false)
    }

    pub async fn broadcast_to_channel(&self, request: BroadcastRequest) -> bool {
        let result = match self.resolve(request.client_id).await {
            Ok(sender) => {
                self.registry
                    .broadcast(
                        &request.channel_id,
                        sender,
                        &request.message,
                        request.author,
                        request.color,
                    )
                    .await
            }
            Err(e) => Err(e),
        };
        drop_err(procedures::BROADCAST_TO_CHANNEL, result).is_some()
    }

    pub async fn broadcast_system_to_channel(&self, request: SystemBroadcastRequest) -> bool {
        drop_err(
            procedures::BROADCAST_SYSTEM_TO_CHANNEL,
            self.registry
                .broadcast_system(
                    &request.channel_id,
                    &request.message,
                    request.author,
                    request.color,
                )
                .await,
        )
        .is_some()
    }

    pub async fn get_channel_subscribers(&self, request: ChannelIdRequest) -> Vec<ClientId> {
        drop_err(
            procedures::GET_CHANNEL_SUBSCRIBERS,
            self.registry.get_subscribers(&request.channel_id).await,
        )
        .map(|players| players.iter().map(|p| p.client_id()).collect())
        .unwrap_or_default()
    }

    pub async fn get_channels_by_type(
        &self,
        request: ChannelsByTypeRequest,
    ) -> Vec<ChannelSnapshot> {
        drop_err(
            procedures::GET_CHANNELS_BY_TYPE,
            self.registry.get_channels_by_type(request.channel_type).await,
        )
        .unwrap_or_default()
    }

    pub async fn get_channels_by_player(
        &self,
        request: ChannelsByPlayerRequest,
    ) -> Vec<ChannelSnapshot> {
        let result = match self.resolve(request.client_id).await {
            Ok(player) => self.registry.get_channels_by_player(player).await,
            Err(e) => Err(e),
        };
        drop_err(procedures::GET_CHANNELS_BY_PLAYER, result).unwrap_or_default()
    }

    pub async fn get_all_channels(&self) -> Vec<ChannelSnapshot> {
        drop_err(
            procedures::GET_ALL_CHANNELS,
            self.registry.get_all_channels().await,
        )
        .unwrap_or_default()
    }

    pub async fn create_private_channel(
        &self,
        request: CreatePrivateRequest,
    ) -> Option<ChannelSnapshot> {
        let members = self.players.get_many(&request.client_ids).await;
        if members.len() != request.client_ids.len() {
            debug!(
                "createPrivateChannel: {} of {} member(s) unresolvable, skipping them",
                request.client_ids.len() - members.len(),
                request.client_ids.len()
            );
        }
        if members.is_empty() && !request.client_ids.is_empty() {
            warn!("createPrivateChannel failed: no requested member is connected");
            return None;
        }
        let ctx = CallerContext::new(request.owner);
        drop_err(
            procedures::CREATE_PRIVATE_CHANNEL,
            self.registry
                .create_private(&ctx, members, request.metadata)
                .await,
        )
    }

    pub async fn create_proximity_channel(
        &self,
        request: CreateProximityRequest,
    ) -> Option<ChannelSnapshot> {
        let result = match self.resolve(request.client_id).await {
            Ok(origin) => {
                let ctx = CallerContext::new(request.owner);
                self.registry
                    .create_proximity(&ctx, origin, request.radius, request.channel_id)
                    .await
            }
            Err(e) => Err(e),
        };
        drop_err(procedures::CREATE_PROXIMITY_CHANNEL, result).flatten()
    }

    async fn resolve(&self, client_id: ClientId) -> Result<Arc<dyn PlayerRef>, ChannelError> {
        self.players
            .get_by_client(client_id)
            .await
            .ok_or(ChannelError::PlayerNotFound { client_id })
    }
}

/// Collapses a local error to `None` with a warning; the remote caller only
/// ever sees the falsy sentinel.
fn drop_err<T>(procedure: &str, result: Result<T, ChannelError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed at the boundary: {}", procedure, e);
            None
        }
    }
}

fn parse<T: DeserializeOwned>(procedure: &str, args: Value) -> Option<T> {
    match serde_json::from_value(args) {
        Ok(request) => Some(request),
        Err(e) => {
            warn!("Rejected malformed '{}' arguments: {}", procedure, e);
            None
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
