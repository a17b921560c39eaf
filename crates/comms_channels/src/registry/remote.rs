//! Delegated channel registry.
//!
//! This implementation holds no subscriber authority. Every operation is
//! forwarded to the authoritative registry as a named remote procedure with
//! serializable-only arguments, and replies are rebuilt into local
//! [`ChannelSnapshot`] value objects. Snapshots are return-value carriers,
//! not caches: repeated reads issue fresh round trips, so they can be slow
//! but never stale.
//!
//! Validator installation and bulk administration are authoritative-side
//! concerns; under delegation those calls log a warning and do nothing.

use super::ChannelRegistry;
use crate::context::{PlayerDirectory, PlayerRef};
use crate::error::ChannelError;
use crate::rpc::{
    procedures, BroadcastRequest, ChannelIdRequest, ChannelsByPlayerRequest,
    ChannelsByTypeRequest, CreateChannelRequest, CreatePrivateRequest, CreateProximityRequest,
    MembershipRequest, RemoteProcedureClient, RpcError, SubscribeRequest, SystemBroadcastRequest,
};
use crate::types::{
    CallerContext, ChannelId, ChannelMetadata, ChannelSnapshot, ChannelType, ClientId, Color,
    SubscriptionMetadata,
};
use crate::validator::ChannelValidator;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Remote, non-authoritative implementation of [`ChannelRegistry`].
pub struct RemoteChannelRegistry {
    /// Call surface into the authority's exported procedures
    rpc: Arc<dyn RemoteProcedureClient>,
    /// Local directory used to rehydrate subscriber lists from client ids
    players: Arc<dyn PlayerDirectory>,
    /// Name of the authoritative resource, for error messages
    authority: String,
}

impl RemoteChannelRegistry {
    /// Creates a delegate that forwards to the named authority.
    pub fn new(
        rpc: Arc<dyn RemoteProcedureClient>,
        players: Arc<dyn PlayerDirectory>,
        authority: impl Into<String>,
    ) -> Self {
        Self {
            rpc,
            players,
            authority: authority.into(),
        }
    }

    /// Encodes a request, performs one remote call, decodes the reply.
    async fn call<Req, Resp>(
        &self,
        procedure: &'static str,
        request: &Req,
    ) -> Result<Resp, ChannelError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let args = serde_json::to_value(request).map_err(|e| {
            ChannelError::Remote(format!("failed to encode {procedure} arguments: {e}"))
        })?;
        let reply = self
            .rpc
            .call(procedure, args)
            .await
            .map_err(|e| self.translate(e))?;
        serde_json::from_value(reply).map_err(|e| {
            ChannelError::Remote(format!(
                "malformed {procedure} reply from '{}': {e}",
                self.authority
            ))
        })
    }

    fn translate(&self, error: RpcError) -> ChannelError {
        match error {
            RpcError::Unavailable { reason, .. } => ChannelError::RemoteAuthorityUnavailable {
                authority: self.authority.clone(),
                reason,
            },
            RpcError::Transport(reason) => ChannelError::Remote(reason),
        }
    }

    /// The authority collapses its own errors to `null`; a declined
    /// creation therefore surfaces locally as an error, per the registry
    /// contract.
    fn require_created(
        &self,
        id: &ChannelId,
        reply: Option<ChannelSnapshot>,
    ) -> Result<ChannelSnapshot, ChannelError> {
        reply.ok_or_else(|| {
            ChannelError::Remote(format!(
                "authority '{}' declined to create channel '{}'",
                self.authority, id
            ))
        })
    }
}

#[async_trait]
impl ChannelRegistry for RemoteChannelRegistry {
    async fn create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError> {
        let request = CreateChannelRequest::new(ctx, id.clone(), metadata, max_subscribers);
        let reply = self
            .call::<_, Option<ChannelSnapshot>>(procedures::CREATE_CHANNEL, &request)
            .await?;
        self.require_created(&id, reply)
    }

    async fn get_or_create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError> {
        let request = CreateChannelRequest::new(ctx, id.clone(), metadata, max_subscribers);
        let reply = self
            .call::<_, Option<ChannelSnapshot>>(procedures::GET_OR_CREATE_CHANNEL, &request)
            .await?;
        self.require_created(&id, reply)
    }

    async fn get(&self, id: &ChannelId) -> Result<Option<ChannelSnapshot>, ChannelError> {
        self.call(
            procedures::GET_CHANNEL,
            &ChannelIdRequest {
                channel_id: id.clone(),
            },
        )
        .await
    }

    async fn exists(&self, id: &ChannelId) -> Result<bool, ChannelError> {
        self.call(
            procedures::CHANNEL_EXISTS,
            &ChannelIdRequest {
                channel_id: id.clone(),
            },
        )
        .await
    }

    async fn delete(&self, id: &ChannelId) -> Result<bool, ChannelError> {
        self.call(
            procedures::DELETE_CHANNEL,
            &ChannelIdRequest {
                channel_id: id.clone(),
            },
        )
        .await
    }

    async fn subscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
        metadata: Option<SubscriptionMetadata>,
    ) -> Result<bool, ChannelError> {
        self.call(
            procedures::SUBSCRIBE_TO_CHANNEL,
            &SubscribeRequest {
                channel_id: id.clone(),
                client_id: player.client_id(),
                metadata,
            },
        )
        .await
    }

    async fn unsubscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError> {
        self.call(
            procedures::UNSUBSCRIBE_FROM_CHANNEL,
            &MembershipRequest {
                channel_id: id.clone(),
                client_id: player.client_id(),
            },
        )
        .await
    }

    async fn is_subscribed(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError> {
        self.call(
            procedures::IS_SUBSCRIBED_TO_CHANNEL,
            &MembershipRequest {
                channel_id: id.clone(),
                client_id: player.client_id(),
            },
        )
        .await
    }

    async fn broadcast(
        &self,
        id: &ChannelId,
        sender: Arc<dyn PlayerRef>,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError> {
        let delivered: bool = self
            .call(
                procedures::BROADCAST_TO_CHANNEL,
                &BroadcastRequest {
                    channel_id: id.clone(),
                    client_id: sender.client_id(),
                    message: message.to_string(),
                    author,
                    color,
                },
            )
            .await?;
        if !delivered {
            // The boundary collapses not-found and denial to `false`; both
            // are drops from the delegate's point of view.
            debug!("Broadcast on '{}' was not accepted by the authority", id);
        }
        Ok(())
    }

    async fn broadcast_system(
        &self,
        id: &ChannelId,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError> {
        let delivered: bool = self
            .call(
                procedures::BROADCAST_SYSTEM_TO_CHANNEL,
                &SystemBroadcastRequest {
                    channel_id: id.clone(),
                    message: message.to_string(),
                    author,
                    color,
                },
            )
            .await?;
        if !delivered {
            debug!("System broadcast on '{}' was not accepted by the authority", id);
        }
        Ok(())
    }

    async fn get_subscribers(
        &self,
        id: &ChannelId,
    ) -> Result<Vec<Arc<dyn PlayerRef>>, ChannelError> {
        let client_ids: Vec<ClientId> = self
            .call(
                procedures::GET_CHANNEL_SUBSCRIBERS,
                &ChannelIdRequest {
                    channel_id: id.clone(),
                },
            )
            .await?;
        Ok(self.players.get_many(&client_ids).await)
    }

    async fn get_channels_by_type(
        &self,
        channel_type: ChannelType,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        self.call(
            procedures::GET_CHANNELS_BY_TYPE,
            &ChannelsByTypeRequest { channel_type },
        )
        .await
    }

    async fn get_channels_by_player(
        &self,
        player: Arc<dyn PlayerRef>,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        self.call(
            procedures::GET_CHANNELS_BY_PLAYER,
            &ChannelsByPlayerRequest {
                client_id: player.client_id(),
            },
        )
        .await
    }

    async fn get_all_channels(&self) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        self.call(procedures::GET_ALL_CHANNELS, &()).await
    }

    async fn clear(&self) {
        warn!(
            "clear() is unsupported under delegation; bulk administration happens at '{}'",
            self.authority
        );
    }

    async fn clear_non_persistent(&self) {
        warn!(
            "clear_non_persistent() is unsupported under delegation; bulk administration happens at '{}'",
            self.authority
        );
    }

    async fn create_private(
        &self,
        ctx: &CallerContext,
        players: Vec<Arc<dyn PlayerRef>>,
        metadata: ChannelMetadata,
    ) -> Result<ChannelSnapshot, ChannelError> {
        let client_ids: Vec<ClientId> = players.iter().map(|p| p.client_id()).collect();
        let reply = self
            .call::<_, Option<ChannelSnapshot>>(
                procedures::CREATE_PRIVATE_CHANNEL,
                &CreatePrivateRequest {
                    owner: ctx.owner_id.clone(),
                    client_ids,
                    metadata,
                },
            )
            .await?;
        reply.ok_or_else(|| {
            ChannelError::Remote(format!(
                "authority '{}' declined to create a private channel",
                self.authority
            ))
        })
    }

    async fn create_proximity(
        &self,
        ctx: &CallerContext,
        origin: Arc<dyn PlayerRef>,
        radius: f64,
        id: Option<ChannelId>,
    ) -> Result<Option<ChannelSnapshot>, ChannelError> {
        self.call(
            procedures::CREATE_PROXIMITY_CHANNEL,
            &CreateProximityRequest {
                owner: ctx.owner_id.clone(),
                client_id: origin.client_id(),
                radius,
                channel_id: id,
            },
        )
        .await
    }

    async fn set_validator(&self, _validator: Option<Arc<dyn ChannelValidator>>) {
        warn!(
            "set_validator() is unsupported under delegation; validators live at '{}'",
            self.authority
        );
    }
}
