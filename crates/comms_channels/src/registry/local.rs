//! Authoritative channel registry.
//!
//! This is the single source of truth for channel existence, subscription
//! and message fan-out in the authoritative process. The channel map is
//! owned exclusively by this instance; `Channel` objects never leave it —
//! callers only ever see [`ChannelSnapshot`]s. The `RwLock` around the map
//! makes each operation a single serialized unit of work, so per-channel
//! mutation has no read-modify-write window even under concurrent callers.

use super::{ChannelRegistry, RegistryStats};
use crate::channel::Channel;
use crate::context::{NetworkTransport, PlayerDirectory, PlayerRef, CHAT_MESSAGE_EVENT};
use crate::error::ChannelError;
use crate::types::{
    CallerContext, ChannelId, ChannelMetadata, ChannelSnapshot, ChannelType, ChatPayload, ClientId,
    Color, SubscriptionMetadata,
};
use crate::utils::{current_timestamp, random_suffix};
use crate::validator::ChannelValidator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default author attached to system broadcasts.
const SYSTEM_AUTHOR: &str = "SYSTEM";

/// Local, authoritative implementation of [`ChannelRegistry`].
pub struct LocalChannelRegistry {
    /// All registered channels, keyed by id
    channels: Arc<RwLock<HashMap<ChannelId, Channel>>>,
    /// Reverse index: owner identity to the channels it created
    owners: Arc<RwLock<HashMap<String, HashSet<ChannelId>>>>,
    /// Optional authorization hook, replaced wholesale by `set_validator`
    validator: Arc<RwLock<Option<Arc<dyn ChannelValidator>>>>,
    /// Fan-out primitive provided by the host
    transport: Arc<dyn NetworkTransport>,
    /// Player directory, used for proximity scans
    players: Arc<dyn PlayerDirectory>,
    /// Activity counters
    stats: Arc<RwLock<RegistryStats>>,
}

impl LocalChannelRegistry {
    /// Creates a new registry with no channels and no validator.
    pub fn new(transport: Arc<dyn NetworkTransport>, players: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            owners: Arc::new(RwLock::new(HashMap::new())),
            validator: Arc::new(RwLock::new(None)),
            transport,
            players,
            stats: Arc::new(RwLock::new(RegistryStats::default())),
        }
    }

    /// Deletes every channel the given owner created.
    ///
    /// Called when the owning resource signals it is stopping, so a caller
    /// that terminates without explicit cleanup leaves no orphaned channels
    /// behind. Returns the number of channels removed.
    pub async fn release_owner(&self, owner: &str) -> usize {
        let ids: Vec<ChannelId> = {
            let mut owners = self.owners.write().await;
            owners
                .remove(owner)
                .map(|set| set.into_iter().collect())
                .unwrap_or_default()
        };

        let mut removed = 0;
        for id in &ids {
            if self.delete(id).await.unwrap_or(false) {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("🧹 Released {} channel(s) owned by '{}'", removed, owner);
        }
        removed
    }

    /// Returns activity counters plus the current channel and subscriber
    /// totals.
    pub async fn stats(&self) -> RegistryStats {
        let mut stats = self.stats.read().await.clone();
        let channels = self.channels.read().await;
        stats.total_channels = channels.len();
        stats.total_subscribers = channels.values().map(|c| c.subscriber_count()).sum();
        stats
    }

    /// Clones the active validator out of its lock.
    async fn validator(&self) -> Option<Arc<dyn ChannelValidator>> {
        self.validator.read().await.clone()
    }

    /// Inserts a fully built channel, failing if the id is taken, and
    /// records ownership.
    async fn insert_new(
        &self,
        ctx: &CallerContext,
        channel: Channel,
    ) -> Result<ChannelSnapshot, ChannelError> {
        let id = channel.id.clone();
        let snapshot = {
            let mut channels = self.channels.write().await;
            if channels.contains_key(&id) {
                return Err(ChannelError::DuplicateChannel { id });
            }
            let snapshot = channel.snapshot();
            channels.insert(id.clone(), channel);
            snapshot
        };

        {
            let mut owners = self.owners.write().await;
            owners
                .entry(ctx.owner_id.clone())
                .or_default()
                .insert(id.clone());
        }
        {
            let mut stats = self.stats.write().await;
            stats.channels_created += 1;
        }
        info!("📡 Channel '{}' created by '{}'", id, ctx.owner_id);
        Ok(snapshot)
    }

    /// Drops a deleted channel id from every owner set.
    async fn forget_channel(&self, id: &ChannelId) {
        let mut owners = self.owners.write().await;
        owners.retain(|_, set| {
            set.remove(id);
            !set.is_empty()
        });
    }

    /// Resolves the current target list and emits one transport call.
    async fn fan_out(&self, id: &ChannelId, targets: Vec<ClientId>, payload: ChatPayload) {
        if targets.is_empty() {
            return;
        }
        debug!(
            "📨 Broadcasting to {} subscriber(s) of '{}'",
            targets.len(),
            id
        );
        self.transport
            .emit_to_targets(CHAT_MESSAGE_EVENT, &targets, &payload)
            .await;
        let mut stats = self.stats.write().await;
        stats.messages_broadcast += 1;
    }
}

#[async_trait]
impl ChannelRegistry for LocalChannelRegistry {
    async fn create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError> {
        self.insert_new(ctx, Channel::new(id, metadata, max_subscribers))
            .await
    }

    async fn get_or_create(
        &self,
        ctx: &CallerContext,
        id: ChannelId,
        metadata: ChannelMetadata,
        max_subscribers: Option<usize>,
    ) -> Result<ChannelSnapshot, ChannelError> {
        {
            let channels = self.channels.read().await;
            if let Some(existing) = channels.get(&id) {
                return Ok(existing.snapshot());
            }
        }
        match self
            .insert_new(ctx, Channel::new(id.clone(), metadata, max_subscribers))
            .await
        {
            // Lost a creation race after the lookup above; the winner's
            // channel is the one we want.
            Err(ChannelError::DuplicateChannel { .. }) => {
                let channels = self.channels.read().await;
                channels
                    .get(&id)
                    .map(|c| c.snapshot())
                    .ok_or(ChannelError::ChannelNotFound { id })
            }
            result => result,
        }
    }

    async fn get(&self, id: &ChannelId) -> Result<Option<ChannelSnapshot>, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels.get(id).map(|c| c.snapshot()))
    }

    async fn exists(&self, id: &ChannelId) -> Result<bool, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels.contains_key(id))
    }

    async fn delete(&self, id: &ChannelId) -> Result<bool, ChannelError> {
        let removed = {
            let mut channels = self.channels.write().await;
            match channels.remove(id) {
                Some(mut channel) => {
                    channel.clear();
                    true
                }
                None => false,
            }
        };
        if removed {
            self.forget_channel(id).await;
            let mut stats = self.stats.write().await;
            stats.channels_deleted += 1;
            info!("❌ Channel '{}' deleted", id);
        }
        Ok(removed)
    }

    async fn subscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
        metadata: Option<SubscriptionMetadata>,
    ) -> Result<bool, ChannelError> {
        let validator = self.validator().await;
        let added = {
            let mut channels = self.channels.write().await;
            let channel = channels
                .get_mut(id)
                .ok_or_else(|| ChannelError::ChannelNotFound { id: id.clone() })?;
            if validator
                .as_ref()
                .is_some_and(|v| !v.can_subscribe(player.as_ref(), id))
            {
                debug!(
                    "🚫 Subscription of {} to '{}' denied by validator",
                    player.client_id(),
                    id
                );
                return Ok(false);
            }
            channel.subscribe(player, metadata)
        };
        if added {
            let mut stats = self.stats.write().await;
            stats.subscriptions_added += 1;
        }
        Ok(added)
    }

    async fn unsubscribe(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError> {
        let mut channels = self.channels.write().await;
        Ok(channels
            .get_mut(id)
            .map(|channel| channel.unsubscribe(player.id()))
            .unwrap_or(false))
    }

    async fn is_subscribed(
        &self,
        id: &ChannelId,
        player: Arc<dyn PlayerRef>,
    ) -> Result<bool, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels
            .get(id)
            .map(|channel| channel.is_subscribed(player.id()))
            .unwrap_or(false))
    }

    async fn broadcast(
        &self,
        id: &ChannelId,
        sender: Arc<dyn PlayerRef>,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError> {
        let validator = self.validator().await;
        let targets = {
            let channels = self.channels.read().await;
            let channel = channels
                .get(id)
                .ok_or_else(|| ChannelError::ChannelNotFound { id: id.clone() })?;
            if validator
                .as_ref()
                .is_some_and(|v| !v.can_broadcast(sender.as_ref(), id))
            {
                None
            } else {
                Some(
                    channel
                        .subscribers()
                        .iter()
                        .map(|p| p.client_id())
                        .collect::<Vec<_>>(),
                )
            }
        };

        let Some(targets) = targets else {
            // Authorization denial is a silent drop, never an error.
            debug!(
                "🚫 Broadcast by {} on '{}' denied by validator, dropping",
                sender.client_id(),
                id
            );
            let mut stats = self.stats.write().await;
            stats.broadcasts_dropped += 1;
            return Ok(());
        };

        let author = author.unwrap_or_else(|| sender.name().to_string());
        let payload = ChatPayload::new(author, message, color.unwrap_or(Color::WHITE));
        self.fan_out(id, targets, payload).await;
        Ok(())
    }

    async fn broadcast_system(
        &self,
        id: &ChannelId,
        message: &str,
        author: Option<String>,
        color: Option<Color>,
    ) -> Result<(), ChannelError> {
        let targets = {
            let channels = self.channels.read().await;
            let channel = channels
                .get(id)
                .ok_or_else(|| ChannelError::ChannelNotFound { id: id.clone() })?;
            channel
                .subscribers()
                .iter()
                .map(|p| p.client_id())
                .collect::<Vec<_>>()
        };

        let author = author.unwrap_or_else(|| SYSTEM_AUTHOR.to_string());
        let payload = ChatPayload::new(author, message, color.unwrap_or(Color::SYSTEM));
        self.fan_out(id, targets, payload).await;
        Ok(())
    }

    async fn get_subscribers(
        &self,
        id: &ChannelId,
    ) -> Result<Vec<Arc<dyn PlayerRef>>, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels
            .get(id)
            .map(|channel| channel.subscribers())
            .unwrap_or_default())
    }

    async fn get_channels_by_type(
        &self,
        channel_type: ChannelType,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels
            .values()
            .filter(|c| c.metadata.channel_type == channel_type)
            .map(|c| c.snapshot())
            .collect())
    }

    async fn get_channels_by_player(
        &self,
        player: Arc<dyn PlayerRef>,
    ) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        let player_id = player.id();
        let channels = self.channels.read().await;
        Ok(channels
            .values()
            .filter(|c| c.is_subscribed(player_id))
            .map(|c| c.snapshot())
            .collect())
    }

    async fn get_all_channels(&self) -> Result<Vec<ChannelSnapshot>, ChannelError> {
        let channels = self.channels.read().await;
        Ok(channels.values().map(|c| c.snapshot()).collect())
    }

    async fn clear(&self) {
        // Persistent channels go too; only clear_non_persistent honors the
        // persistent flag.
        let count = {
            let mut channels = self.channels.write().await;
            for channel in channels.values_mut() {
                channel.clear();
            }
            let count = channels.len();
            channels.clear();
            count
        };
        self.owners.write().await.clear();
        let mut stats = self.stats.write().await;
        stats.channels_deleted += count as u64;
        info!("🧹 Cleared all {} channel(s)", count);
    }

    async fn clear_non_persistent(&self) {
        let removed: Vec<ChannelId> = {
            let mut channels = self.channels.write().await;
            let ids: Vec<ChannelId> = channels
                .iter()
                .filter(|(_, c)| !c.metadata.persistent)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &ids {
                if let Some(mut channel) = channels.remove(id) {
                    channel.clear();
                }
            }
            ids
        };
        for id in &removed {
            self.forget_channel(id).await;
        }
        let mut stats = self.stats.write().await;
        stats.channels_deleted += removed.len() as u64;
        info!("🧹 Cleared {} non-persistent channel(s)", removed.len());
    }

    async fn create_private(
        &self,
        ctx: &CallerContext,
        players: Vec<Arc<dyn PlayerRef>>,
        metadata: ChannelMetadata,
    ) -> Result<ChannelSnapshot, ChannelError> {
        let id = ChannelId::from(format!(
            "private:{}:{}",
            current_timestamp(),
            random_suffix()
        ));
        let mut metadata = metadata;
        metadata.persistent = false;

        let mut channel = Channel::new(id, metadata, Some(players.len()));
        // Members are pre-authorized by construction; no validator pass.
        for player in players {
            channel.subscribe(player, None);
        }
        self.insert_new(ctx, channel).await
    }

    async fn create_proximity(
        &self,
        ctx: &CallerContext,
        origin: Arc<dyn PlayerRef>,
        radius: f64,
        id: Option<ChannelId>,
    ) -> Result<Option<ChannelSnapshot>, ChannelError> {
        let Some(origin_pos) = origin.position() else {
            debug!(
                "Proximity channel for {} skipped: origin position unresolvable",
                origin.client_id()
            );
            return Ok(None);
        };

        let id = id.unwrap_or_else(|| {
            ChannelId::from(format!(
                "proximity:{}:{}",
                origin.client_id(),
                current_timestamp()
            ))
        });
        let metadata = ChannelMetadata::of(ChannelType::Proximity).with_max_range(radius);

        let mut channel = Channel::new(id, metadata, None);
        // Membership is computed once, right now; it is not re-evaluated as
        // players move. Candidates without a position cannot be ranged
        // against and are excluded.
        for candidate in self.players.get_all().await {
            let Some(pos) = candidate.position() else {
                continue;
            };
            if origin_pos.distance(pos) <= radius {
                channel.subscribe(candidate, None);
            }
        }

        self.insert_new(ctx, channel).await.map(Some)
    }

    async fn set_validator(&self, validator: Option<Arc<dyn ChannelValidator>>) {
        let installed = validator.is_some();
        *self.validator.write().await = validator;
        if installed {
            info!("🛡️ Channel validator installed");
        } else {
            info!("🛡️ Channel validator cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingTransport, StaticDirectory, TestPlayer};

    struct DenyBroadcasts;

    impl ChannelValidator for DenyBroadcasts {
        fn can_broadcast(&self, _player: &dyn PlayerRef, _channel_id: &ChannelId) -> bool {
            false
        }
    }

    struct DenySubscriptions;

    impl ChannelValidator for DenySubscriptions {
        fn can_subscribe(&self, _player: &dyn PlayerRef, _channel_id: &ChannelId) -> bool {
            false
        }
    }

    fn registry_with(
        players: Vec<Arc<dyn PlayerRef>>,
    ) -> (LocalChannelRegistry, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let directory = StaticDirectory::new(players);
        (
            LocalChannelRegistry::new(transport.clone(), directory),
            transport,
        )
    }

    fn group_meta() -> ChannelMetadata {
        ChannelMetadata::of(ChannelType::Group)
    }

    #[tokio::test]
    async fn duplicate_create_fails_without_side_effects() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("team:alpha");

        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("first create succeeds");
        let err = registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect_err("second create fails");
        assert!(matches!(err, ChannelError::DuplicateChannel { .. }));
        assert_eq!(registry.get_all_channels().await.expect("ok").len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_never_fails_on_duplicates() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("radio:100");

        let first = registry
            .get_or_create(&ctx, id.clone(), group_meta(), Some(4))
            .await
            .expect("created");
        let second = registry
            .get_or_create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("fetched");
        assert_eq!(first.id, second.id);
        assert_eq!(second.max_subscribers, Some(4));
        assert_eq!(registry.get_all_channels().await.expect("ok").len(), 1);
    }

    #[tokio::test]
    async fn subscribe_to_missing_channel_is_an_error() {
        let (registry, _) = registry_with(vec![]);
        let err = registry
            .subscribe(
                &ChannelId::from("nope"),
                TestPlayer::connected(1, "Ada"),
                None,
            )
            .await
            .expect_err("missing channel");
        assert!(matches!(err, ChannelError::ChannelNotFound { .. }));
    }

    #[tokio::test]
    async fn unsubscribe_and_is_subscribed_are_falsy_on_missing_channels() {
        let (registry, _) = registry_with(vec![]);
        let player = TestPlayer::connected(1, "Ada");
        let id = ChannelId::from("nope");

        assert!(!registry
            .unsubscribe(&id, player.clone())
            .await
            .expect("no error"));
        assert!(!registry
            .is_subscribed(&id, player)
            .await
            .expect("no error"));
        assert!(registry.get_subscribers(&id).await.expect("ok").is_empty());
    }

    #[tokio::test]
    async fn broadcast_targets_the_call_time_subscriber_set() {
        let (registry, transport) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("team:alpha");
        let a = TestPlayer::connected(1, "Ada");
        let b = TestPlayer::connected(2, "Brie");

        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("created");
        registry
            .subscribe(&id, a.clone(), None)
            .await
            .expect("subscribed");
        registry
            .subscribe(&id, b.clone(), None)
            .await
            .expect("subscribed");
        registry
            .unsubscribe(&id, b.clone())
            .await
            .expect("unsubscribed");

        registry
            .broadcast(&id, a.clone(), "hello", None, None)
            .await
            .expect("broadcast");

        let emitted = transport.take();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].event, CHAT_MESSAGE_EVENT);
        assert_eq!(emitted[0].targets, vec![ClientId(1)]);
        assert_eq!(emitted[0].payload.author, "Ada");
        assert_eq!(emitted[0].payload.message, "hello");
        assert_eq!(emitted[0].payload.color, Color::WHITE);
    }

    #[tokio::test]
    async fn broadcast_to_empty_channel_is_silent() {
        let (registry, transport) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("team:alpha");
        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("created");

        registry
            .broadcast(&id, TestPlayer::connected(1, "Ada"), "anyone?", None, None)
            .await
            .expect("no error");
        assert_eq!(transport.take().len(), 0);
    }

    #[tokio::test]
    async fn broadcast_to_missing_channel_is_an_error() {
        let (registry, _) = registry_with(vec![]);
        let err = registry
            .broadcast(
                &ChannelId::from("nope"),
                TestPlayer::connected(1, "Ada"),
                "hi",
                None,
                None,
            )
            .await
            .expect_err("missing channel");
        assert!(matches!(err, ChannelError::ChannelNotFound { .. }));
    }

    #[tokio::test]
    async fn validator_gates_broadcast_but_never_system_broadcast() {
        let (registry, transport) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("admin:staff");
        let player = TestPlayer::connected(1, "Ada");

        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("created");
        registry
            .subscribe(&id, player.clone(), None)
            .await
            .expect("subscribed");
        registry.set_validator(Some(Arc::new(DenyBroadcasts))).await;

        registry
            .broadcast(&id, player.clone(), "silenced", None, None)
            .await
            .expect("silent drop, not an error");
        assert_eq!(transport.take().len(), 0);

        registry
            .broadcast_system(&id, "maintenance in 5", None, None)
            .await
            .expect("system bypasses validator");
        let emitted = transport.take();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].payload.author, "SYSTEM");
        assert_eq!(emitted[0].payload.color, Color::SYSTEM);

        let stats = registry.stats().await;
        assert_eq!(stats.broadcasts_dropped, 1);
        assert_eq!(stats.messages_broadcast, 1);
    }

    #[tokio::test]
    async fn validator_denial_blocks_subscription_without_mutation() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("admin:staff");
        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("created");
        registry
            .set_validator(Some(Arc::new(DenySubscriptions)))
            .await;

        let player = TestPlayer::connected(1, "Ada");
        assert!(!registry
            .subscribe(&id, player.clone(), None)
            .await
            .expect("denied, not an error"));
        assert!(!registry.is_subscribed(&id, player).await.expect("ok"));

        registry.set_validator(None).await;
        assert!(registry
            .subscribe(&id, TestPlayer::connected(2, "Brie"), None)
            .await
            .expect("open again"));
    }

    #[tokio::test]
    async fn proximity_radius_boundary_is_inclusive() {
        let origin = TestPlayer::at(1, "Ada", 0.0, 0.0, 0.0);
        let on_edge = TestPlayer::at(2, "Brie", 10.0, 0.0, 0.0);
        let outside = TestPlayer::at(3, "Cleo", 10.0001, 0.0, 0.0);
        let unplaced = TestPlayer::unplaced(4, "Dane");
        let (registry, _) = registry_with(vec![
            origin.clone(),
            on_edge.clone(),
            outside.clone(),
            unplaced.clone(),
        ]);

        let snapshot = registry
            .create_proximity(&CallerContext::core(), origin.clone(), 10.0, None)
            .await
            .expect("no error")
            .expect("origin has a position");

        assert_eq!(snapshot.metadata.channel_type, ChannelType::Proximity);
        assert_eq!(snapshot.metadata.max_range, Some(10.0));
        assert!(!snapshot.metadata.persistent);
        assert_eq!(snapshot.subscriber_count, 2);
        assert!(registry
            .is_subscribed(&snapshot.id, origin)
            .await
            .expect("ok"));
        assert!(registry
            .is_subscribed(&snapshot.id, on_edge)
            .await
            .expect("ok"));
        assert!(!registry
            .is_subscribed(&snapshot.id, outside)
            .await
            .expect("ok"));
        assert!(!registry
            .is_subscribed(&snapshot.id, unplaced)
            .await
            .expect("ok"));
    }

    #[tokio::test]
    async fn proximity_without_origin_position_creates_nothing() {
        let origin = TestPlayer::unplaced(1, "Ada");
        let (registry, _) = registry_with(vec![origin.clone()]);

        let result = registry
            .create_proximity(&CallerContext::core(), origin, 10.0, None)
            .await
            .expect("no error");
        assert!(result.is_none());
        assert!(registry.get_all_channels().await.expect("ok").is_empty());
    }

    #[tokio::test]
    async fn clear_discards_persistent_channels_but_clear_non_persistent_spares_them() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let persistent_id = ChannelId::from("global");
        let transient_id = ChannelId::from("phone:123");
        let player = TestPlayer::connected(1, "Ada");

        registry
            .create(&ctx, persistent_id.clone(), group_meta().persistent(), None)
            .await
            .expect("created");
        registry
            .create(&ctx, transient_id.clone(), group_meta(), None)
            .await
            .expect("created");
        registry
            .subscribe(&persistent_id, player.clone(), None)
            .await
            .expect("subscribed");

        registry.clear_non_persistent().await;
        assert!(registry.exists(&persistent_id).await.expect("ok"));
        assert!(!registry.exists(&transient_id).await.expect("ok"));
        assert!(registry
            .is_subscribed(&persistent_id, player.clone())
            .await
            .expect("persistent subscribers untouched"));

        registry.clear().await;
        assert!(!registry.exists(&persistent_id).await.expect("ok"));
        assert!(registry.get_all_channels().await.expect("ok").is_empty());
    }

    #[tokio::test]
    async fn private_channels_subscribe_every_member_immediately() {
        let (registry, _) = registry_with(vec![]);
        let a = TestPlayer::connected(1, "Ada");
        let b = TestPlayer::connected(2, "Brie");

        let snapshot = registry
            .create_private(
                &CallerContext::core(),
                vec![a.clone(), b.clone()],
                ChannelMetadata::of(ChannelType::Phone),
            )
            .await
            .expect("created");

        assert!(snapshot.id.as_str().starts_with("private:"));
        assert_eq!(snapshot.subscriber_count, 2);
        assert_eq!(snapshot.max_subscribers, Some(2));
        assert!(!snapshot.metadata.persistent);
        assert!(registry.is_subscribed(&snapshot.id, a).await.expect("ok"));
        assert!(registry.is_subscribed(&snapshot.id, b).await.expect("ok"));

        // Sized to its members: nobody else fits.
        assert!(!registry
            .subscribe(&snapshot.id, TestPlayer::connected(3, "Cleo"), None)
            .await
            .expect("full"));
    }

    #[tokio::test]
    async fn release_owner_sweeps_everything_that_owner_created() {
        let (registry, _) = registry_with(vec![]);
        let theirs = CallerContext::new("voice-hud");
        let ours = CallerContext::core();

        registry
            .create(&theirs, ChannelId::from("radio:1"), group_meta(), None)
            .await
            .expect("created");
        registry
            .create(&theirs, ChannelId::from("radio:2"), group_meta(), None)
            .await
            .expect("created");
        registry
            .create(&ours, ChannelId::from("global"), group_meta(), None)
            .await
            .expect("created");

        assert_eq!(registry.release_owner("voice-hud").await, 2);
        let remaining = registry.get_all_channels().await.expect("ok");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ChannelId::from("global"));

        // Releasing again is a no-op.
        assert_eq!(registry.release_owner("voice-hud").await, 0);
    }

    #[tokio::test]
    async fn lookups_by_type_and_player_scan_all_channels() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let player = TestPlayer::connected(1, "Ada");

        registry
            .create(
                &ctx,
                ChannelId::from("radio:100"),
                ChannelMetadata::of(ChannelType::Radio).with_frequency(100.0),
                None,
            )
            .await
            .expect("created");
        registry
            .create(
                &ctx,
                ChannelId::from("team:alpha"),
                ChannelMetadata::of(ChannelType::Group),
                None,
            )
            .await
            .expect("created");
        registry
            .subscribe(&ChannelId::from("team:alpha"), player.clone(), None)
            .await
            .expect("subscribed");

        let radios = registry
            .get_channels_by_type(ChannelType::Radio)
            .await
            .expect("ok");
        assert_eq!(radios.len(), 1);
        assert_eq!(radios[0].metadata.frequency, Some(100.0));

        let mine = registry.get_channels_by_player(player).await.expect("ok");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, ChannelId::from("team:alpha"));
    }

    #[tokio::test]
    async fn stats_track_registry_activity() {
        let (registry, _) = registry_with(vec![]);
        let ctx = CallerContext::core();
        let id = ChannelId::from("team:alpha");

        registry
            .create(&ctx, id.clone(), group_meta(), None)
            .await
            .expect("created");
        registry
            .subscribe(&id, TestPlayer::connected(1, "Ada"), None)
            .await
            .expect("subscribed");

        let stats = registry.stats().await;
        assert_eq!(stats.total_channels, 1);
        assert_eq!(stats.total_subscribers, 1);
        assert_eq!(stats.channels_created, 1);
        assert_eq!(stats.subscriptions_added, 1);

        registry.delete(&id).await.expect("deleted");
        let stats = registry.stats().await;
        assert_eq!(stats.total_channels, 0);
        assert_eq!(stats.channels_deleted, 1);
    }
}
