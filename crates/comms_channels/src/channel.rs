//! Channel entity: one named group of subscribers.
//!
//! A [`Channel`] is a pure in-memory state machine. It tracks who is
//! subscribed and when they joined, enforces its own capacity, and nothing
//! else — no authorization (the registry's job) and no I/O (the transport's
//! job).

use crate::context::PlayerRef;
use crate::types::{ChannelId, ChannelMetadata, ChannelSnapshot, PlayerId, SubscriptionMetadata};
use crate::utils::current_timestamp;
use std::collections::HashMap;
use std::sync::Arc;

/// Subscription record for one player on one channel.
pub struct Subscriber {
    /// The subscribed player
    pub player: Arc<dyn PlayerRef>,
    /// Free-form metadata supplied at subscribe time
    pub metadata: SubscriptionMetadata,
    /// Unix timestamp of the subscription
    pub subscribed_at: u64,
}

/// A named group of subscribers used to scope broadcast traffic.
pub struct Channel {
    /// Unique identifier of this channel
    pub id: ChannelId,
    /// Channel configuration and extension fields
    pub metadata: ChannelMetadata,
    /// Maximum subscriber count; `None` means unbounded
    pub max_subscribers: Option<usize>,
    /// Subscribers keyed by stable player identity
    subscribers: HashMap<PlayerId, Subscriber>,
    /// Creation timestamp
    created_at: u64,
}

impl Channel {
    /// Creates a new, empty channel.
    pub fn new(id: ChannelId, metadata: ChannelMetadata, max_subscribers: Option<usize>) -> Self {
        Self {
            id,
            metadata,
            max_subscribers,
            subscribers: HashMap::new(),
            created_at: current_timestamp(),
        }
    }

    /// Adds a player to the channel.
    ///
    /// Returns `false` without mutation if the player is already subscribed
    /// or the channel is full. No authorization happens here; callers that
    /// need it go through the registry.
    pub fn subscribe(
        &mut self,
        player: Arc<dyn PlayerRef>,
        metadata: Option<SubscriptionMetadata>,
    ) -> bool {
        let player_id = player.id();
        if self.subscribers.contains_key(&player_id) {
            return false;
        }
        if self.is_full() {
            return false;
        }
        self.subscribers.insert(
            player_id,
            Subscriber {
                player,
                metadata: metadata.unwrap_or_default(),
                subscribed_at: current_timestamp(),
            },
        );
        true
    }

    /// Removes a player from the channel.
    ///
    /// Returns `false` if the player was not subscribed.
    pub fn unsubscribe(&mut self, player_id: PlayerId) -> bool {
        self.subscribers.remove(&player_id).is_some()
    }

    /// Checks whether a player is subscribed.
    pub fn is_subscribed(&self, player_id: PlayerId) -> bool {
        self.subscribers.contains_key(&player_id)
    }

    /// Returns a snapshot copy of the current subscribers.
    pub fn subscribers(&self) -> Vec<Arc<dyn PlayerRef>> {
        self.subscribers
            .values()
            .map(|s| Arc::clone(&s.player))
            .collect()
    }

    /// Returns the subscription record for a player, if present.
    pub fn subscriber(&self, player_id: PlayerId) -> Option<&Subscriber> {
        self.subscribers.get(&player_id)
    }

    /// Gets the current subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Checks whether the channel has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.max_subscribers
            .is_some_and(|max| self.subscribers.len() >= max)
    }

    /// Checks whether the channel has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Removes all subscribers without deleting the channel itself.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Gets the age of this channel in seconds.
    pub fn age_secs(&self) -> u64 {
        current_timestamp().saturating_sub(self.created_at)
    }

    /// Captures a serializable view of this channel for introspection and
    /// for crossing the remote boundary.
    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            id: self.id.clone(),
            metadata: self.metadata.clone(),
            max_subscribers: self.max_subscribers,
            subscriber_count: self.subscribers.len(),
        }
    }
}
