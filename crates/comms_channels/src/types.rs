//! # Core Type Definitions
//!
//! This module contains the fundamental types used throughout the channel
//! system. These types provide the building blocks for channel addressing,
//! player identity, broadcast payloads, and spatial queries.
//!
//! ## Key Types
//!
//! - [`ChannelId`] - Opaque addressable name of a channel
//! - [`ChannelType`] - Closed enumeration of channel flavors
//! - [`ChannelMetadata`] - Per-channel configuration and extension fields
//! - [`PlayerId`] / [`ClientId`] - Stable vs session-scoped player identity
//! - [`Position`] - 3D position used for proximity membership
//!
//! ## Design Principles
//!
//! - **Type Safety**: Wrapper types prevent ID confusion (PlayerId vs ClientId)
//! - **Serialization**: Every type that crosses the remote boundary is serde-ready
//! - **Opacity**: `ChannelId` enforces no structure; the `kind:discriminator`
//!   convention is a naming scheme, not a parse contract

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a player, stable across reconnects.
///
/// This is a wrapper around UUID that provides type safety and ensures
/// player IDs cannot be confused with session-scoped client IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from a string representation.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::str::FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-scoped numeric identifier assigned by the host server.
///
/// This is the identifier the network transport targets and the only player
/// identifier that crosses the remote procedure boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub u32);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque addressable name of a channel.
///
/// By convention ids follow a `kind:discriminator` scheme (`radio:100`,
/// `team:alpha`, `private:<timestamp>:<random>`), but nothing in the system
/// parses or enforces that structure. Uniqueness is global within one
/// registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed enumeration of channel flavors.
///
/// The type is an informational dispatch hint; it does not change broadcast
/// mechanics except through `max_range` interpretation for proximity-flavored
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    /// Server-wide chat visible to everyone subscribed
    Global,
    /// Transient spatial channel computed from player positions
    Proximity,
    /// Frequency-keyed radio channel
    Radio,
    /// Point-to-point or conference phone call
    Phone,
    /// Team, faction or party chat
    Group,
    /// Staff-only channel
    Admin,
    /// Anything the host game defines beyond the built-in kinds
    Custom,
}

/// Per-channel configuration and extension fields.
///
/// Unknown keys supplied by callers are preserved in `extra` so host-specific
/// metadata survives the remote boundary round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    /// Flavor of this channel
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// Radio frequency, where the channel kind has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Spatial range for proximity-flavored channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_range: Option<f64>,
    /// Whether traffic on this channel is presented as encrypted
    #[serde(default)]
    pub encrypted: bool,
    /// Persistent channels survive `clear_non_persistent` sweeps
    #[serde(default)]
    pub persistent: bool,
    /// Host-defined extension fields, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ChannelMetadata {
    /// Creates metadata for the given channel type with all optional fields unset.
    pub fn of(channel_type: ChannelType) -> Self {
        Self {
            channel_type,
            frequency: None,
            max_range: None,
            encrypted: false,
            persistent: false,
            extra: HashMap::new(),
        }
    }

    /// Marks the channel persistent.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Sets the radio frequency.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Sets the spatial range.
    pub fn with_max_range(mut self, max_range: f64) -> Self {
        self.max_range = Some(max_range);
        self
    }
}

impl Default for ChannelMetadata {
    fn default() -> Self {
        Self::of(ChannelType::Custom)
    }
}

/// Serializable view of a channel.
///
/// This is the only representation of a channel that leaves a registry: the
/// introspection shape, the remote-procedure return carrier, and the value
/// the delegate reconstructs on its side of the boundary. It is a snapshot,
/// not a live handle; `subscriber_count` is the count at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Channel id
    pub id: ChannelId,
    /// Channel metadata as of capture time
    pub metadata: ChannelMetadata,
    /// Configured capacity, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subscribers: Option<usize>,
    /// Subscriber count at capture time
    pub subscriber_count: usize,
}

/// RGB color attached to a broadcast payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Default color for player broadcasts.
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    /// Default color for system broadcasts (light blue).
    pub const SYSTEM: Color = Color { r: 0, g: 191, b: 255 };

    /// Creates a color from its components.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Payload handed to the network transport for fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Display name shown as the message author
    pub author: String,
    /// Message body
    pub message: String,
    /// Render color
    pub color: Color,
}

impl ChatPayload {
    /// Creates a payload with the given author, message and color.
    pub fn new(author: impl Into<String>, message: impl Into<String>, color: Color) -> Self {
        Self {
            author: author.into(),
            message: message.into(),
            color,
        }
    }
}

/// Represents a 3D position in the game world.
///
/// Uses double-precision floating point so proximity checks stay accurate in
/// large worlds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (typically east-west axis)
    pub x: f64,
    /// Y coordinate (typically vertical axis)
    pub y: f64,
    /// Z coordinate (typically north-south axis)
    pub z: f64,
}

impl Position {
    /// Creates a new position with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculates the straight-line Euclidean distance to another position.
    pub fn distance(&self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Explicit ownership attribution for channel-creating operations.
///
/// The authoritative registry records which owner created which channels so
/// everything a stopping resource left behind can be swept. Attribution is
/// part of the call signature rather than queried from ambient environment
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    /// Name of the resource (or process role) performing the call
    pub owner_id: String,
}

impl CallerContext {
    /// Creates a context for the named owner.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    /// Context used by the authoritative process for its own channels.
    pub fn core() -> Self {
        Self::new("core")
    }
}

/// Free-form per-subscription metadata supplied at subscribe time.
pub type SubscriptionMetadata = HashMap<String, serde_json::Value>;
