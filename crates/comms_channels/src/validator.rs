//! Pluggable authorization hook consulted before subscribe, broadcast and
//! create operations.
//!
//! At most one validator is active per registry; installing a new one
//! replaces the previous. Every call site treats an absent validator as
//! "always authorized", so the default posture of a freshly constructed
//! registry is fully open.

use crate::context::PlayerRef;
use crate::types::ChannelId;

/// Authorization strategy for channel operations.
///
/// All hooks default to allow, so implementations only override the checks
/// they care about. Denial is reported to callers as a falsy return
/// (subscribe) or a silently dropped message (broadcast) — never as an
/// error.
pub trait ChannelValidator: Send + Sync {
    /// Whether `player` may join `channel_id`.
    fn can_subscribe(&self, _player: &dyn PlayerRef, _channel_id: &ChannelId) -> bool {
        true
    }

    /// Whether `player` may speak on `channel_id`.
    fn can_broadcast(&self, _player: &dyn PlayerRef, _channel_id: &ChannelId) -> bool {
        true
    }

    /// Whether `player` may create `channel_id`.
    fn can_create(&self, _player: &dyn PlayerRef, _channel_id: &ChannelId) -> bool {
        true
    }
}
