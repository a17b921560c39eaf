//! # Utility Functions
//!
//! Small helpers shared across the channel system: consistent timestamp
//! generation and unique-suffix generation for auto-assigned channel ids.

use uuid::Uuid;

/// Returns the current Unix timestamp in seconds.
///
/// All subscription records and generated channel ids use this function for
/// timestamp generation to ensure consistency.
///
/// # Panics
///
/// Panics if the system clock is set to a time before the Unix epoch
/// (January 1, 1970). This should never happen in practice on modern systems.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Returns a short random suffix for generated channel ids.
///
/// Eight hex characters of a v4 UUID — enough entropy to keep ids generated
/// within the same second distinct.
pub fn random_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
