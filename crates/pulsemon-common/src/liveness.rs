//! Target liveness derivation.
//!
//! Online state is never stored. The original design flipped a persisted
//! `is_online` flag to true on every accepted sample, which left targets
//! permanently "online" after their agent died. Deriving the flag from
//! `last_seen` at every read closes that gap.

use chrono::{DateTime, Duration, Utc};

/// A target is online iff it has reported at least once and its most recent
/// report is younger than `stale_after`.
pub fn is_online(
    last_seen: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> bool {
    match last_seen {
        Some(seen) => now - seen < stale_after,
        None => false,
    }
}
