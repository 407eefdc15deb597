//! Persistence layer for targets and their metric samples.
//!
//! [`store::MetricStore`] is the single access point: SeaORM over SQLite
//! (WAL mode), with migrations from the `migration` crate applied at connect
//! time. The append-only `metric_samples` table keys timestamps as epoch
//! milliseconds so range queries and pruning are plain integer comparisons.

pub mod credential;
pub mod entities;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

pub use error::{Result, StoreError};
pub use store::MetricStore;

/// Time window for a sample query, scoped to a single target.
///
/// Bounds are inclusive; a missing bound leaves that side unbounded. An
/// inverted window (`from > to`) is a valid, empty window.
///
/// # Examples
///
/// ```
/// use pulsemon_storage::SampleWindow;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let window = SampleWindow {
///     from: Some(now - Duration::hours(1)),
///     to: Some(now),
/// };
/// assert!(window.from < window.to);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
