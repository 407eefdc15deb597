use crate::config::ServerConfig;
use chrono::{DateTime, Duration, Utc};
use pulsemon_storage::MetricStore;
use std::sync::Arc;

/// Shared handle for request handlers. Cheap to clone; everything mutable
/// lives behind the store's transaction boundary.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Staleness window used for liveness derivation on every read.
    pub fn stale_after(&self) -> Duration {
        Duration::seconds(self.config.stale_after_secs() as i64)
    }
}
