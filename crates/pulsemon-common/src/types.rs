use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One stored CPU/memory reading for a target.
///
/// Samples are immutable facts: once ingested they are never updated, only
/// removed by target deletion or retention pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    /// Time-ordered snowflake ID assigned at ingestion.
    pub id: String,
    pub target_id: String,
    /// Global CPU utilization, 0-100.
    pub cpu_usage: f64,
    /// Memory utilization, 0-100.
    pub memory_usage: f64,
    /// Total physical memory in bytes.
    pub memory_total: i64,
    /// Used physical memory in bytes.
    pub memory_used: i64,
    pub timestamp: DateTime<Utc>,
}

/// Raw sample payload as posted by an agent.
///
/// `timestamp` is optional; the server substitutes its own clock when the
/// agent omits it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplePayload {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub memory_total: i64,
    pub memory_used: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A registered monitored machine, as returned by the read endpoints.
///
/// `online` is derived from `last_seen` at response time and never stored;
/// a target whose agent died silently goes offline once `last_seen` ages
/// past the staleness window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub online: bool,
    pub source_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTargetRequest {
    pub owner_id: String,
    pub name: String,
}

/// Registration response. The only place the API key ever appears: it is not
/// recoverable through the API afterwards, so callers must persist it here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTargetResponse {
    #[serde(flatten)]
    pub target: TargetRecord,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameTargetRequest {
    pub name: String,
}

/// Target plus its most recent sample, for fleet list views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetWithLatest {
    #[serde(flatten)]
    pub target: TargetRecord,
    pub latest_sample: Option<SampleRecord>,
}

/// Aggregate fleet numbers for the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total_targets: u64,
    pub online_targets: u64,
    pub offline_targets: u64,
    /// Average CPU utilization across online targets, rounded. 0 when no
    /// target is online.
    pub avg_cpu_usage: f64,
    pub avg_memory_usage: f64,
}
