use crate::api::{store_error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use pulsemon_common::liveness;
use pulsemon_common::types::FleetStats;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardParams {
    /// Owning account whose fleet to summarize.
    pub owner_id: String,
}

/// Fleet summary for an owner's dashboard.
///
/// Averages cover online targets only; a fleet with no online targets
/// reports zero averages rather than NaN.
#[utoipa::path(
    get,
    path = "/v1/dashboard/stats",
    params(DashboardParams),
    responses(
        (status = 200, description = "Fleet summary", body = FleetStats),
        (status = 500, description = "Storage failure", body = ApiError)
    ),
    tag = "Dashboard"
)]
pub async fn fleet_stats(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let models = match state.store.list_targets(&params.owner_id).await {
        Ok(m) => m,
        Err(e) => return store_error_response(&trace_id, e),
    };

    let now = Utc::now();
    let stale_after = state.stale_after();

    let mut online = 0u64;
    let mut cpu_sum = 0.0f64;
    let mut mem_sum = 0.0f64;
    for model in &models {
        let last_seen = model.last_seen.map(|t| t.with_timezone(&Utc));
        if !liveness::is_online(last_seen, now, stale_after) {
            continue;
        }
        online += 1;
        match state.store.latest_sample(&model.id).await {
            Ok(Some(sample)) => {
                cpu_sum += sample.cpu_usage;
                mem_sum += sample.memory_usage;
            }
            Ok(None) => {}
            Err(e) => return store_error_response(&trace_id, e),
        }
    }

    let total = models.len() as u64;
    let round1 = |v: f64| (v * 10.0).round() / 10.0;
    let stats = FleetStats {
        total_targets: total,
        online_targets: online,
        offline_targets: total - online,
        avg_cpu_usage: if online > 0 {
            round1(cpu_sum / online as f64)
        } else {
            0.0
        },
        avg_memory_usage: if online > 0 {
            round1(mem_sum / online as f64)
        } else {
            0.0
        },
    };

    success_response(StatusCode::OK, &trace_id, stats)
}
