use crate::api::{store_error_response, success_absent_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Utc};
use pulsemon_common::types::SampleRecord;
use pulsemon_storage::SampleWindow;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    /// Inclusive lower bound (ISO-8601). Unbounded when omitted.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound (ISO-8601). Unbounded when omitted.
    pub to: Option<DateTime<Utc>>,
}

/// Samples for a target within a time window, newest first.
///
/// An inverted window is an empty result, not an error; the target itself
/// must exist.
#[utoipa::path(
    get,
    path = "/v1/targets/{id}/samples",
    params(
        ("id" = String, Path, description = "Target ID"),
        RangeParams
    ),
    responses(
        (status = 200, description = "Samples, newest first", body = Vec<SampleRecord>),
        (status = 404, description = "Unknown target", body = ApiError)
    ),
    tag = "Samples"
)]
pub async fn query_samples(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Path(id): Path<String>,
    Query(params): Query<RangeParams>,
) -> Response {
    if let Err(e) = state.store.get_target(&id).await {
        return store_error_response(&trace_id, e);
    }

    let window = SampleWindow {
        from: params.from,
        to: params.to,
    };
    match state.store.query_samples(&id, &window).await {
        Ok(samples) => success_response(StatusCode::OK, &trace_id, samples),
        Err(e) => store_error_response(&trace_id, e),
    }
}

/// Most recent sample for a target.
///
/// `data` is `null` when the target has never reported. Absence is
/// explicit, never a zero-valued sample.
#[utoipa::path(
    get,
    path = "/v1/targets/{id}/samples/latest",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "Latest sample, or null", body = SampleRecord),
        (status = 404, description = "Unknown target", body = ApiError)
    ),
    tag = "Samples"
)]
pub async fn latest_sample(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Path(id): Path<String>,
) -> Response {
    if let Err(e) = state.store.get_target(&id).await {
        return store_error_response(&trace_id, e);
    }

    match state.store.latest_sample(&id).await {
        Ok(Some(sample)) => success_response(StatusCode::OK, &trace_id, sample),
        Ok(None) => success_absent_response(StatusCode::OK, &trace_id, "no samples yet"),
        Err(e) => store_error_response(&trace_id, e),
    }
}
