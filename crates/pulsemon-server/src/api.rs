pub mod dashboard;
pub mod ingest;
pub mod samples;
pub mod targets;

use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulsemon_storage::StoreError;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// API error body.
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    /// Numeric error code (see [`to_custom_error_code`]).
    pub err_code: i32,
    /// Human-readable error message.
    pub err_msg: String,
    /// Request trace ID.
    pub trace_id: String,
}

/// Uniform response envelope.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 0 on success.
    pub err_code: i32,
    /// "success" on success.
    pub err_msg: String,
    pub trace_id: String,
    /// Payload; `null` for empty successes and for an explicitly absent
    /// result (e.g. latest sample of a target that never reported).
    pub data: Option<T>,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Success with an explicit `null` payload, distinguishable from any real
/// value.
pub fn success_absent_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: 0,
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "bad_request" => 1001,
        "unauthorized" => 1002,
        "not_found" => 1004,
        "limit_exceeded" => 1005,
        "validation_error" => 1101,
        "internal_error" => 1500,
        "storage_error" => 1501,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// Map a storage error onto the wire taxonomy.
///
/// `CredentialUnknown` yields a generic 401 message; the response never
/// reveals which part of the credential was wrong. Database
/// failures are logged with full context here and surface opaque.
pub fn store_error_response(trace_id: &str, err: StoreError) -> Response {
    match err {
        StoreError::CredentialUnknown => error_response(
            StatusCode::UNAUTHORIZED,
            trace_id,
            "unauthorized",
            "invalid API key",
        ),
        StoreError::TargetNotFound(id) => error_response(
            StatusCode::NOT_FOUND,
            trace_id,
            "not_found",
            &format!("target '{id}' not found"),
        ),
        StoreError::TargetLimitExceeded { current, limit } => error_response(
            StatusCode::BAD_REQUEST,
            trace_id,
            "limit_exceeded",
            &format!("target limit reached ({current}/{limit})"),
        ),
        StoreError::InsertReadback { .. } | StoreError::Db(_) => {
            tracing::error!(trace_id = %trace_id, error = %err, "storage failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "storage failure",
            )
        }
    }
}

/// Health check payload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Server version.
    version: String,
    /// Seconds since startup.
    uptime_secs: i64,
    /// Registered targets across all owners.
    target_count: u64,
    /// "ok" or "error".
    storage_status: String,
}

/// Service health.
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>, Extension(trace_id): Extension<TraceId>) -> Response {
    let (target_count, storage_status) = match state.store.count_targets().await {
        Ok(count) => (count, "ok".to_string()),
        Err(e) => {
            tracing::error!(trace_id = %*trace_id, error = %e, "health storage check failed");
            (0, "error".to_string())
        }
    };

    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
            target_count,
            storage_status,
        },
    )
}

/// All HTTP routes.
pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(ingest::ingest_sample))
        .routes(routes!(targets::register_target, targets::list_targets))
        .routes(routes!(
            targets::get_target,
            targets::rename_target,
            targets::remove_target
        ))
        .routes(routes!(samples::query_samples))
        .routes(routes!(samples::latest_sample))
        .routes(routes!(dashboard::fleet_stats))
}
