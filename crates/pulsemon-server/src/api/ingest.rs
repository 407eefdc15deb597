use crate::api::{error_response, store_error_response, success_response, ApiError};
use crate::logging::{ClientAddr, TraceId};
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use pulsemon_common::types::{SamplePayload, SampleRecord};
use pulsemon_common::validate::validate_sample;

/// Ingest one metric sample.
///
/// The pipeline is: resolve the API key, validate the payload, then append
/// the sample and refresh target liveness in a single transaction. Each
/// step is a distinct failure point; nothing is retried here. Agents
/// resend on their own cadence, and duplicate delivery just produces
/// duplicate timestamped facts.
#[utoipa::path(
    post,
    path = "/v1/ingest/{api_key}",
    request_body = SamplePayload,
    params(
        ("api_key" = String, Path, description = "Target API key minted at registration")
    ),
    responses(
        (status = 201, description = "Sample stored", body = SampleRecord),
        (status = 400, description = "Out-of-range sample fields", body = ApiError),
        (status = 401, description = "Unknown API key", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    ),
    tag = "Ingestion"
)]
pub async fn ingest_sample(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Extension(client_addr): Extension<ClientAddr>,
    Path(api_key): Path<String>,
    Json(payload): Json<SamplePayload>,
) -> Response {
    // 1. Authenticate: unknown key is a rejection, never an internal retry
    let target = match state.store.resolve_api_key(&api_key).await {
        Ok(t) => t,
        Err(e) => return store_error_response(&trace_id, e),
    };

    // 2. Validate before touching any state
    if let Err(e) = validate_sample(&payload) {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "validation_error",
            &e.to_string(),
        );
    }

    // 3+4. Atomic append + liveness touch, then echo the stored row
    match state
        .store
        .ingest_sample(&target.id, &payload, client_addr.0.as_deref())
        .await
    {
        Ok(stored) => {
            tracing::debug!(
                trace_id = %*trace_id,
                target_id = %stored.target_id,
                sample_id = %stored.id,
                "sample ingested"
            );
            success_response(StatusCode::CREATED, &trace_id, stored)
        }
        Err(e) => store_error_response(&trace_id, e),
    }
}
