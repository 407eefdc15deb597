use crate::api::{
    store_error_response, success_absent_response, success_response, ApiError,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use pulsemon_common::types::{
    RegisterTargetRequest, RegisterTargetResponse, RenameTargetRequest, TargetRecord,
    TargetWithLatest,
};
use pulsemon_storage::store::target::target_to_record;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerParams {
    /// Owning account whose targets to list.
    pub owner_id: String,
}

/// Register a new monitored target.
///
/// The response is the only place the minted API key ever appears.
#[utoipa::path(
    post,
    path = "/v1/targets",
    request_body = RegisterTargetRequest,
    responses(
        (status = 201, description = "Target created; persist the apiKey now", body = RegisterTargetResponse),
        (status = 400, description = "Owner already at the target limit", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    ),
    tag = "Targets"
)]
pub async fn register_target(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Json(req): Json<RegisterTargetRequest>,
) -> Response {
    let limit = state.config.max_targets_per_owner;
    match state
        .store
        .register_target(&req.owner_id, &req.name, limit)
        .await
    {
        Ok((model, api_key)) => {
            tracing::info!(
                trace_id = %*trace_id,
                target_id = %model.id,
                owner_id = %req.owner_id,
                "target registered"
            );
            success_response(
                StatusCode::CREATED,
                &trace_id,
                RegisterTargetResponse {
                    target: target_to_record(&model, Utc::now(), state.stale_after()),
                    api_key,
                },
            )
        }
        Err(e) => store_error_response(&trace_id, e),
    }
}

/// List an owner's targets with liveness and their latest samples.
#[utoipa::path(
    get,
    path = "/v1/targets",
    params(OwnerParams),
    responses(
        (status = 200, description = "Targets with latest samples", body = Vec<TargetWithLatest>),
        (status = 500, description = "Storage failure", body = ApiError)
    ),
    tag = "Targets"
)]
pub async fn list_targets(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Query(params): Query<OwnerParams>,
) -> Response {
    let models = match state.store.list_targets(&params.owner_id).await {
        Ok(m) => m,
        Err(e) => return store_error_response(&trace_id, e),
    };

    let now = Utc::now();
    let stale_after = state.stale_after();
    let mut out = Vec::with_capacity(models.len());
    for model in &models {
        let latest_sample = match state.store.latest_sample(&model.id).await {
            Ok(s) => s,
            Err(e) => return store_error_response(&trace_id, e),
        };
        out.push(TargetWithLatest {
            target: target_to_record(model, now, stale_after),
            latest_sample,
        });
    }

    success_response(StatusCode::OK, &trace_id, out)
}

/// Target detail. Never includes the API key.
#[utoipa::path(
    get,
    path = "/v1/targets/{id}",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "Target detail", body = TargetRecord),
        (status = 404, description = "Unknown target", body = ApiError)
    ),
    tag = "Targets"
)]
pub async fn get_target(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get_target(&id).await {
        Ok(model) => success_response(
            StatusCode::OK,
            &trace_id,
            target_to_record(&model, Utc::now(), state.stale_after()),
        ),
        Err(e) => store_error_response(&trace_id, e),
    }
}

/// Rename a target. The API key and samples are untouched.
#[utoipa::path(
    put,
    path = "/v1/targets/{id}",
    request_body = RenameTargetRequest,
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "Updated target", body = TargetRecord),
        (status = 404, description = "Unknown target", body = ApiError)
    ),
    tag = "Targets"
)]
pub async fn rename_target(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Path(id): Path<String>,
    Json(req): Json<RenameTargetRequest>,
) -> Response {
    match state.store.rename_target(&id, &req.name).await {
        Ok(model) => success_response(
            StatusCode::OK,
            &trace_id,
            target_to_record(&model, Utc::now(), state.stale_after()),
        ),
        Err(e) => store_error_response(&trace_id, e),
    }
}

/// Delete a target and all of its samples.
#[utoipa::path(
    delete,
    path = "/v1/targets/{id}",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "Target and samples removed"),
        (status = 404, description = "Unknown target", body = ApiError)
    ),
    tag = "Targets"
)]
pub async fn remove_target(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Path(id): Path<String>,
) -> Response {
    match state.store.remove_target(&id).await {
        Ok(()) => success_absent_response(StatusCode::OK, &trace_id, "target removed"),
        Err(e) => store_error_response(&trace_id, e),
    }
}
