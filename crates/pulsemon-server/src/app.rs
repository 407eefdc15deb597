use crate::state::AppState;
use crate::{api, logging};
use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pulsemon API",
        description = "Fleet metrics ingestion and retention REST API",
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Ingestion", description = "Agent sample ingestion"),
        (name = "Targets", description = "Target registration and lifecycle"),
        (name = "Samples", description = "Stored sample queries"),
        (name = "Dashboard", description = "Fleet overview")
    )
)]
struct ApiDoc;

/// Assemble the HTTP application: REST routes, Swagger UI, CORS, and the
/// request logging middleware.
pub fn build_http_app(state: AppState) -> Router {
    let (router, api_spec) = api::routes().split_for_parts();

    let mut spec = ApiDoc::openapi();
    spec.merge(api_spec);

    let cors = if state.config.cors_allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    router
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/v1/openapi.json", spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
