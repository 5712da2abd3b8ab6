//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::WebConfig;

use super::handlers::{delete_file, download_file, list_files, upload_file, AppState};
use super::middleware::{api_rate_limit, create_cors_layer, security_headers, RateLimitState};
use super::openapi::ApiDoc;
use super::ui;

/// Room for multipart boundaries and part headers on top of the upload ceiling.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the rate-limited file API router.
pub fn create_router(app_state: Arc<AppState>, rate_limit_state: Arc<RateLimitState>) -> Router {
    let body_limit = usize::try_from(app_state.storage.max_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/files", get(list_files))
        .route("/download/:id", get(download_file))
        .route("/delete/:id", delete(delete_file))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_state.clone();
            api_rate_limit(state, req, next)
        }))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Create the router for the embedded client page.
pub fn create_ui_router() -> Router {
    Router::new().route("/", get(ui::index))
}

/// Assemble the complete application.
///
/// Only the file API is rate limited. Tracing, CORS, security headers and
/// compression wrap every route.
pub fn create_app(
    app_state: Arc<AppState>,
    rate_limit_state: Arc<RateLimitState>,
    web_config: &WebConfig,
) -> Router {
    let mut router = create_router(app_state, rate_limit_state)
        .merge(create_health_router())
        .merge(create_swagger_router());

    if web_config.serve_ui {
        router = router.merge(create_ui_router());
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&web_config.cors_origins))
            .layer(middleware::from_fn(security_headers))
            .layer(CompressionLayer::new()),
    )
}
