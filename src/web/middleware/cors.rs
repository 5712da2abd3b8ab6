//! CORS middleware configuration.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Methods used by the file API.
const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Create a CORS layer from the configured origins.
///
/// With no usable origins every origin is allowed, matching a stock `cors()`
/// setup. Otherwise only the listed origins may call the API.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed_origins.is_empty() {
        return CorsLayer::new()
            .allow_methods(ALLOWED_METHODS)
            .allow_headers(Any)
            .allow_origin(Any);
    }

    CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .expose_headers([axum::http::header::CONTENT_DISPOSITION])
        .allow_origin(parsed_origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn preflight(layer: CorsLayer, origin: &str) -> Option<String> {
        let app = Router::new().route("/files", get(|| async { "[]" })).layer(layer);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/files")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_empty_origins_allow_any() {
        let allowed = preflight(create_cors_layer(&[]), "http://elsewhere.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_configured_origins() {
        let origins = vec!["http://localhost:3000".to_string()];

        let allowed = preflight(create_cors_layer(&origins), "http://localhost:3000").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:3000"));

        let denied = preflight(create_cors_layer(&origins), "http://evil.test").await;
        assert!(denied.is_none());
    }
}
