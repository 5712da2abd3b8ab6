//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};

use crate::rate_limit::{RateLimitConfig, RateLimitResult, RequestRateLimiter};
use crate::web::error::ApiError;

/// How often idle counters are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// State for rate limiting.
#[derive(Debug)]
pub struct RateLimitState {
    /// Per-client counters shared by every throttled route.
    limiter: RequestRateLimiter,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: RequestRateLimiter::new(config),
        }
    }

    /// Check and count a request from the given client.
    pub fn check(&self, ip: &str) -> RateLimitResult {
        self.limiter.check_and_record(ip)
    }

    /// Drop counters whose window has rolled over.
    pub fn cleanup(&self) {
        let removed = self.limiter.cleanup();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate limit windows");
        }
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            // Skip the first immediate tick
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
            }
        });
    }
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Try X-Forwarded-For header first (for reverse proxy)
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        // Take the first IP in the chain
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the file API.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if let RateLimitResult::Denied { retry_after } = state.check(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");

        // Round up so clients never retry a moment too early
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        let mut response =
            ApiError::too_many_requests("Too many requests, please try again later.")
                .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        return response;
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::util::ServiceExt;

    fn request_from(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("X-Forwarded-For", ip)
            .body(Body::empty())
            .unwrap()
    }

    fn limited_router(max_requests: u32) -> Router {
        let state = Arc::new(RateLimitState::new(RateLimitConfig::new(
            max_requests,
            60,
        )));
        Router::new()
            .route("/", get(|| async { "OK" }))
            .layer(middleware::from_fn(move |req, next| {
                api_rate_limit(state.clone(), req, next)
            }))
    }

    #[test]
    fn test_rate_limit_state() {
        let state = RateLimitState::new(RateLimitConfig::new(3, 60));

        assert!(state.check("127.0.0.1").is_allowed());
        assert!(state.check("127.0.0.1").is_allowed());
        assert!(state.check("127.0.0.1").is_allowed());
        assert!(!state.check("127.0.0.1").is_allowed());

        // Different IP should work
        assert!(state.check("192.168.1.1").is_allowed());
    }

    #[test]
    fn test_get_client_ip_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_get_client_ip_real_ip() {
        let req = Request::builder()
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_ip(&req), "10.0.0.2");
    }

    #[test]
    fn test_get_client_ip_connect_info() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(get_client_ip(&req), "192.0.2.1");
    }

    #[test]
    fn test_get_client_ip_unknown() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_client_ip(&req), "unknown");
    }

    #[tokio::test]
    async fn test_middleware_rejects_with_retry_after() {
        let app = limited_router(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let retry_after: u64 = response
            .headers()
            .get(header::RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after > 0 && retry_after <= 60);

        // Other clients are unaffected
        let response = app.oneshot(request_from("5.6.7.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
