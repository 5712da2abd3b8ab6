//! Web API module for VinnoDrive.
//!
//! Serves the file API over HTTP together with the embedded browser page,
//! the OpenAPI document and a health check.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;
pub mod ui;

pub use error::ApiError;
pub use handlers::AppState;
pub use middleware::RateLimitState;
pub use router::{create_app, create_router};
pub use server::WebServer;
