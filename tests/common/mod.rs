//! Test helpers for the Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use vinnodrive::config::WebConfig;
use vinnodrive::file::{BlobStore, DEFAULT_MAX_FILE_SIZE};
use vinnodrive::rate_limit::RateLimitConfig;
use vinnodrive::web::{create_app, AppState, RateLimitState};
use vinnodrive::Database;

/// A running test application with handles on both stores.
pub struct TestApp {
    /// In-process HTTP server.
    pub server: TestServer,
    /// Metadata store behind the server.
    pub db: Database,
    /// Blob store behind the server.
    pub storage: BlobStore,
    /// Keeps the blob directory alive for the test.
    _temp_dir: TempDir,
}

/// Create a test application with a generous rate limit.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_limit(10_000).await
}

/// Create a test application allowing `max_requests` per client per minute.
pub async fn create_test_app_with_limit(max_requests: u32) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = BlobStore::new(temp_dir.path().join("uploads"), DEFAULT_MAX_FILE_SIZE);

    let app_state = Arc::new(AppState::new(db.clone(), storage.clone()));
    let rate_limit_state = Arc::new(RateLimitState::new(RateLimitConfig::new(
        max_requests,
        60,
    )));
    let web_config = WebConfig {
        cors_origins: vec![],
        serve_ui: true,
    };

    let router = create_app(app_state, rate_limit_state, &web_config);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        storage,
        _temp_dir: temp_dir,
    }
}

/// Build an upload form with one file part named `file`.
pub fn file_form(filename: &str, mime_type: &str, content: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content)
            .file_name(filename)
            .mime_type(mime_type),
    )
}

/// Deterministic test content of the given length.
pub fn sample_content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
