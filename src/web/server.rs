//! Web server for VinnoDrive.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{Config, WebConfig};
use crate::file::BlobStore;
use crate::rate_limit::RateLimitConfig;
use crate::{Database, DriveError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::create_app;

/// Web server for the file API and UI.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Rate limit state.
    rate_limit_state: Arc<RateLimitState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server over an opened metadata store.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                DriveError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.server.host, config.server.port, e
                ))
            })?;

        let storage = BlobStore::new(
            &config.storage.path,
            config.storage.max_upload_size_bytes(),
        );
        tracing::info!(
            path = %config.storage.path,
            max_upload_size_mb = config.storage.max_upload_size_mb,
            "Blob storage configured"
        );

        let rate_limit = RateLimitConfig::with_window(
            config.rate_limit.max_requests,
            config.rate_limit.window(),
        );

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(db, storage)),
            rate_limit_state: Arc::new(RateLimitState::new(rate_limit)),
            web_config: config.web.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind the listener and start the background tasks.
    async fn prepare(self) -> std::io::Result<(TcpListener, Router)> {
        let router = create_app(
            self.app_state,
            self.rate_limit_state.clone(),
            &self.web_config,
        );

        let listener = TcpListener::bind(self.addr).await?;

        // Start after a successful bind
        self.rate_limit_state.start_cleanup_task();
        tracing::debug!("Rate limit cleanup task started");

        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.prepare().await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Server running on http://{}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.prepare().await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Server running on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0; // Use random port
        config.storage.path = temp_dir.path().join("uploads").display().to_string();
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_host() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir);
        config.server.host = "not a host".to_string();
        let db = Database::open_in_memory().await.unwrap();

        assert!(matches!(
            WebServer::new(&config, db),
            Err(DriveError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, db).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");

        let resp = client
            .get(format!("http://{}/files", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "[]");
    }
}
