//! Embedded single-page client.

use axum::response::Html;

/// The page served at `/`.
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET / - Serve the upload page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
