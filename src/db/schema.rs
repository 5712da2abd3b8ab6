//! Database schema and migrations for VinnoDrive.
//!
//! Migrations are applied in order when the metadata store is opened.
//! The `schema_version` table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: file records
    r#"
CREATE TABLE files (
    id              TEXT PRIMARY KEY,
    original_name   TEXT NOT NULL,
    stored_name     TEXT NOT NULL UNIQUE,   -- blob filename under the storage directory
    content_hash    TEXT NOT NULL,          -- SHA-256, lowercase hex
    size            INTEGER NOT NULL,
    mime_type       TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL
);
"#,
];
