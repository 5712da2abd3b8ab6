//! File record types and repository for VinnoDrive.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::{DriveError, Result};

/// Metadata for one uploaded file.
///
/// Records are never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Identifier assigned by the store on insert.
    pub id: String,
    /// Filename supplied by the client. Untrusted.
    pub original_name: String,
    /// Generated blob filename under the storage directory.
    pub stored_name: String,
    /// SHA-256 of the uploaded bytes, lowercase hex.
    pub content_hash: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type declared by the client. Untrusted.
    pub mime_type: String,
    /// When the record was inserted.
    pub uploaded_at: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Filename supplied by the client.
    pub original_name: String,
    /// Generated blob filename.
    pub stored_name: String,
    /// SHA-256 of the content, lowercase hex.
    pub content_hash: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type declared by the client.
    pub mime_type: String,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        content_hash: impl Into<String>,
        size: i64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            content_hash: content_hash.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Repository for file record operations.
pub struct FileRecordRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRecordRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a record, assigning its id and upload time.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let id = Uuid::new_v4().to_string();
        let uploaded_at = Utc::now();

        sqlx::query(
            "INSERT INTO files (id, original_name, stored_name, content_hash, size, mime_type, uploaded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(&record.original_name)
        .bind(&record.stored_name)
        .bind(&record.content_hash)
        .bind(record.size)
        .bind(&record.mime_type)
        .bind(uploaded_at)
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DriveError::Database(format!("inserted file record {id} vanished")))
    }

    /// List every record in insertion order.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(
            "SELECT id, original_name, stored_name, content_hash, size, mime_type, uploaded_at
             FROM files ORDER BY rowid",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Get a record by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, original_name, stored_name, content_hash, size, mime_type, uploaded_at
             FROM files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a record by id. Returns `false` if no record had that id.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
