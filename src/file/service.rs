//! File service for VinnoDrive.
//!
//! Orchestrates the blob store and the record store. The two stores are not
//! transactional together; the order of side effects is:
//! - upload: blob write, read-back and hash, record insert
//! - delete: record lookup, blob delete, record delete

use sha2::{Digest, Sha256};

use crate::db::Database;
use crate::{DriveError, Result};

use super::record::{FileRecord, FileRecordRepository, NewFileRecord};
use super::storage::BlobStore;

/// MIME type recorded when the client does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Compute the lowercase hex SHA-256 digest of `content`.
pub fn content_hash(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename supplied by the client.
    pub original_name: String,
    /// MIME type supplied by the client.
    pub mime_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request with the default MIME type.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            content,
        }
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File record.
    pub record: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// File service bound to one metadata store and one blob store.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a BlobStore,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, storage: &'a BlobStore) -> Self {
        Self { db, storage }
    }

    fn records(&self) -> FileRecordRepository<'_> {
        FileRecordRepository::new(self.db.pool())
    }

    /// Upload a file.
    ///
    /// Oversized payloads are rejected before anything is written. If a step
    /// after the blob write fails, the blob is removed again before the error
    /// is returned.
    pub async fn upload(&self, request: &UploadRequest) -> Result<FileRecord> {
        self.storage.check_size(request.content.len() as u64)?;

        let stored_name = self
            .storage
            .store(&request.content, &request.original_name)
            .await?;

        match self.record_upload(request, &stored_name).await {
            Ok(record) => {
                tracing::info!(
                    file_id = %record.id,
                    original_name = %record.original_name,
                    size = record.size,
                    "File uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    stored_name = %stored_name,
                    error = %e,
                    "Upload failed after blob write, removing blob"
                );
                if let Err(cleanup) = self.storage.delete(&stored_name).await {
                    tracing::error!(
                        stored_name = %stored_name,
                        error = %cleanup,
                        "Failed to remove orphaned blob"
                    );
                }
                Err(e)
            }
        }
    }

    async fn record_upload(&self, request: &UploadRequest, stored_name: &str) -> Result<FileRecord> {
        let written = self.storage.read(stored_name).await?;
        let hash = content_hash(&written);

        let new_record = NewFileRecord::new(
            &request.original_name,
            stored_name,
            hash,
            request.content.len() as i64,
            &request.mime_type,
        );

        self.records().insert(&new_record).await
    }

    /// List all file records.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        self.records().list().await
    }

    /// Get a file record.
    pub async fn get(&self, id: &str) -> Result<FileRecord> {
        self.records()
            .get_by_id(id)
            .await?
            .ok_or_else(|| DriveError::NotFound("File".to_string()))
    }

    /// Download a file.
    ///
    /// A record whose blob is missing is a storage error, not `NotFound`.
    pub async fn download(&self, id: &str) -> Result<DownloadResult> {
        let record = self.get(id).await?;

        let content = match self.storage.read(&record.stored_name).await {
            Ok(content) => content,
            Err(DriveError::NotFound(_)) => {
                return Err(DriveError::Storage(format!(
                    "blob {} for file {} is missing",
                    record.stored_name, record.id
                )));
            }
            Err(e) => return Err(e),
        };

        Ok(DownloadResult { record, content })
    }

    /// Delete a file and its blob.
    ///
    /// A blob that is already gone is logged and skipped so the record can
    /// still be removed. Any other blob failure aborts and keeps the record.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let record = self.get(id).await?;

        match self.storage.delete(&record.stored_name).await {
            Ok(()) => {}
            Err(DriveError::NotFound(_)) => {
                tracing::warn!(
                    file_id = %record.id,
                    stored_name = %record.stored_name,
                    "Blob already missing, removing record anyway"
                );
            }
            Err(e) => return Err(e),
        }

        if !self.records().delete_by_id(id).await? {
            // Lost a race with a concurrent delete
            return Err(DriveError::NotFound("File".to_string()));
        }

        tracing::info!(file_id = %record.id, "File deleted");
        Ok(())
    }
}
