//! File management module for VinnoDrive.
//!
//! - Blob storage on the local filesystem
//! - File record persistence in the metadata store
//! - Upload, listing, download and deletion across both

mod record;
mod service;
mod storage;

pub use record::{FileRecord, FileRecordRepository, NewFileRecord};
pub use service::{content_hash, DownloadResult, FileService, UploadRequest, DEFAULT_MIME_TYPE};
pub use storage::BlobStore;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
