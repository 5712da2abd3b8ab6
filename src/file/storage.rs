//! Blob storage for VinnoDrive.
//!
//! Uploaded bytes live as flat files in one directory:
//! ```text
//! {base_path}/
//! ├── 3f2b9c0e4d6a4b1f8e7d6c5b4a392817.pdf
//! ├── 9a8b7c6d5e4f40318273645546372819.png
//! └── c0ffee00c0ffee00c0ffee00c0ffee00
//! ```
//! Each name is a random 128-bit token plus the extension of the original
//! filename. Collisions are not checked.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::{DriveError, Result};

/// Longest extension carried over from an original filename.
const MAX_EXTENSION_LENGTH: usize = 16;

/// Blob store mapping generated names to byte sequences on disk.
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Directory holding the blobs.
    base_path: PathBuf,
    /// Upload ceiling in bytes.
    max_size: u64,
}

impl BlobStore {
    /// Create a blob store rooted at `base_path`.
    ///
    /// Nothing is touched on disk; the directory is created by the first `store`.
    pub fn new(base_path: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            base_path: base_path.into(),
            max_size,
        }
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the upload ceiling in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Reject payloads above the ceiling.
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_size {
            return Err(DriveError::PayloadTooLarge {
                size,
                limit: self.max_size,
            });
        }
        Ok(())
    }

    /// Write `content` under a freshly generated name and return that name.
    ///
    /// The extension of `original_name` is preserved when it is a plain
    /// alphanumeric extension.
    pub async fn store(&self, content: &[u8], original_name: &str) -> Result<String> {
        self.check_size(content.len() as u64)?;

        fs::create_dir_all(&self.base_path).await?;

        let stored_name = Self::generate_stored_name(original_name);
        let file_path = self.base_path.join(&stored_name);
        fs::write(&file_path, content).await?;

        tracing::debug!(stored_name = %stored_name, size = content.len(), "Stored blob");
        Ok(stored_name)
    }

    /// Read a blob back into memory.
    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.resolve(stored_name)?;

        match fs::read(&file_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DriveError::NotFound(format!("blob {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a blob.
    ///
    /// Fails with `NotFound` when the blob does not exist, so a second delete
    /// of the same name is an error.
    pub async fn delete(&self, stored_name: &str) -> Result<()> {
        let file_path = self.resolve(stored_name)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::debug!(stored_name = %stored_name, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DriveError::NotFound(format!("blob {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists.
    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.resolve(stored_name) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Resolve a stored name to its path inside the base directory.
    ///
    /// Only a single plain path component is accepted.
    pub fn resolve(&self, stored_name: &str) -> Result<PathBuf> {
        let mut components = Path::new(stored_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !stored_name.contains('\\') => {
                Ok(self.base_path.join(stored_name))
            }
            _ => Err(DriveError::Validation(format!(
                "invalid stored name: {stored_name:?}"
            ))),
        }
    }

    /// Generate a new stored name for the given original filename.
    pub fn generate_stored_name(original_name: &str) -> String {
        let token = Uuid::new_v4().simple();
        match Self::extract_extension(original_name) {
            Some(ext) => format!("{token}.{ext}"),
            None => token.to_string(),
        }
    }

    /// Extract a safe extension from a filename.
    fn extract_extension(filename: &str) -> Option<&str> {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
    }
}
