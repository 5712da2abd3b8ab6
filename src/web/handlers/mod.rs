//! API handlers for VinnoDrive.

pub mod file;

pub use file::*;

use crate::file::{BlobStore, FileService};
use crate::Database;

/// Shared state for the file handlers.
#[derive(Clone)]
pub struct AppState {
    /// Metadata store.
    pub db: Database,
    /// Blob store.
    pub storage: BlobStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, storage: BlobStore) -> Self {
        Self { db, storage }
    }

    /// File service over this state's stores.
    pub fn files(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.storage)
    }
}
