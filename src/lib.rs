//! VinnoDrive - minimal file storage service
//!
//! Stores uploaded files on local disk, keeps a metadata record per file in
//! an embedded database, and serves upload, listing, download and deletion
//! over HTTP together with a single-page browser client.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod rate_limit;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{DriveError, Result};
pub use file::{BlobStore, FileRecord, FileService};
pub use web::WebServer;
