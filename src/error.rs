//! Error types for VinnoDrive.

use thiserror::Error;

/// Common error type for VinnoDrive.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Upload exceeds the configured size ceiling.
    #[error("payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Blob store error that is not a plain I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DriveError {
    fn from(e: sqlx::Error) -> Self {
        DriveError::Database(e.to_string())
    }
}

/// Result type alias for VinnoDrive operations.
pub type Result<T> = std::result::Result<T, DriveError>;
