//! Error types for DriveClone.

use thiserror::Error;

/// Common error type for DriveClone.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant with their message.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found, or owned by someone else.
    ///
    /// Carries the client-facing message, e.g. "Folder not found".
    #[error("{0}")]
    NotFound(String),

    /// A sibling with the same name already exists.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Folder still has child folders or files.
    #[error("folder is not empty")]
    NotEmpty,

    /// The upload would push the user over their storage limit.
    #[error("storage limit exceeded: {used} + {requested} > {limit} bytes")]
    QuotaExceeded {
        /// Bytes currently used.
        used: i64,
        /// Bytes requested by the upload.
        requested: i64,
        /// The user's storage limit.
        limit: i64,
    },

    /// An external collaborator (object store, mail server) failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DriveError {
    fn from(e: sqlx::Error) -> Self {
        DriveError::Database(e.to_string())
    }
}

/// Result type alias for DriveClone operations.
pub type Result<T> = std::result::Result<T, DriveError>;
