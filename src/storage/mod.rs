//! Object storage gateway for DriveClone.
//!
//! File bytes never live in the database. They are handed to an
//! [`ObjectStore`] under an opaque key, and clients fetch them back through
//! short-lived signed URLs.

mod local;
mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by object store backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key is empty or would escape the storage namespace.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote service failure.
    #[error("object store error: {0}")]
    Backend(String),

    /// URL signing failed.
    #[error("signing error: {0}")]
    Signing(String),
}

/// Metadata attached to an object on upload.
#[derive(Debug, Clone)]
pub struct PutMetadata {
    /// MIME type of the content.
    pub content_type: String,
    /// Filename the client uploaded.
    pub original_name: String,
}

/// Binary object service used by the drive.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, returning the object's locator URL.
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        metadata: &PutMetadata,
    ) -> Result<String, StorageError>;

    /// Create a credential-less URL that grants read access for `ttl`.
    async fn signed_get_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Remove the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Build a fresh object key for a user's upload.
///
/// Format: `{user_id}/{unix_millis}-{16 hex chars}.{ext}`. The random suffix
/// makes keys unguessable; collisions are practically, not strictly, ruled out.
pub fn generate_object_key(user_id: i64, original_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let random: [u8; 8] = rand::random();
    let ext = extract_extension(original_name);
    format!("{user_id}/{timestamp}-{}.{ext}", hex::encode(random))
}

/// Extract a key-safe extension from a filename.
///
/// Returns "bin" if there is no extension or it contains unsafe characters.
pub fn extract_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or("bin")
}

/// Check that a key is a relative path of safe segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
