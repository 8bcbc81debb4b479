//! API handlers.

pub mod auth;
pub mod file;
pub mod folder;
pub mod health;
pub mod object;

pub use auth::*;
pub use file::*;
pub use folder::*;
pub use health::*;
pub use object::*;

use jsonwebtoken::EncodingKey;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AccountService, AccountSettings};
use crate::config::Config;
use crate::drive::DriveService;
use crate::mail::Mailer;
use crate::storage::{LocalObjectStore, ObjectStore};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

/// Application state shared across handlers.
///
/// Holds long-lived handles only; services are built per request and borrow
/// from here.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Arc<Database>,
    /// Object store used for file bytes.
    pub object_store: Arc<dyn ObjectStore>,
    /// Set when the local backend serves signed object URLs itself.
    pub local_objects: Option<Arc<LocalObjectStore>>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub jwt_expiry_secs: u64,
    /// Account lifecycle settings.
    pub account_settings: AccountSettings,
    /// Per-file upload ceiling in bytes.
    pub max_upload_size: u64,
    /// Lifetime of download links.
    pub download_ttl: Duration,
}

impl AppState {
    /// Create a new application state from configuration and shared handles.
    pub fn new(
        config: &Config,
        db: Arc<Database>,
        object_store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            object_store,
            local_objects: None,
            mailer,
            encoding_key: EncodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
            jwt_expiry_secs: config.auth.jwt_expiry_secs,
            account_settings: AccountSettings::from_config(config),
            max_upload_size: config.storage.max_upload_size_bytes(),
            download_ttl: Duration::from_secs(config.storage.download_url_ttl_secs),
        }
    }

    /// Serve signed URLs of a local object store under `/api/objects`.
    pub fn with_local_objects(mut self, store: Arc<LocalObjectStore>) -> Self {
        self.local_objects = Some(store);
        self
    }

    /// Account service borrowing this state's handles.
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(&self.db, self.mailer.as_ref(), &self.account_settings)
    }

    /// Drive service borrowing this state's handles.
    pub fn drive(&self) -> DriveService<'_> {
        DriveService::new(&self.db, self.object_store.as_ref())
            .with_max_file_size(self.max_upload_size)
            .with_download_ttl(self.download_ttl)
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, email: &str) -> Result<String, ApiError> {
        JwtClaims::new(user_id, email, self.jwt_expiry_secs)
            .encode(&self.encoding_key)
            .map_err(|e| {
                tracing::error!("Failed to encode JWT: {}", e);
                ApiError::internal("Failed to generate token")
            })
    }
}

/// Parse a path or query id. Anything that is not a positive integer cannot
/// name a record, so it is reported as not found.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::not_found(not_found))
}

/// Parse an optional parent query value; absent or empty means the root.
pub(crate) fn parse_parent(raw: Option<&str>, not_found: &str) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(value) => parse_id(value, not_found).map(Some),
    }
}
