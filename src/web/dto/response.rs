//! Response DTOs for the HTTP layer.
//!
//! Every success body carries `"success": true`. Timestamps are RFC 3339.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::User;
use crate::drive::{DownloadLink, FileRecord, Folder, FolderContents};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// List response wrapper with an item count.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Number of items in `data`.
    pub count: usize,
    /// Items.
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    /// Create a new list response.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Empty object, serialized as `{}`.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// User information in responses. Never includes the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Bytes stored.
    pub storage_used: i64,
    /// Storage limit in bytes.
    pub storage_limit: i64,
    /// Whether the account is activated.
    pub is_active: bool,
    /// Account creation timestamp.
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        let created_at = to_rfc3339(&user.created_at);
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            storage_used: user.storage_used,
            storage_limit: user.storage_limit,
            is_active: user.is_active,
            created_at,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Always true.
    pub success: bool,
    /// Access token (JWT).
    pub token: String,
    /// User information.
    pub user: UserInfo,
}

/// Current user response (for /api/auth/me).
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// Always true.
    pub success: bool,
    /// User information.
    pub user: UserInfo,
}

// ============================================================================
// Drive DTOs
// ============================================================================

/// Folder in responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Owning user.
    pub user: i64,
    /// Parent folder ID (null at root).
    pub parent_folder: Option<i64>,
    /// Materialized path.
    pub path: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        let created_at = folder.created_at_datetime().to_rfc3339();
        Self {
            id: folder.id,
            name: folder.name,
            user: folder.user_id,
            parent_folder: folder.parent_id,
            path: folder.path,
            created_at,
        }
    }
}

/// File in responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Original filename.
    pub name: String,
    /// Object store key.
    pub key: String,
    /// Object locator.
    pub url: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Owning user.
    pub user: i64,
    /// Containing folder ID (null at root).
    pub parent_folder: Option<i64>,
    /// Upload timestamp.
    pub created_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        let created_at = file.created_at_datetime().to_rfc3339();
        Self {
            id: file.id,
            name: file.name,
            key: file.storage_key,
            url: file.url,
            size: file.size,
            mime_type: file.mime_type,
            user: file.user_id,
            parent_folder: file.parent_id,
            created_at,
        }
    }
}

/// Folder contents.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderContentsResponse {
    /// The folder itself.
    pub folder: FolderResponse,
    /// Direct child folders.
    pub subfolders: Vec<FolderResponse>,
    /// Direct child files.
    pub files: Vec<FileResponse>,
}

impl From<FolderContents> for FolderContentsResponse {
    fn from(contents: FolderContents) -> Self {
        Self {
            folder: contents.folder.into(),
            subfolders: contents.subfolders.into_iter().map(Into::into).collect(),
            files: contents.files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Download link response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadResponse {
    /// Always true.
    pub success: bool,
    /// Time-limited download URL.
    pub url: String,
    /// Original filename.
    pub filename: String,
}

impl From<DownloadLink> for DownloadResponse {
    fn from(link: DownloadLink) -> Self {
        Self {
            success: true,
            url: link.url,
            filename: link.filename,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "OK".
    pub status: String,
    /// Human-readable status.
    pub message: String,
    /// Current server time.
    pub timestamp: String,
}

/// Convert a stored `YYYY-MM-DD HH:MM:SS` timestamp to RFC 3339.
pub fn to_rfc3339(value: &str) -> String {
    crate::db::parse_sql_timestamp(value).to_rfc3339()
}
