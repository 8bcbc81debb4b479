//! Drive module for DriveClone.
//!
//! This module provides the per-user file hierarchy:
//! - Folder tree with materialized paths
//! - File records pointing at object store keys
//! - Storage quota accounting
//! - The service that ties them to the object store

mod file;
mod folder;
mod quota;
mod service;

use std::time::Duration;

pub use file::{FileRecord, FileRepository, NewFile};
pub use folder::{Folder, FolderRepository, NewFolder};
pub use quota::{QuotaAccountant, Usage};
pub use service::{
    validate_folder_name, DownloadLink, DriveService, FolderContents, UploadRequest,
};

/// Default maximum size of a single upload (100MB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Default lifetime of download links.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(300);

/// Maximum folder name length (in characters).
pub const MAX_FOLDER_NAME_LENGTH: usize = 255;
