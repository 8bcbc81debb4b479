//! Drive service.
//!
//! Orchestrates the folder tree, file records, the object store and the
//! quota counter for one authenticated user at a time.

use std::time::Duration;

use tracing::{error, info, warn};

use super::file::{FileRecord, FileRepository, NewFile};
use super::folder::{Folder, FolderRepository, NewFolder};
use super::quota::QuotaAccountant;
use super::{DOWNLOAD_URL_TTL, MAX_FILE_SIZE, MAX_FOLDER_NAME_LENGTH};
use crate::storage::{generate_object_key, ObjectStore, PutMetadata, StorageError};
use crate::{Database, DriveError, Result};

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub name: String,
    /// MIME type reported by the client, if any.
    pub mime_type: Option<String>,
    /// Target folder (None for the root).
    pub parent_id: Option<i64>,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request for the root folder.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            parent_id: None,
            content,
        }
    }

    /// Set the target folder.
    pub fn with_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// MIME type to store: the client's, else a guess from the name.
    fn resolved_mime_type(&self) -> String {
        match self.mime_type.as_deref().map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

/// A folder with its direct children.
#[derive(Debug, Clone)]
pub struct FolderContents {
    pub folder: Folder,
    pub subfolders: Vec<Folder>,
    pub files: Vec<FileRecord>,
}

/// A time-limited download link.
#[derive(Debug, Clone)]
pub struct DownloadLink {
    pub url: String,
    pub filename: String,
}

/// Drive operations over shared handles.
pub struct DriveService<'a> {
    db: &'a Database,
    store: &'a dyn ObjectStore,
    max_file_size: u64,
    download_ttl: Duration,
}

impl<'a> DriveService<'a> {
    /// Create a new DriveService.
    pub fn new(db: &'a Database, store: &'a dyn ObjectStore) -> Self {
        Self {
            db,
            store,
            max_file_size: MAX_FILE_SIZE,
            download_ttl: DOWNLOAD_URL_TTL,
        }
    }

    /// Override the per-file size ceiling.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Override the lifetime of download links.
    pub fn with_download_ttl(mut self, ttl: Duration) -> Self {
        self.download_ttl = ttl;
        self
    }

    // Folders

    /// Create a folder at the root or inside an owned parent.
    pub async fn create_folder(
        &self,
        user_id: i64,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Folder> {
        let name = validate_folder_name(name)?;
        let repo = FolderRepository::new(self.db.pool());

        let new_folder = match parent_id {
            Some(parent_id) => {
                let parent = self.owned_folder(user_id, parent_id).await?;
                NewFolder::child_of(&parent, name)
            }
            None => NewFolder::root(user_id, name),
        };

        if repo
            .find_by_name(user_id, parent_id, &new_folder.name)
            .await?
            .is_some()
        {
            return Err(DriveError::DuplicateName(
                "Folder with this name already exists".to_string(),
            ));
        }

        let folder = repo.create(&new_folder).await?;
        info!(user_id, folder_id = folder.id, path = %folder.path, "Folder created");
        Ok(folder)
    }

    /// List folders directly under `parent_id` (root when None), newest first.
    pub async fn list_folders(&self, user_id: i64, parent_id: Option<i64>) -> Result<Vec<Folder>> {
        FolderRepository::new(self.db.pool())
            .list_by_parent(user_id, parent_id)
            .await
    }

    /// An owned folder with its direct subfolders and files.
    pub async fn get_folder_contents(&self, user_id: i64, folder_id: i64) -> Result<FolderContents> {
        let folder = self.owned_folder(user_id, folder_id).await?;
        let subfolders = FolderRepository::new(self.db.pool())
            .list_by_parent(user_id, Some(folder.id))
            .await?;
        let files = FileRepository::new(self.db.pool())
            .list_by_parent(user_id, Some(folder.id))
            .await?;

        Ok(FolderContents {
            folder,
            subfolders,
            files,
        })
    }

    /// Delete an owned folder that has no direct children.
    pub async fn delete_folder(&self, user_id: i64, folder_id: i64) -> Result<()> {
        let folder = self.owned_folder(user_id, folder_id).await?;
        let folders = FolderRepository::new(self.db.pool());

        let subfolders = folders.count_children(folder.id).await?;
        let files = FileRepository::new(self.db.pool())
            .count_in_folder(folder.id)
            .await?;
        if subfolders > 0 || files > 0 {
            return Err(DriveError::NotEmpty);
        }

        if !folders.delete(user_id, folder.id).await? {
            return Err(folder_not_found());
        }
        info!(user_id, folder_id, "Folder deleted");
        Ok(())
    }

    // Files

    /// Store an upload and record it.
    ///
    /// Quota is reserved before the object store is touched. Any later
    /// failure releases the reservation, and a failed record insert also
    /// removes the stored object.
    pub async fn upload_file(&self, user_id: i64, request: &UploadRequest) -> Result<FileRecord> {
        if request.name.trim().is_empty() {
            return Err(DriveError::Validation("File name is required".to_string()));
        }

        let size = request.content.len() as u64;
        if size > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(DriveError::Validation(format!(
                "File too large. Maximum size is {max_mb}MB"
            )));
        }
        let size = size as i64;

        if let Some(parent_id) = request.parent_id {
            self.owned_folder(user_id, parent_id).await?;
        }

        let quota = QuotaAccountant::new(self.db);
        quota.reserve(user_id, size).await?;

        let key = generate_object_key(user_id, &request.name);
        let mime_type = request.resolved_mime_type();
        let metadata = PutMetadata {
            content_type: mime_type.clone(),
            original_name: request.name.clone(),
        };

        let url = match self.store.put(&key, &request.content, &metadata).await {
            Ok(url) => url,
            Err(e) => {
                self.release_quietly(user_id, size).await;
                return Err(upstream("Failed to store file", &e));
            }
        };

        let new_file = NewFile {
            user_id,
            parent_id: request.parent_id,
            name: request.name.clone(),
            storage_key: key.clone(),
            url,
            size,
            mime_type,
        };

        match FileRepository::new(self.db.pool()).create(&new_file).await {
            Ok(record) => {
                info!(user_id, file_id = record.id, size, key = %key, "File uploaded");
                Ok(record)
            }
            Err(e) => {
                error!(user_id, key = %key, error = %e, "Failed to record upload, removing object");
                if let Err(del) = self.store.delete(&key).await {
                    warn!(key = %key, error = %del, "Failed to remove orphaned object");
                }
                self.release_quietly(user_id, size).await;
                Err(e)
            }
        }
    }

    /// List files directly under `parent_id` (root when None), newest first.
    pub async fn list_files(&self, user_id: i64, parent_id: Option<i64>) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool())
            .list_by_parent(user_id, parent_id)
            .await
    }

    /// Get an owned file record.
    pub async fn get_file(&self, user_id: i64, file_id: i64) -> Result<FileRecord> {
        FileRepository::new(self.db.pool())
            .get_owned(user_id, file_id)
            .await?
            .ok_or_else(file_not_found)
    }

    /// A short-lived URL for downloading an owned file.
    pub async fn download_file(&self, user_id: i64, file_id: i64) -> Result<DownloadLink> {
        let file = self.get_file(user_id, file_id).await?;
        let url = self
            .store
            .signed_get_url(&file.storage_key, self.download_ttl)
            .await
            .map_err(|e| upstream("Failed to create download link", &e))?;

        Ok(DownloadLink {
            url,
            filename: file.name,
        })
    }

    /// Delete an owned file: object first, then the record, then the quota.
    ///
    /// If the object store refuses, the record and quota stay untouched.
    pub async fn delete_file(&self, user_id: i64, file_id: i64) -> Result<()> {
        let file = self.get_file(user_id, file_id).await?;

        self.store
            .delete(&file.storage_key)
            .await
            .map_err(|e| upstream("Failed to delete file from storage", &e))?;

        if !FileRepository::new(self.db.pool())
            .delete(user_id, file.id)
            .await?
        {
            return Err(file_not_found());
        }
        QuotaAccountant::new(self.db)
            .release(user_id, file.size)
            .await?;

        info!(user_id, file_id, size = file.size, "File deleted");
        Ok(())
    }

    async fn owned_folder(&self, user_id: i64, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.db.pool())
            .get_owned(user_id, folder_id)
            .await?
            .ok_or_else(folder_not_found)
    }

    async fn release_quietly(&self, user_id: i64, bytes: i64) {
        if let Err(e) = QuotaAccountant::new(self.db).release(user_id, bytes).await {
            error!(user_id, bytes, error = %e, "Failed to release reserved storage");
        }
    }
}

/// Trim a folder name and check it.
pub fn validate_folder_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DriveError::Validation("Folder name is required".to_string()));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
        return Err(DriveError::Validation(format!(
            "Folder name must be at most {MAX_FOLDER_NAME_LENGTH} characters"
        )));
    }
    if name.chars().any(|c| c == '/' || c.is_control()) {
        return Err(DriveError::Validation(
            "Folder name cannot contain '/' or control characters".to_string(),
        ));
    }
    Ok(name)
}

fn folder_not_found() -> DriveError {
    DriveError::NotFound("Folder not found".to_string())
}

fn file_not_found() -> DriveError {
    DriveError::NotFound("File not found".to_string())
}

fn upstream(message: &str, e: &StorageError) -> DriveError {
    error!(error = %e, "{}", message);
    DriveError::Upstream(message.to_string())
}
