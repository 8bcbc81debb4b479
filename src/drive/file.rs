//! File records and repository.
//!
//! A record describes an object held by the object store; the bytes
//! themselves never touch the database.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::parse_sql_timestamp;
use crate::Result;

const FILE_COLUMNS: &str =
    "id, user_id, parent_id, name, storage_key, url, size, mime_type, created_at";

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Containing folder (None for the root).
    pub parent_id: Option<i64>,
    /// Original filename as uploaded.
    pub name: String,
    /// Object store key.
    pub storage_key: String,
    /// Locator returned by the object store.
    pub url: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: String,
    /// When the file was uploaded.
    pub created_at: String,
}

impl FileRecord {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        parse_sql_timestamp(&self.created_at)
    }
}

/// Data for creating a file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub storage_key: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
}

/// Repository for file records.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let sql = format!(
            "INSERT INTO files (user_id, parent_id, name, storage_key, url, size, mime_type)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {FILE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(file.user_id)
            .bind(file.parent_id)
            .bind(&file.name)
            .bind(&file.storage_key)
            .bind(&file.url)
            .bind(file.size)
            .bind(&file.mime_type)
            .fetch_one(self.pool)
            .await?;
        Ok(record)
    }

    /// Get a file owned by `user_id`.
    pub async fn get_owned(&self, user_id: i64, id: i64) -> Result<Option<FileRecord>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND user_id = ?");
        let record = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(record)
    }

    /// Find the record pointing at an object store key.
    pub async fn get_by_storage_key(&self, storage_key: &str) -> Result<Option<FileRecord>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE storage_key = ?");
        let record = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(storage_key)
            .fetch_optional(self.pool)
            .await?;
        Ok(record)
    }

    /// List a user's files directly under `parent_id` (None = root), newest first.
    pub async fn list_by_parent(
        &self,
        user_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE user_id = ? AND parent_id IS ?
             ORDER BY created_at DESC, id DESC"
        );
        let records = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(user_id)
            .bind(parent_id)
            .fetch_all(self.pool)
            .await?;
        Ok(records)
    }

    /// Count files directly inside a folder.
    pub async fn count_in_folder(&self, folder_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE parent_id = ?")
            .bind(folder_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a file record owned by `user_id`.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
