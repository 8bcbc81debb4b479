//! Folder types and repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::parse_sql_timestamp;
use crate::{DriveError, Result};

const FOLDER_COLUMNS: &str = "id, user_id, parent_id, name, path, created_at";

/// A folder in a user's drive.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
    /// Folder name.
    pub name: String,
    /// Materialized path, e.g. `/Docs/2024`. Fixed at creation.
    pub path: String,
    /// When the folder was created.
    pub created_at: String,
}

impl Folder {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        parse_sql_timestamp(&self.created_at)
    }

    /// Path of a child named `name` under this folder.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Owning user.
    pub user_id: i64,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
    /// Folder name.
    pub name: String,
    /// Materialized path.
    pub path: String,
}

impl NewFolder {
    /// A folder at the root of the user's drive.
    pub fn root(user_id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            user_id,
            parent_id: None,
            path: format!("/{name}"),
            name,
        }
    }

    /// A folder inside `parent`. The path derives from the parent's path.
    pub fn child_of(parent: &Folder, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            user_id: parent.user_id,
            parent_id: Some(parent.id),
            path: parent.child_path(&name),
            name,
        }
    }
}

/// Repository for folder operations.
///
/// Every lookup is scoped to the owning user.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    ///
    /// Returns `DuplicateName` if a sibling with the same name exists.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let sql = format!(
            "INSERT INTO folders (user_id, parent_id, name, path)
             VALUES (?, ?, ?, ?)
             RETURNING {FOLDER_COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&sql)
            .bind(folder.user_id)
            .bind(folder.parent_id)
            .bind(&folder.name)
            .bind(&folder.path)
            .fetch_one(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    DriveError::DuplicateName("Folder with this name already exists".to_string())
                }
                _ => DriveError::Database(e.to_string()),
            })
    }

    /// Get a folder owned by `user_id`.
    pub async fn get_owned(&self, user_id: i64, id: i64) -> Result<Option<Folder>> {
        let sql = format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ? AND user_id = ?");
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(folder)
    }

    /// Find a sibling folder by name under `parent_id` (None = root).
    pub async fn find_by_name(
        &self,
        user_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<Option<Folder>> {
        let sql = format!(
            "SELECT {FOLDER_COLUMNS} FROM folders
             WHERE user_id = ? AND parent_id IS ? AND name = ?"
        );
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(user_id)
            .bind(parent_id)
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        Ok(folder)
    }

    /// List a user's folders directly under `parent_id` (None = root), newest first.
    pub async fn list_by_parent(&self, user_id: i64, parent_id: Option<i64>) -> Result<Vec<Folder>> {
        let sql = format!(
            "SELECT {FOLDER_COLUMNS} FROM folders
             WHERE user_id = ? AND parent_id IS ?
             ORDER BY created_at DESC, id DESC"
        );
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .bind(user_id)
            .bind(parent_id)
            .fetch_all(self.pool)
            .await?;
        Ok(folders)
    }

    /// Count direct child folders.
    pub async fn count_children(&self, id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a folder owned by `user_id`.
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("a@example.com", "A", "B", "hash", 1000))
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_root_and_child() {
        let (db, user_id) = setup().await;
        let repo = FolderRepository::new(db.pool());

        let docs = repo.create(&NewFolder::root(user_id, "Docs")).await.unwrap();
        assert_eq!(docs.path, "/Docs");
        assert_eq!(docs.parent_id, None);
        assert_eq!(docs.user_id, user_id);

        let year = repo
            .create(&NewFolder::child_of(&docs, "2024"))
            .await
            .unwrap();
        assert_eq!(year.path, "/Docs/2024");
        assert_eq!(year.parent_id, Some(docs.id));

        let got = repo.get_owned(user_id, year.id).await.unwrap().unwrap();
        assert_eq!(got, year);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let (db, user_id) = setup().await;
        let repo = FolderRepository::new(db.pool());

        repo.create(&NewFolder::root(user_id, "Docs")).await.unwrap();
        let result = repo.create(&NewFolder::root(user_id, "Docs")).await;
        assert!(matches!(result, Err(DriveError::DuplicateName(_))));

        // Same name under a different parent is fine
        let other = repo.create(&NewFolder::root(user_id, "Other")).await.unwrap();
        repo.create(&NewFolder::child_of(&other, "Docs"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_by_name_and_list() {
        let (db, user_id) = setup().await;
        let repo = FolderRepository::new(db.pool());

        let a = repo.create(&NewFolder::root(user_id, "A")).await.unwrap();
        let b = repo.create(&NewFolder::root(user_id, "B")).await.unwrap();
        repo.create(&NewFolder::child_of(&a, "Inner")).await.unwrap();

        assert!(repo
            .find_by_name(user_id, None, "A")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_name(user_id, None, "Inner")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_name(user_id, Some(a.id), "Inner")
            .await
            .unwrap()
            .is_some());

        // Same second: id breaks the tie, newest first
        let roots = repo.list_by_parent(user_id, None).await.unwrap();
        assert_eq!(
            roots.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );

        assert_eq!(repo.count_children(a.id).await.unwrap(), 1);
        assert_eq!(repo.count_children(b.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_other_user_cannot_see_or_delete() {
        let (db, user_id) = setup().await;
        let other = UserRepository::new(db.pool())
            .create(&NewUser::new("b@example.com", "B", "B", "hash", 1000))
            .await
            .unwrap();
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::root(user_id, "Mine")).await.unwrap();
        assert!(repo.get_owned(other.id, folder.id).await.unwrap().is_none());
        assert!(!repo.delete(other.id, folder.id).await.unwrap());
        assert!(repo.list_by_parent(other.id, None).await.unwrap().is_empty());

        assert!(repo.delete(user_id, folder.id).await.unwrap());
        assert!(repo.get_owned(user_id, folder.id).await.unwrap().is_none());
    }

    #[test]
    fn test_created_at_datetime() {
        let folder = Folder {
            id: 1,
            user_id: 1,
            parent_id: None,
            name: "A".to_string(),
            path: "/A".to_string(),
            created_at: "2024-01-02 03:04:05".to_string(),
        };
        assert_eq!(folder.created_at_datetime().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }
}
