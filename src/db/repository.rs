//! User repository for DriveClone.
//!
//! CRUD for accounts plus the lifecycle-token and storage-counter updates
//! the account and drive services build on.

use super::user::{NewUser, User};
use super::DbPool;
use crate::{DriveError, Result};

const USER_COLUMNS: &str = "id, email, first_name, last_name, password, is_active,
    storage_used, storage_limit, created_at";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Returns `DuplicateName` if the email is already registered.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, first_name, last_name, password, is_active, storage_limit)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password)
        .bind(new_user.is_active)
        .bind(new_user.storage_limit)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DriveError::DuplicateName("User with this email already exists".to_string())
            }
            _ => DriveError::Database(e.to_string()),
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DriveError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Check if an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email.trim().to_lowercase())
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Store the hash and expiry of a freshly issued activation token.
    pub async fn set_activation_token(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET activation_token = ?, activation_token_expires = ? WHERE id = ?",
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Activate the account holding an unexpired activation token.
    ///
    /// The token is cleared in the same statement, so it works once.
    pub async fn activate_by_token(&self, token_hash: &str) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users
             SET is_active = 1, activation_token = NULL, activation_token_expires = NULL
             WHERE activation_token = ? AND activation_token_expires > datetime('now')
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Store the hash and expiry of a password reset token.
    pub async fn set_reset_token(&self, id: i64, token_hash: &str, expires_at: &str) -> Result<()> {
        sqlx::query("UPDATE users SET reset_token = ?, reset_token_expires = ? WHERE id = ?")
            .bind(token_hash)
            .bind(expires_at)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drop any pending password reset token.
    pub async fn clear_reset_token(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET reset_token = NULL, reset_token_expires = NULL WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Replace the password of the account holding an unexpired reset token.
    ///
    /// The token is cleared in the same statement, so it works once.
    pub async fn reset_password_by_token(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users
             SET password = ?, reset_token = NULL, reset_token_expires = NULL
             WHERE reset_token = ? AND reset_token_expires > datetime('now')
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(password_hash)
            .bind(token_hash)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Overwrite the storage counter.
    pub async fn update_storage_used(&self, id: i64, storage_used: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET storage_used = ? WHERE id = ?")
            .bind(storage_used.max(0))
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add `delta` bytes to the storage counter unless that would pass the limit.
    ///
    /// Returns false when the user is missing or the limit would be exceeded.
    pub async fn try_add_storage_used(&self, id: i64, delta: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET storage_used = storage_used + ?
             WHERE id = ? AND storage_used + ? <= storage_limit",
        )
        .bind(delta)
        .bind(id)
        .bind(delta)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subtract `delta` bytes from the storage counter, flooring at zero.
    pub async fn subtract_storage_used(&self, id: i64, delta: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET storage_used = MAX(0, storage_used - ?) WHERE id = ?")
                .bind(delta)
                .bind(id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
