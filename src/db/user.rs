//! User model for DriveClone.

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login email (unique, lowercase).
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Whether the account has been activated.
    pub is_active: bool,
    /// Bytes currently stored.
    pub storage_used: i64,
    /// Maximum bytes the user may store.
    pub storage_limit: i64,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Bytes still available before the limit is reached.
    pub fn storage_remaining(&self) -> i64 {
        (self.storage_limit - self.storage_used).max(0)
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email; normalized to lowercase on creation.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Storage limit in bytes.
    pub storage_limit: i64,
    /// Whether the account starts active.
    pub is_active: bool,
}

impl NewUser {
    /// Create a new inactive user.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
        storage_limit: i64,
    ) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: password.into(),
            storage_limit,
            is_active: false,
        }
    }

    /// Create the user already activated.
    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = NewUser::new("  Alice@Example.COM ", "Alice", "Smith", "hash", 1000);
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.is_active);
        assert!(user.active().is_active);
    }

    #[test]
    fn test_storage_remaining() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password: String::new(),
            is_active: true,
            storage_used: 300,
            storage_limit: 1000,
            created_at: "2024-01-01 00:00:00".to_string(),
        };
        assert_eq!(user.storage_remaining(), 700);
    }
}
