//! Account lifecycle for DriveClone.
//!
//! Registration, activation, credential checks and password reset. Tokens
//! sent by email are stored only as SHA-256 digests and are single-use.

use tracing::{info, warn};

use super::password::{hash_password, verify_password, PasswordError};
use super::token::{generate_token, hash_token};
use super::validation::{validate_email, validate_name};
use crate::config::Config;
use crate::db::{sql_timestamp, NewUser, User, UserRepository};
use crate::mail::{activation_email, password_reset_email, Mailer};
use crate::{Database, DriveError, Result};

/// Settings the account service needs from configuration.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Base URL of the web client; email links point here.
    pub frontend_url: String,
    /// Lifetime of activation links.
    pub activation_ttl: chrono::Duration,
    /// Lifetime of password reset links.
    pub reset_ttl: chrono::Duration,
    /// Storage limit given to new accounts, in bytes.
    pub storage_limit: i64,
}

impl AccountSettings {
    /// Build settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            frontend_url: config.server.frontend_url.trim_end_matches('/').to_string(),
            activation_ttl: chrono::Duration::hours(config.auth.activation_token_ttl_hours),
            reset_ttl: chrono::Duration::minutes(config.auth.reset_token_ttl_minutes),
            storage_limit: config.auth.default_storage_limit_bytes,
        }
    }
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of a registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The new, inactive account.
    pub user: User,
    /// Whether the activation email went out.
    pub email_sent: bool,
}

/// Account operations over shared handles.
pub struct AccountService<'a> {
    db: &'a Database,
    mailer: &'a dyn Mailer,
    settings: &'a AccountSettings,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService.
    pub fn new(db: &'a Database, mailer: &'a dyn Mailer, settings: &'a AccountSettings) -> Self {
        Self {
            db,
            mailer,
            settings,
        }
    }

    /// Register a new inactive account and send its activation email.
    ///
    /// A failed email does not undo the registration; the caller learns about
    /// it through [`Registration::email_sent`].
    pub async fn register(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Registration> {
        let email = email.trim().to_lowercase();
        let first_name = first_name.trim();
        let last_name = last_name.trim();

        validate_email(&email).map_err(|e| DriveError::Validation(e.to_string()))?;
        validate_name("firstName", first_name)
            .map_err(|e| DriveError::Validation(e.to_string()))?;
        validate_name("lastName", last_name).map_err(|e| DriveError::Validation(e.to_string()))?;

        let repo = UserRepository::new(self.db.pool());
        if repo.email_exists(&email).await? {
            return Err(DriveError::DuplicateName(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password).map_err(password_error)?;
        let user = repo
            .create(&NewUser::new(
                &email,
                first_name,
                last_name,
                password_hash,
                self.settings.storage_limit,
            ))
            .await?;
        info!(user_id = user.id, email = %user.email, "User registered");

        let token = generate_token();
        let expires = sql_timestamp(chrono::Utc::now() + self.settings.activation_ttl);
        repo.set_activation_token(user.id, &hash_token(&token), &expires)
            .await?;

        let url = format!("{}/activate/{}", self.settings.frontend_url, token);
        let mail = activation_email(&user.email, &user.first_name, &url);
        let email_sent = match self.mailer.send(&mail).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Failed to send activation email");
                false
            }
        };

        Ok(Registration { user, email_sent })
    }

    /// Activate the account holding `token`.
    pub async fn activate(&self, token: &str) -> Result<User> {
        let repo = UserRepository::new(self.db.pool());
        let user = repo
            .activate_by_token(&hash_token(token))
            .await?
            .ok_or_else(|| {
                DriveError::Validation("Invalid or expired activation token".to_string())
            })?;

        info!(user_id = user.id, "Account activated");
        Ok(user)
    }

    /// Check credentials and return the account.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DriveError::Validation(
                "Please provide email and password".to_string(),
            ));
        }

        let invalid = || DriveError::Auth("Invalid credentials".to_string());

        let repo = UserRepository::new(self.db.pool());
        let user = repo.get_by_email(email).await?.ok_or_else(invalid)?;

        verify_password(password, &user.password).map_err(|_| invalid())?;

        if !user.is_active {
            return Err(DriveError::Auth(
                "Please activate your account first".to_string(),
            ));
        }

        info!(user_id = user.id, "Login successful");
        Ok(user)
    }

    /// Issue a password reset token and email it.
    ///
    /// If the email cannot be sent the token is withdrawn again.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let repo = UserRepository::new(self.db.pool());
        let user = repo.get_by_email(email).await?.ok_or_else(|| {
            DriveError::NotFound("No account found with this email address".to_string())
        })?;

        let token = generate_token();
        let expires = sql_timestamp(chrono::Utc::now() + self.settings.reset_ttl);
        repo.set_reset_token(user.id, &hash_token(&token), &expires)
            .await?;

        let url = format!("{}/reset-password/{}", self.settings.frontend_url, token);
        let mail = password_reset_email(&user.email, &user.first_name, &url);
        if let Err(e) = self.mailer.send(&mail).await {
            warn!(user_id = user.id, error = %e, "Failed to send reset email");
            repo.clear_reset_token(user.id).await?;
            return Err(DriveError::Upstream(
                "Failed to send reset email. Please try again later.".to_string(),
            ));
        }

        info!(user_id = user.id, "Password reset email sent");
        Ok(())
    }

    /// Set a new password using a reset token.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password).map_err(password_error)?;

        let repo = UserRepository::new(self.db.pool());
        let user = repo
            .reset_password_by_token(&hash_token(token), &password_hash)
            .await?
            .ok_or_else(|| DriveError::Validation("Invalid or expired reset token".to_string()))?;

        info!(user_id = user.id, "Password reset");
        Ok(user)
    }

    /// Current profile of an authenticated user.
    pub async fn me(&self, user_id: i64) -> Result<User> {
        UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| DriveError::NotFound("User not found".to_string()))
    }
}

fn password_error(e: PasswordError) -> DriveError {
    match e {
        PasswordError::TooShort | PasswordError::TooLong => DriveError::Validation(e.to_string()),
        other => DriveError::Auth(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::OutgoingMail;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn last_token(&self, marker: &str) -> String {
            let sent = self.sent.lock().unwrap();
            let text = &sent.last().unwrap().text;
            let start = text.find(marker).unwrap() + marker.len();
            text[start..start + 64].to_string()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            if self.fail {
                return Err(DriveError::Upstream("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn settings() -> AccountSettings {
        AccountSettings {
            frontend_url: "http://front".to_string(),
            activation_ttl: chrono::Duration::hours(24),
            reset_ttl: chrono::Duration::minutes(10),
            storage_limit: 10_000,
        }
    }

    #[tokio::test]
    async fn test_register_activate_login() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        let reg = service
            .register(" Alice@Example.com ", " Alice ", "Smith", "password123")
            .await
            .unwrap();
        assert!(reg.email_sent);
        assert_eq!(reg.user.email, "alice@example.com");
        assert_eq!(reg.user.first_name, "Alice");
        assert_eq!(reg.user.storage_limit, 10_000);
        assert!(!reg.user.is_active);

        // Inactive accounts cannot log in
        let result = service.authenticate("alice@example.com", "password123").await;
        assert!(matches!(result, Err(DriveError::Auth(ref m)) if m.contains("activate")));

        let token = mailer.last_token("http://front/activate/");
        let user = service.activate(&token).await.unwrap();
        assert!(user.is_active);

        // Single use
        assert!(matches!(
            service.activate(&token).await,
            Err(DriveError::Validation(_))
        ));

        let user = service
            .authenticate("ALICE@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.id, reg.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        service
            .register("dup@example.com", "A", "B", "password123")
            .await
            .unwrap();
        let result = service
            .register("DUP@example.com", "C", "D", "password123")
            .await;
        assert!(
            matches!(result, Err(DriveError::DuplicateName(ref m)) if m == "User with this email already exists")
        );
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        for (email, first, last, password) in [
            ("not-an-email", "A", "B", "password123"),
            ("a@example.com", "  ", "B", "password123"),
            ("a@example.com", "A", "", "password123"),
            ("a@example.com", "A", "B", "short"),
        ] {
            let result = service.register(email, first, last, password).await;
            assert!(matches!(result, Err(DriveError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let db = setup_db().await;
        let mailer = RecordingMailer::failing();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        let reg = service
            .register("a@example.com", "A", "B", "password123")
            .await
            .unwrap();
        assert!(!reg.email_sent);
        assert!(service.me(reg.user.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_errors() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        let hash = hash_password("password123").unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("a@example.com", "A", "B", hash, 100).active())
            .await
            .unwrap();

        assert!(matches!(
            service.authenticate("", "password123").await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            service.authenticate("a@example.com", "").await,
            Err(DriveError::Validation(_))
        ));
        assert!(matches!(
            service.authenticate("nobody@example.com", "password123").await,
            Err(DriveError::Auth(ref m)) if m == "Invalid credentials"
        ));
        assert!(matches!(
            service.authenticate("a@example.com", "wrongpass1").await,
            Err(DriveError::Auth(ref m)) if m == "Invalid credentials"
        ));
    }

    #[tokio::test]
    async fn test_forgot_and_reset_password() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        let hash = hash_password("password123").unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("a@example.com", "A", "B", hash, 100).active())
            .await
            .unwrap();

        assert!(matches!(
            service.forgot_password("nobody@example.com").await,
            Err(DriveError::NotFound(_))
        ));

        service.forgot_password("A@example.com").await.unwrap();
        let token = mailer.last_token("http://front/reset-password/");

        assert!(matches!(
            service.reset_password(&token, "short").await,
            Err(DriveError::Validation(_))
        ));

        service.reset_password(&token, "newpassword1").await.unwrap();
        assert!(service
            .authenticate("a@example.com", "newpassword1")
            .await
            .is_ok());
        assert!(service
            .authenticate("a@example.com", "password123")
            .await
            .is_err());

        // Single use
        assert!(matches!(
            service.reset_password(&token, "another-pass").await,
            Err(DriveError::Validation(ref m)) if m == "Invalid or expired reset token"
        ));
    }

    #[tokio::test]
    async fn test_forgot_password_mail_failure_withdraws_token() {
        let db = setup_db().await;
        let mailer = RecordingMailer::failing();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);

        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("a@example.com", "A", "B", "x", 100).active())
            .await
            .unwrap();

        let result = service.forgot_password("a@example.com").await;
        assert!(matches!(result, Err(DriveError::Upstream(_))));

        let pending: Option<String> =
            sqlx::query_scalar("SELECT reset_token FROM users WHERE id = ?")
                .bind(user.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert!(pending.is_none());
    }

    #[tokio::test]
    async fn test_me_missing_user() {
        let db = setup_db().await;
        let mailer = RecordingMailer::default();
        let settings = settings();
        let service = AccountService::new(&db, &mailer, &settings);
        assert!(matches!(service.me(42).await, Err(DriveError::NotFound(_))));
    }
}
