//! Configuration module for DriveClone.

use serde::Deserialize;
use std::path::Path;

use crate::{DriveError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Frontend base URL used in activation and reset links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            frontend_url: default_frontend_url(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/driveclone.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 or an S3-compatible service.
    S3,
    /// Local directory with HMAC-signed download URLs.
    Local,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Bucket name (S3 backend).
    #[serde(default)]
    pub bucket: String,
    /// Region (S3 backend).
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (path-style addressing).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Static access key id. Falls back to the default credential chain.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Static secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Base directory for the local backend.
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// Public base URL that signed local download URLs point at.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Secret used to sign local download URLs.
    #[serde(default)]
    pub signing_secret: String,
    /// Maximum size of a single upload in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Lifetime of download URLs in seconds.
    #[serde(default = "default_download_url_ttl")]
    pub download_url_ttl_secs: u64,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_path() -> String {
    "data/objects".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

fn default_download_url_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            local_path: default_local_path(),
            public_base_url: default_public_base_url(),
            signing_secret: String::new(),
            max_upload_size_mb: default_max_upload_size(),
            download_url_ttl_secs: default_download_url_ttl(),
        }
    }
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// Authentication and account configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
    /// Activation token lifetime in hours.
    #[serde(default = "default_activation_ttl")]
    pub activation_token_ttl_hours: i64,
    /// Password reset token lifetime in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: i64,
    /// Storage limit given to new accounts, in bytes.
    #[serde(default = "default_storage_limit")]
    pub default_storage_limit_bytes: i64,
}

fn default_jwt_expiry() -> u64 {
    30 * 24 * 3600 // 30 days
}

fn default_activation_ttl() -> i64 {
    24
}

fn default_reset_ttl() -> i64 {
    10
}

fn default_storage_limit() -> i64 {
    5 * 1024 * 1024 * 1024 // 5 GiB
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry_secs: default_jwt_expiry(),
            activation_token_ttl_hours: default_activation_ttl(),
            reset_token_ttl_minutes: default_reset_ttl(),
            default_storage_limit_bytes: default_storage_limit(),
        }
    }
}

/// Outgoing mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Whether SMTP delivery is enabled. When disabled, mails are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Use implicit TLS instead of STARTTLS.
    #[serde(default)]
    pub implicit_tls: bool,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Sender address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "DriveClone".to_string()
}

fn default_from_address() -> String {
    "no-reply@driveclone.local".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_smtp_host(),
            port: default_smtp_port(),
            implicit_tls: false,
            username: String::new(),
            password: String::new(),
            from_name: default_from_name(),
            from_address: default_from_address(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DriveError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DRIVECLONE_JWT_SECRET`
    /// - `DRIVECLONE_SIGNING_SECRET`
    /// - `DRIVECLONE_S3_ACCESS_KEY_ID`
    /// - `DRIVECLONE_S3_SECRET_ACCESS_KEY`
    /// - `DRIVECLONE_SMTP_PASSWORD`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_non_empty("DRIVECLONE_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = env_non_empty("DRIVECLONE_SIGNING_SECRET") {
            self.storage.signing_secret = v;
        }
        if let Some(v) = env_non_empty("DRIVECLONE_S3_ACCESS_KEY_ID") {
            self.storage.access_key_id = Some(v);
        }
        if let Some(v) = env_non_empty("DRIVECLONE_S3_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = Some(v);
        }
        if let Some(v) = env_non_empty("DRIVECLONE_SMTP_PASSWORD") {
            self.mail.password = v;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(DriveError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via DRIVECLONE_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        match self.storage.backend {
            StorageBackend::S3 if self.storage.bucket.is_empty() => {
                return Err(DriveError::Config(
                    "storage.bucket must be set for the s3 backend".to_string(),
                ));
            }
            StorageBackend::Local if self.storage.signing_secret.is_empty() => {
                return Err(DriveError::Config(
                    "storage.signing_secret must be set for the local backend".to_string(),
                ));
            }
            _ => {}
        }
        if self.auth.default_storage_limit_bytes <= 0 {
            return Err(DriveError::Config(
                "auth.default_storage_limit_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.frontend_url, "http://localhost:3000");

        assert_eq!(config.database.path, "data/driveclone.db");
        assert_eq!(config.database.max_connections, 5);

        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.max_upload_size_mb, 100);
        assert_eq!(config.storage.max_upload_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.storage.download_url_ttl_secs, 300);

        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.activation_token_ttl_hours, 24);
        assert_eq!(config.auth.reset_token_ttl_minutes, 10);
        assert_eq!(config.auth.default_storage_limit_bytes, 5 * 1024 * 1024 * 1024);

        assert!(!config.mail.enabled);
        assert_eq!(config.mail.from_name, "DriveClone");

        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:3000"]
frontend_url = "https://drive.example.com"

[database]
path = "custom/db.sqlite"
max_connections = 10

[storage]
backend = "s3"
bucket = "drive-bucket"
region = "eu-west-1"
endpoint = "http://localhost:9000"
max_upload_size_mb = 50
download_url_ttl_secs = 120

[auth]
jwt_secret = "secret"
jwt_expiry_secs = 3600
activation_token_ttl_hours = 48
reset_token_ttl_minutes = 15
default_storage_limit_bytes = 1073741824

[mail]
enabled = true
host = "smtp.example.com"
port = 465
implicit_tls = true
username = "mailer"
from_address = "drive@example.com"

[logging]
level = "debug"
file = "logs/driveclone.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(config.server.frontend_url, "https://drive.example.com");

        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.database.max_connections, 10);

        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "drive-bucket");
        assert_eq!(config.storage.region, "eu-west-1");
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.storage.max_upload_size_mb, 50);
        assert_eq!(config.storage.download_url_ttl_secs, 120);

        assert_eq!(config.auth.jwt_secret, "secret");
        assert_eq!(config.auth.jwt_expiry_secs, 3600);
        assert_eq!(config.auth.activation_token_ttl_hours, 48);
        assert_eq!(config.auth.reset_token_ttl_minutes, 15);
        assert_eq!(config.auth.default_storage_limit_bytes, 1073741824);

        assert!(config.mail.enabled);
        assert_eq!(config.mail.port, 465);
        assert!(config.mail.implicit_tls);
        assert_eq!(config.mail.from_address, "drive@example.com");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/driveclone.log"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.path, "data/driveclone.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");
        assert!(result.is_err());
        if let Err(DriveError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_backend() {
        let result = Config::parse("[storage]\nbackend = \"ftp\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(DriveError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original = std::env::var("DRIVECLONE_SMTP_PASSWORD").ok();
        std::env::set_var("DRIVECLONE_SMTP_PASSWORD", "env-smtp-pass");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.mail.password, "env-smtp-pass");

        std::env::set_var("DRIVECLONE_SMTP_PASSWORD", "");
        let mut config = Config::default();
        config.mail.password = "original".to_string();
        config.apply_env_overrides();
        assert_eq!(config.mail.password, "original");

        if let Some(val) = original {
            std::env::set_var("DRIVECLONE_SMTP_PASSWORD", val);
        } else {
            std::env::remove_var("DRIVECLONE_SMTP_PASSWORD");
        }
    }

    #[test]
    fn test_validate_missing_jwt_secret() {
        let config = Config::default();
        let result = config.validate();
        if let Err(DriveError::Config(msg)) = result {
            assert!(msg.contains("jwt_secret"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_backends() {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();

        // Local backend needs a signing secret
        assert!(config.validate().is_err());
        config.storage.signing_secret = "sign".to_string();
        assert!(config.validate().is_ok());

        // S3 backend needs a bucket
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.storage.bucket = "bucket".to_string();
        assert!(config.validate().is_ok());
    }
}
