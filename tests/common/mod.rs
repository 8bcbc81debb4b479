//! Test helpers for HTTP API tests.
//!
//! Builds a router over an in-memory database, a local object store in a
//! temp dir and a mailer that records instead of sending.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use driveclone::mail::{Mailer, OutgoingMail};
use driveclone::storage::{LocalObjectStore, ObjectStore};
use driveclone::web::handlers::AppState;
use driveclone::web::middleware::JwtState;
use driveclone::web::router::create_router;
use driveclone::{Config, Database, DriveError, Result};

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const PASSWORD: &str = "password123";

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: Mutex<bool>,
}

impl RecordingMailer {
    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// The 64-hex-char token following `marker` in the last message to `to`.
    pub fn token_for(&self, to: &str, marker: &str) -> String {
        let sent = self.sent.lock().unwrap();
        let mail = sent
            .iter()
            .rev()
            .find(|m| m.to == to)
            .expect("no mail sent to recipient");
        let start = mail.text.find(marker).expect("marker not in mail") + marker.len();
        mail.text[start..start + 64].to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(DriveError::Upstream("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// A test server with handles to its collaborators.
pub struct TestContext {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub mailer: Arc<RecordingMailer>,
    pub objects: Arc<LocalObjectStore>,
    _objects_dir: TempDir,
}

impl TestContext {
    /// Default limits: 10 MiB storage per user, 1 MiB per upload.
    pub async fn new() -> Self {
        Self::with_limits(10 * 1024 * 1024, 1024 * 1024).await
    }

    /// Custom per-user storage limit and per-file ceiling, in bytes.
    pub async fn with_limits(storage_limit: i64, max_upload_size: u64) -> Self {
        let mut config = Config::default();
        config.auth.jwt_secret = JWT_SECRET.to_string();
        config.auth.default_storage_limit_bytes = storage_limit;
        config.server.frontend_url = "http://front.test".to_string();
        config.storage.public_base_url = "http://drive.test".to_string();
        config.storage.signing_secret = "signing-secret".to_string();

        let db = Arc::new(
            Database::open_in_memory()
                .await
                .expect("Failed to create test database"),
        );
        let objects_dir = TempDir::new().expect("Failed to create temp dir");
        let objects = Arc::new(
            LocalObjectStore::new(
                objects_dir.path(),
                config.storage.public_base_url.clone(),
                &config.storage.signing_secret,
            )
            .expect("Failed to create object store"),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let object_store: Arc<dyn ObjectStore> = objects.clone();
        let mut app_state = AppState::new(&config, db.clone(), object_store, mailer.clone())
            .with_local_objects(objects.clone());
        app_state.max_upload_size = max_upload_size;

        let jwt_state = Arc::new(JwtState::new(JWT_SECRET));
        let router = create_router(Arc::new(app_state), jwt_state, &[]);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            db,
            mailer,
            objects,
            _objects_dir: objects_dir,
        }
    }

    /// Register an account; returns the response body.
    pub async fn register(&self, email: &str) -> Value {
        let response = self
            .server
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "firstName": "Test",
                "lastName": "User",
                "password": PASSWORD
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    /// Follow the activation link mailed to `email`.
    pub async fn activate(&self, email: &str) {
        let token = self.mailer.token_for(email, "http://front.test/activate/");
        self.server
            .get(&format!("/api/auth/activate/{token}"))
            .await
            .assert_status_ok();
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Register, activate and log in; returns the bearer token.
    pub async fn signed_in_user(&self, email: &str) -> String {
        self.register(email).await;
        self.activate(email).await;
        self.login(email, PASSWORD).await
    }

    /// Create a folder and return its ID.
    pub async fn create_folder(&self, token: &str, name: &str, parent: Option<i64>) -> i64 {
        let response = self
            .server
            .post("/api/folders")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({ "name": name, "parentFolder": parent }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"]["id"]
            .as_i64()
            .expect("folder id")
    }

    /// Current `storageUsed` of the token's user.
    pub async fn storage_used(&self, token: &str) -> i64 {
        let response = self
            .server
            .get("/api/auth/me")
            .add_header(AUTHORIZATION, bearer(token))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["user"]["storageUsed"]
            .as_i64()
            .expect("storageUsed")
    }
}

/// Authorization header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
