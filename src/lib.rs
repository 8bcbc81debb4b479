//! DriveClone - personal cloud storage backend.
//!
//! Users register and activate by email, then keep files in a per-user
//! folder tree. File bytes live in an object store (S3 or a local
//! directory); metadata and quotas live in SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod drive;
pub mod error;
pub mod logging;
pub mod mail;
pub mod storage;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{DriveError, Result};
