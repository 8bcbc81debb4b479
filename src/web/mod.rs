//! HTTP API for DriveClone.
//!
//! JSON REST endpoints over the account and drive services, plus signed
//! object downloads for the local storage backend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
