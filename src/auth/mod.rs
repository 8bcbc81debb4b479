//! Authentication module for DriveClone.
//!
//! This module provides password hashing, single-use email tokens, input
//! validation and the account lifecycle service.

mod account;
mod password;
mod token;
pub mod validation;

pub use account::{AccountService, AccountSettings, Registration};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use token::{generate_token, hash_token};
pub use validation::ValidationError;
