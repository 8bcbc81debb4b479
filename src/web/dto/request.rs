//! Request DTOs for the HTTP layer.
//!
//! Required-field checks live in the account and drive services so the
//! messages match across callers; validators here only bound sizes and
//! reject control characters.

use std::borrow::Cow;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::no_control_chars;

/// User registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    /// First name.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub last_name: String,
    /// Password.
    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Forgot password request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    /// Email address of the account.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
}

/// Reset password request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// New password.
    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,
}

/// Create folder request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub name: String,
    /// Parent folder ID; root when absent, null or empty.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "12")]
    pub parent_folder: Option<ParentRef>,
}

/// A folder id as clients send it in JSON: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Id(i64),
    Text(String),
}

impl ParentRef {
    /// The id in the textual form used by query strings and form fields.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            ParentRef::Id(id) => Cow::Owned(id.to_string()),
            ParentRef::Text(text) => Cow::Borrowed(text),
        }
    }
}

/// Query for `GET /api/folders`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderListQuery {
    /// Parent folder ID; root when omitted.
    pub parent: Option<String>,
}

/// Query for `GET /api/files`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileListQuery {
    /// Containing folder ID; root when omitted.
    pub folder: Option<String>,
}

/// Signature query for `GET /api/objects/*key`.
///
/// Missing values fail verification rather than the query parse.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObjectQuery {
    /// Unix timestamp after which the link is dead.
    #[serde(default)]
    pub expires: i64,
    /// Hex HMAC over the key and expiry.
    #[serde(default)]
    pub signature: String,
}
