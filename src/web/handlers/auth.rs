//! Authentication handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    RegisterRequest, ResetPasswordRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/auth/register - Create an inactive account and send the activation link.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let registration = state
        .accounts()
        .register(&req.email, &req.first_name, &req.last_name, &req.password)
        .await?;

    let message = if registration.email_sent {
        "Registration successful! Please check your email to activate your account."
    } else {
        "Registration successful! However, we could not send the activation email. Please contact support."
    };

    Ok((StatusCode::CREATED, Json(MessageResponse::new(message))))
}

/// GET /api/auth/activate/:token - Activate an account.
#[utoipa::path(
    get,
    path = "/api/auth/activate/{token}",
    tag = "auth",
    params(
        ("token" = String, Path, description = "Activation token from the email link")
    ),
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Invalid or expired activation token")
    )
)]
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts().activate(&token).await?;
    Ok(Json(MessageResponse::new(
        "Account activated successfully. You can now login.",
    )))
}

/// POST /api/auth/login - Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .accounts()
        .authenticate(&req.email, &req.password)
        .await?;

    let token = state.generate_access_token(user.id, &user.email)?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: UserInfo::from(user),
    }))
}

/// POST /api/auth/forgotpassword - Email a password reset link.
#[utoipa::path(
    post,
    path = "/api/auth/forgotpassword",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent", body = MessageResponse),
        (status = 404, description = "No account with this email"),
        (status = 502, description = "Reset email could not be sent")
    )
)]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts().forgot_password(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "Password reset email sent successfully. Please check your inbox.",
    )))
}

/// PUT /api/auth/resetpassword/:token - Set a new password.
#[utoipa::path(
    put,
    path = "/api/auth/resetpassword/{token}",
    tag = "auth",
    params(
        ("token" = String, Path, description = "Reset token from the email link")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid password or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .accounts()
        .reset_password(&token, &req.password)
        .await?;
    Ok(Json(MessageResponse::new(
        "Password updated successfully. You can now login with your new password.",
    )))
}

/// GET /api/auth/me - Get current user info.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.accounts().me(auth.user_id()).await?;
    Ok(Json(MeResponse {
        success: true,
        user: UserInfo::from(user),
    }))
}
