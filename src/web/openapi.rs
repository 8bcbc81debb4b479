//! OpenAPI document for the HTTP API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    CreateFolderRequest, DownloadResponse, Empty, FileResponse, FolderContentsResponse,
    FolderResponse, ForgotPasswordRequest, HealthResponse, LoginRequest, LoginResponse,
    MeResponse, MessageResponse, RegisterRequest, ResetPasswordRequest, UserInfo,
};
use super::handlers;

/// The generated API description, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "DriveClone API", description = "Personal cloud storage"),
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::activate,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::me,
        handlers::folder::create_folder,
        handlers::folder::list_folders,
        handlers::folder::get_folder_contents,
        handlers::folder::delete_folder,
        handlers::file::upload_file,
        handlers::file::list_files,
        handlers::file::get_file,
        handlers::file::download_file,
        handlers::file::delete_file,
        handlers::object::get_object,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        CreateFolderRequest,
        MessageResponse,
        LoginResponse,
        MeResponse,
        UserInfo,
        FolderResponse,
        FileResponse,
        FolderContentsResponse,
        DownloadResponse,
        HealthResponse,
        Empty,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Accounts and sessions"),
        (name = "folders", description = "Folder hierarchy"),
        (name = "files", description = "File upload and download"),
        (name = "objects", description = "Signed object access"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
