//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    activate, create_folder, delete_file, delete_folder, download_file, forgot_password,
    get_file, get_folder_contents, get_object, health_check, list_files, list_folders, login,
    me, register, reset_password, upload_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, security_headers, JwtState};
use super::openapi::ApiDoc;

/// Multipart framing and the `parentFolder` field on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main API router, including `/health` and the OpenAPI document.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let upload_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/activate/:token", get(activate))
        .route("/login", post(login))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/:token", put(reset_password))
        .route("/me", get(me));

    let folder_routes = Router::new()
        .route("/", post(create_folder).get(list_folders))
        .route("/:id", delete(delete_folder))
        .route("/:id/contents", get(get_folder_contents));

    let file_routes = Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/", get(list_files))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/folders", folder_routes)
        .nest("/files", file_routes)
        .route("/objects/*key", get(get_object));

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
