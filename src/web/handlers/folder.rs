//! Folder handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{parse_id, parse_parent, AppState};
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, Empty, FolderContentsResponse, FolderListQuery,
    FolderResponse, ListResponse, ParentRef, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

const FOLDER_NOT_FOUND: &str = "Folder not found";

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 400, description = "Invalid name or duplicate sibling"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let parent = req.parent_folder.as_ref().map(ParentRef::as_text);
    let parent_id = parse_parent(parent.as_deref(), FOLDER_NOT_FOUND)?;
    let folder = state
        .drive()
        .create_folder(auth.user_id(), &req.name, parent_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders - List folders under a parent (root if omitted).
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    params(FolderListQuery),
    responses(
        (status = 200, description = "Folders, newest first", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<FolderListQuery>,
) -> Result<Json<ListResponse<FolderResponse>>, ApiError> {
    let parent_id = parse_parent(query.parent.as_deref(), FOLDER_NOT_FOUND)?;
    let folders = state.drive().list_folders(auth.user_id(), parent_id).await?;

    Ok(Json(ListResponse::new(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// GET /api/folders/:id/contents - Get a folder with its direct children.
#[utoipa::path(
    get,
    path = "/api/folders/{id}/contents",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder contents", body = FolderContentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_folder_contents(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FolderContentsResponse>>, ApiError> {
    let folder_id = parse_id(&id, FOLDER_NOT_FOUND)?;
    let contents = state
        .drive()
        .get_folder_contents(auth.user_id(), folder_id)
        .await?;

    Ok(Json(ApiResponse::new(FolderContentsResponse::from(contents))))
}

/// DELETE /api/folders/:id - Delete an empty folder.
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder deleted"),
        (status = 400, description = "Folder is not empty"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let folder_id = parse_id(&id, FOLDER_NOT_FOUND)?;
    state.drive().delete_folder(auth.user_id(), folder_id).await?;

    Ok(Json(ApiResponse::new(Empty::default())))
}
