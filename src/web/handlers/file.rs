//! File handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{parse_id, parse_parent, AppState};
use crate::drive::UploadRequest;
use crate::web::dto::{
    ApiResponse, DownloadResponse, Empty, FileListQuery, FileResponse, ListResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

const FILE_NOT_FOUND: &str = "File not found";
const FOLDER_NOT_FOUND: &str = "Folder not found";

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "parentFolder" field.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` plus optional `parentFolder`"),
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "No file, file too large or storage limit exceeded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent folder not found"),
        (status = 502, description = "Object store failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut parent_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let mime_type = field.content_type().map(str::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&state, e))?;
                upload = Some((filename, mime_type, content.to_vec()));
            }
            "parentFolder" => {
                parent_field = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(&state, e))?,
                );
            }
            _ => {}
        }
    }

    let (filename, mime_type, content) =
        upload.ok_or_else(|| ApiError::bad_request("Please upload a file"))?;
    let parent_id = parse_parent(parent_field.as_deref(), FOLDER_NOT_FOUND)?;

    let mut request = UploadRequest::new(filename, content).with_parent(parent_id);
    // Browsers send octet-stream for unknown types; let the filename decide then.
    if let Some(mime_type) = mime_type.filter(|m| m != "application/octet-stream") {
        request = request.with_mime_type(mime_type);
    }

    let file = state.drive().upload_file(auth.user_id(), &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(file))),
    ))
}

fn multipart_error(state: &AppState, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::bad_request(format!(
            "File too large. Maximum size is {}MB",
            state.max_upload_size / 1024 / 1024
        ));
    }
    tracing::debug!("Failed to read multipart body: {}", err);
    ApiError::bad_request("Invalid multipart data")
}

/// GET /api/files - List files in a folder (root if omitted).
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Files, newest first", body = Vec<FileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ListResponse<FileResponse>>, ApiError> {
    let parent_id = parse_parent(query.folder.as_deref(), FOLDER_NOT_FOUND)?;
    let files = state.drive().list_files(auth.user_id(), parent_id).await?;

    Ok(Json(ListResponse::new(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// GET /api/files/:id - Get file metadata.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file_id = parse_id(&id, FILE_NOT_FOUND)?;
    let file = state.drive().get_file(auth.user_id(), file_id).await?;

    Ok(Json(ApiResponse::new(FileResponse::from(file))))
}

/// GET /api/files/:id/download - Get a short-lived download URL.
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Signed download URL", body = DownloadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 502, description = "Object store failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let file_id = parse_id(&id, FILE_NOT_FOUND)?;
    let link = state.drive().download_file(auth.user_id(), file_id).await?;

    Ok(Json(DownloadResponse::from(link)))
}

/// DELETE /api/files/:id - Delete a file and its object.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 502, description = "Object store failure; record kept")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let file_id = parse_id(&id, FILE_NOT_FOUND)?;
    state.drive().delete_file(auth.user_id(), file_id).await?;

    Ok(Json(ApiResponse::new(Empty::default())))
}
