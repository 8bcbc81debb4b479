//! Signed object downloads for the local storage backend.
//!
//! The S3 backend hands out presigned URLs that point at the bucket; the
//! local backend points them here instead.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::Response,
};
use std::sync::Arc;

use super::AppState;
use crate::drive::FileRepository;
use crate::storage::StorageError;
use crate::web::dto::ObjectQuery;
use crate::web::error::ApiError;

/// Build a Content-Disposition value that cannot inject headers.
///
/// Control characters are dropped, quotes and backslashes replaced, and
/// non-ASCII names get an RFC 5987 `filename*` parameter.
pub fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

/// GET /api/objects/*key - Serve an object through a signed URL.
#[utoipa::path(
    get,
    path = "/api/objects/{key}",
    tag = "objects",
    params(
        ("key" = String, Path, description = "Object key"),
        ObjectQuery
    ),
    responses(
        (status = 200, description = "Object bytes", content_type = "application/octet-stream"),
        (status = 403, description = "Bad signature or expired link"),
        (status = 404, description = "Object not found")
    )
)]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<ObjectQuery>,
) -> Result<Response<Body>, ApiError> {
    let store = state
        .local_objects
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Object not found"))?;

    if !store.verify(&key, query.expires, &query.signature) {
        return Err(ApiError::forbidden("Invalid or expired download link"));
    }

    let record = FileRepository::new(state.db.pool())
        .get_by_storage_key(&key)
        .await?
        .ok_or_else(|| ApiError::not_found("Object not found"))?;

    let content = store.read(&key).await.map_err(|e| match e {
        StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
            ApiError::not_found("Object not found")
        }
        other => {
            tracing::error!(key = %key, "Failed to read object: {}", other);
            ApiError::internal("Failed to read object")
        }
    })?;

    Response::builder()
        .header(header::CONTENT_TYPE, &record.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
