//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{FileRecord, UploadRequest, DEFAULT_MIME_TYPE};
use crate::web::dto::{MessageResponse, UploadForm, UploadResponse};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped, quotes and backslashes are replaced in
/// the plain `filename` parameter, and non-ASCII names additionally get an
/// RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Map a multipart read failure. Exceeding the body limit is a 413.
fn multipart_error(err: MultipartError, limit: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Upload body exceeded the request limit");
        return ApiError::file_too_large(limit);
    }
    tracing::debug!(error = %err, "Failed to read multipart data");
    ApiError::bad_request("Invalid multipart data")
}

/// Map a request that is not a multipart form at all.
fn multipart_rejection(rejection: MultipartRejection) -> ApiError {
    tracing::debug!(error = %rejection, "Upload is not a multipart form");
    ApiError::bad_request("No file uploaded")
}

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with a single "file" part.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file uploaded or malformed form", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 429, description = "Too many requests", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let limit = state.storage.max_size();
    let mut multipart = multipart.map_err(multipart_rejection)?;
    let mut upload: Option<UploadRequest> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        // Parts without a filename are plain form fields
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        if field.name() != Some(FILE_FIELD) || upload.is_some() {
            tracing::debug!(field = ?field.name(), "Rejected unexpected file part");
            return Err(ApiError::bad_request("Unexpected field"));
        }

        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            state
                .storage
                .check_size((content.len() + chunk.len()) as u64)
                .map_err(ApiError::from)?;
            content.extend_from_slice(&chunk);
        }

        upload = Some(UploadRequest::new(filename, content).with_mime_type(mime_type));
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let record = state
        .files()
        .upload(&upload)
        .await
        .map_err(|e| ApiError::from_drive_error(e, "Failed to upload file"))?;

    Ok(Json(UploadResponse::new(record.id, record.content_hash)))
}

/// GET /files - List all files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All file records in upload order", body = Vec<FileRecord>),
        (status = 429, description = "Too many requests", body = ErrorBody),
        (status = 500, description = "Listing failed", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    let records = state
        .files()
        .list()
        .await
        .map_err(|e| ApiError::from_drive_error(e, "Failed to list files"))?;

    tracing::debug!(count = records.len(), "Listed files");
    Ok(Json(records))
}

/// GET /download/:id - Download a file under its original name.
#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 429, description = "Too many requests", body = ErrorBody),
        (status = 500, description = "Download failed", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let download = state
        .files()
        .download(&file_id)
        .await
        .map_err(|e| ApiError::from_drive_error(e, "Failed to download file"))?;

    let record = download.record;
    let content = download.content;

    let content_type = mime_guess::from_path(&record.original_name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.original_name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to download file")
        })?;

    Ok(response)
}

/// DELETE /delete/:id - Delete a file and its blob.
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 429, description = "Too many requests", body = ErrorBody),
        (status = 500, description = "Delete failed", body = ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .files()
        .delete(&file_id)
        .await
        .map_err(|e| ApiError::from_drive_error(e, "Failed to delete file"))?;

    Ok(Json(MessageResponse::new("File deleted successfully")))
}
