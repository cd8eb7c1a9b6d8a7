//! Handlers for files inside a modpack.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};

use crate::modpack::{StagedFile, UploadStaging};
use crate::web::dto::{ExtractResponse, MessageResponse};
use crate::web::error::ApiError;

use super::{header_token, AppState};

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Map a multipart stream error, keeping the body limit distinct from
/// malformed input.
fn multipart_error(e: MultipartError, message: &str) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload rejected: {}", e);
        ApiError::payload_too_large("Upload exceeds the size limit")
    } else {
        tracing::debug!("{}: {}", message, e);
        ApiError::bad_request(message)
    }
}

/// Stream the `file` field of a multipart body into the staging area.
///
/// Other fields are skipped. A partially written upload is removed when the
/// stream fails.
async fn stage_upload(
    staging: &UploadStaging,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StagedFile, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected multipart body: {}", e);
        ApiError::bad_request("No file provided")
    })?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart data"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let mut staged = staging.create()?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?
        {
            staged.append(&chunk)?;
        }
        return Ok(staged);
    }

    Err(ApiError::bad_request("No file provided"))
}

/// POST /uploadFile/:uuid/*path - Upload a single file into a modpack.
#[utoipa::path(
    post,
    path = "/uploadFile/{uuid}/{path}",
    tag = "files",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("path" = String, Path, description = "Relative path inside the modpack"),
        ("token" = String, Header, description = "Owner token")
    ),
    responses(
        (status = 200, description = "File stored", body = MessageResponse),
        (status = 400, description = "No file provided or invalid path"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Modpack not found"),
        (status = 413, description = "Upload too large")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path((uuid, path)): Path<(String, String)>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = header_token(&headers);

    // Reject before reading the body.
    state.store.authorize(&uuid, token)?;

    let upload = stage_upload(&state.staging, multipart).await?;
    state.store.write_file(&uuid, &path, upload, token)?;

    Ok(Json(MessageResponse::new("File uploaded successfully")))
}

/// DELETE /removeModpackFile/:uuid/*path - Remove a single file.
#[utoipa::path(
    delete,
    path = "/removeModpackFile/{uuid}/{path}",
    tag = "files",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("path" = String, Path, description = "Relative path inside the modpack"),
        ("token" = Option<String>, Header, description = "Owner token, checked only in strict mode")
    ),
    responses(
        (status = 200, description = "File removed", body = MessageResponse),
        (status = 400, description = "Invalid path"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Modpack or file not found")
    )
)]
pub async fn remove_modpack_file(
    State(state): State<Arc<AppState>>,
    Path((uuid, path)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    state.check_optional_owner(&uuid, &headers)?;
    state.store.delete_file(&uuid, &path)?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// POST /uploadAndUnzip/:uuid - Upload a ZIP archive and expand it into the
/// modpack root.
#[utoipa::path(
    post,
    path = "/uploadAndUnzip/{uuid}",
    tag = "files",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("token" = Option<String>, Header, description = "Owner token, checked only in strict mode")
    ),
    responses(
        (status = 200, description = "Archive extracted", body = ExtractResponse),
        (status = 400, description = "No file provided"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Modpack not found"),
        (status = 500, description = "Corrupt or unsafe archive")
    )
)]
pub async fn upload_and_unzip(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    state.check_optional_owner(&uuid, &headers)?;
    if !state.store.exists(&uuid) {
        return Err(ApiError::not_found("Modpack not found"));
    }

    let upload = stage_upload(&state.staging, multipart).await?;

    let store = state.store.clone();
    let summary = tokio::task::spawn_blocking(move || store.extract_archive(&uuid, upload))
        .await
        .map_err(|e| {
            tracing::error!("Extraction task failed: {}", e);
            ApiError::internal("Failed to extract archive")
        })??;

    Ok(Json(summary.into()))
}

/// GET /getModpackFile/:uuid/*path - Download a file from a modpack.
///
/// `modpack.json` is served with the token redacted.
#[utoipa::path(
    get,
    path = "/getModpackFile/{uuid}/{path}",
    tag = "files",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("path" = String, Path, description = "Relative path inside the modpack")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "Modpack or file not found")
    )
)]
pub async fn get_modpack_file(
    State(state): State<Arc<AppState>>,
    Path((uuid, path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let content = state.store.read_file(&uuid, &path)?;

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
