//! File Store Handlers
//!
//! Upload, list, download and delete operations for the bounded file store.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use super::state::AppContext;
use super::types::{FileInfo, FilesResponse, MessageResponse};
use crate::errors::AppError;

/// Application state type alias
pub type AppState = std::sync::Arc<AppContext>;

// =============================================================================
// LIST HANDLER
// =============================================================================

/// GET /files - List stored files, newest first
#[tracing::instrument(skip(state))]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FilesResponse>, AppError> {
    let files = {
        let store = state.files.clone();
        tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    Ok(Json(FilesResponse {
        files: files.into_iter().map(FileInfo::from).collect(),
    }))
}

// =============================================================================
// UPLOAD HANDLER
// =============================================================================

/// POST /upload - Store a file from a multipart form
///
/// Reads the first field named "file". Content is buffered with a running
/// size check so an oversized upload is rejected before anything is
/// persisted; the store re-checks the cap for library callers.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    while let Some(mut field) =
        multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput {
                field: "file".to_string(),
                reason: format!("Malformed multipart body: {e}"),
            })?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_owned)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::InvalidInput {
                field: "file".to_string(),
                reason: "Upload is missing a filename".to_string(),
            })?;

        let max = state.files.max_file_size();
        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| AppError::InvalidInput {
            field: "file".to_string(),
            reason: format!("Failed to read upload: {e}"),
        })? {
            let received = (data.len() + chunk.len()) as u64;
            if received > max {
                return Err(AppError::FileTooLarge {
                    size: received,
                    max,
                });
            }
            data.extend_from_slice(&chunk);
        }

        let stored = {
            let store = state.files.clone();
            tokio::task::spawn_blocking(move || store.upload(&original_name, &data))
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
        };

        info!(
            "Uploaded file '{}' ({} bytes)",
            stored.storage_name, stored.size_bytes
        );
        return Ok(Json(MessageResponse::new(format!(
            "File '{}' uploaded",
            stored.storage_name
        ))));
    }

    Err(AppError::MissingField("file".to_string()))
}

// =============================================================================
// DOWNLOAD HANDLER
// =============================================================================

/// GET /download/{filename} - Stream back a stored file
///
/// Content type comes from the filename extension, with octet-stream as the
/// fallback for anything unrecognized.
#[tracing::instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = {
        let store = state.files.clone();
        let name = filename.clone();
        tokio::task::spawn_blocking(move || store.read(&name))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    // Quotes and backslashes would corrupt the quoted-string disposition value.
    let safe_name = filename.replace(['"', '\\'], "_");
    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{safe_name}\""),
        ),
    ];

    Ok((headers, bytes).into_response())
}

// =============================================================================
// DELETE HANDLER
// =============================================================================

/// DELETE /files/{filename} - Remove one stored file
#[tracing::instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let store = state.files.clone();
    let name = filename.clone();
    tokio::task::spawn_blocking(move || store.delete(&name))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??;

    Ok(Json(MessageResponse::new(format!(
        "File '{filename}' deleted"
    ))))
}
