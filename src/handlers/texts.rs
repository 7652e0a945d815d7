//! Text History Handlers
//!
//! Save, list and delete operations for the rolling text history.

use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::info;

use super::state::AppContext;
use super::types::{
    DeleteTextRequest, MessageResponse, RowsResponse, SaveTextRequest, SaveUrlTextParams, TextRow,
};
use crate::errors::AppError;
use crate::store::{EntryId, Origin};

/// Application state type alias
pub type AppState = std::sync::Arc<AppContext>;

// =============================================================================
// LIST HANDLER
// =============================================================================

/// GET /getTexts - List stored snippets, newest first
#[tracing::instrument(skip(state))]
pub async fn get_texts(State(state): State<AppState>) -> Result<Json<RowsResponse>, AppError> {
    let entries = {
        let history = state.history.clone();
        tokio::task::spawn_blocking(move || history.list())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    Ok(Json(RowsResponse {
        rows: entries.into_iter().map(TextRow::from).collect(),
    }))
}

// =============================================================================
// SAVE HANDLERS
// =============================================================================

/// POST /saveText - Save a snippet submitted from the web UI
#[tracing::instrument(skip(state, req))]
pub async fn save_text(
    State(state): State<AppState>,
    Json(req): Json<SaveTextRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = req
        .text
        .ok_or_else(|| AppError::MissingField("text".to_string()))?;

    let entry = {
        let history = state.history.clone();
        tokio::task::spawn_blocking(move || history.save(&text, Origin::Interactive))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    info!("Saved interactive text entry {}", entry.id);
    Ok(Json(MessageResponse::new("Text saved")))
}

/// GET /saveUrlText?text=... - Save a snippet via the URL shortcut
///
/// Same store path as /saveText, tagged with a programmatic origin. Useful
/// for bookmarklets and shell one-liners where a JSON POST is awkward.
#[tracing::instrument(skip(state, params))]
pub async fn save_url_text(
    State(state): State<AppState>,
    Query(params): Query<SaveUrlTextParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = params
        .text
        .ok_or_else(|| AppError::MissingField("text".to_string()))?;

    let entry = {
        let history = state.history.clone();
        tokio::task::spawn_blocking(move || history.save(&text, Origin::Programmatic))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    info!("Saved programmatic text entry {}", entry.id);
    Ok(Json(MessageResponse::new("Text saved")))
}

// =============================================================================
// DELETE HANDLER
// =============================================================================

/// DELETE /delete - Remove one snippet by its id
#[tracing::instrument(skip(state, req))]
pub async fn delete_text(
    State(state): State<AppState>,
    Json(req): Json<DeleteTextRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let raw = req
        .unix_time
        .ok_or_else(|| AppError::MissingField("unixTime".to_string()))?;
    let id: EntryId = raw.parse().map_err(|_| AppError::InvalidInput {
        field: "unixTime".to_string(),
        reason: format!("'{raw}' is not a millisecond timestamp id"),
    })?;

    let history = state.history.clone();
    tokio::task::spawn_blocking(move || history.delete(id))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??;

    Ok(Json(MessageResponse::new("Entry deleted")))
}
