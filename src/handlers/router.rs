//! Router Configuration - Centralized route definitions
//!
//! This module builds the Axum router using handlers from the submodules.
//! Routes are split into the client API (rate-limited by the caller) and the
//! ops surface (health, metrics, static assets).

use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use super::state::AppContext;
use super::{files, health, texts};
use crate::constants::UPLOAD_BODY_OVERHEAD;

/// Application state type alias
pub type AppState = Arc<AppContext>;

/// Build the client API routes
///
/// Body limits are applied per route group: the JSON text routes get the
/// configured JSON limit, the upload route gets the per-file cap plus
/// multipart framing overhead. Rate limiting should be applied by the
/// caller.
pub fn build_api_routes(state: AppState) -> Router {
    let upload_body_limit = usize::try_from(
        state
            .config
            .max_file_size
            .saturating_add(UPLOAD_BODY_OVERHEAD),
    )
    .unwrap_or(usize::MAX);

    let text_routes = Router::new()
        // =================================================================
        // TEXT HISTORY
        // =================================================================
        .route("/getTexts", get(texts::get_texts))
        .route("/saveText", post(texts::save_text))
        .route("/saveUrlText", get(texts::save_url_text))
        .route("/delete", delete(texts::delete_text))
        .layer(DefaultBodyLimit::max(state.config.max_json_body_bytes));

    let file_routes = Router::new()
        // =================================================================
        // FILE STORE
        // =================================================================
        .route("/files", get(files::list_files))
        .route("/download/{filename}", get(files::download_file))
        .route("/files/{filename}", delete(files::delete_file));

    let upload_routes = Router::new()
        // =================================================================
        // FILE UPLOAD (larger body limit)
        // =================================================================
        .route("/upload", post(files::upload_file))
        .layer(DefaultBodyLimit::max(upload_body_limit));

    Router::new()
        .merge(text_routes)
        .merge(file_routes)
        .merge(upload_routes)
        .with_state(state)
}

/// Build the ops routes (health, metrics, web UI)
///
/// These stay outside the rate limiter so probes and scrapes never see 429.
pub fn build_ops_routes(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // =================================================================
        // HEALTH & METRICS
        // =================================================================
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics_endpoint))
        // =================================================================
        // WEB UI
        // =================================================================
        .route(
            "/",
            get(|| async { Redirect::temporary("/static/index.html") }),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Build the complete router with both route groups
///
/// Note: This function does NOT apply rate limiting or the metrics layer.
/// The caller (main.rs) should apply those layers as needed.
pub fn build_router(state: AppState) -> Router {
    let api = build_api_routes(state.clone());
    let ops = build_ops_routes(state);

    Router::new().merge(api).merge(ops)
}
