//! Health and Infrastructure Handlers
//!
//! Health probe and Prometheus metrics endpoints.

use axum::{extract::State, http::StatusCode, response::Json};

use super::state::AppContext;
use crate::errors::AppError;
use crate::metrics;

/// Application state type alias
pub type AppState = std::sync::Arc<AppContext>;

/// Health response for main health endpoint
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub uptime_secs: u64,
    pub text_entries: usize,
    pub text_capacity: usize,
    pub files: usize,
    pub file_capacity: usize,
    pub file_bytes: u64,
}

/// Main health check endpoint
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let (text_entries, (files, file_bytes)) = {
        let history = state.history.clone();
        let file_store = state.files.clone();
        tokio::task::spawn_blocking(move || -> Result<_, AppError> {
            Ok((history.count()?, file_store.stats()?))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))??
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.config.backend.to_string(),
        uptime_secs: state.uptime_secs(),
        text_entries,
        text_capacity: state.history.capacity(),
        files,
        file_capacity: state.files.capacity(),
        file_bytes,
    }))
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    use prometheus::Encoder;

    // Refresh occupancy gauges before serving metrics
    let counts = {
        let history = state.history.clone();
        let files = state.files.clone();
        tokio::task::spawn_blocking(move || (history.count(), files.stats())).await
    };
    if let Ok((texts, files)) = counts {
        if let Ok(n) = texts {
            metrics::TEXT_ENTRIES.set(n as i64);
        }
        if let Ok((count, bytes)) = files {
            metrics::STORED_FILES.set(count as i64);
            metrics::STORED_FILE_BYTES.set(bytes as i64);
        }
    }

    // Gather and encode metrics
    let encoder = prometheus::TextEncoder::new();
    let metric_families = metrics::METRICS_REGISTRY.gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
