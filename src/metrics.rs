//! Production-grade metrics with Prometheus
//!
//! Exposes key operational metrics for monitoring and alerting:
//! - Request rates and latencies
//! - Store operation and eviction counts
//! - Current store occupancy
//!
//! NOTE: We intentionally avoid raw filenames and entry ids in metric labels
//! to prevent high-cardinality explosion that can crash Prometheus. Request
//! paths are normalized in the middleware for the same reason.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "yankpaste_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yankpaste_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // store: "texts" or "files"
    // ============================================================================

    /// Store operations (save, upload, delete)
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yankpaste_store_operations_total", "Total store operations"),
        &["store", "operation"]
    ).unwrap();

    /// Retention evictions by cause (count cap vs size cap)
    pub static ref STORE_EVICTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yankpaste_store_evictions_total", "Total retention evictions"),
        &["store", "reason"]
    ).unwrap();

    /// Text entries currently stored
    pub static ref TEXT_ENTRIES: IntGauge = IntGauge::new(
        "yankpaste_text_entries",
        "Number of text entries currently stored"
    ).unwrap();

    /// Files currently stored
    pub static ref STORED_FILES: IntGauge = IntGauge::new(
        "yankpaste_stored_files",
        "Number of files currently stored"
    ).unwrap();

    /// Total bytes across stored files
    pub static ref STORED_FILE_BYTES: IntGauge = IntGauge::new(
        "yankpaste_stored_file_bytes",
        "Total bytes across stored files"
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    // Request metrics
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;

    // Store metrics
    METRICS_REGISTRY.register(Box::new(STORE_OPERATIONS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(STORE_EVICTIONS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(TEXT_ENTRIES.clone()))?;
    METRICS_REGISTRY.register(Box::new(STORED_FILES.clone()))?;
    METRICS_REGISTRY.register(Box::new(STORED_FILE_BYTES.clone()))?;

    Ok(())
}
