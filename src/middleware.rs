//! HTTP request tracking middleware for observability

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Middleware to track HTTP request latency and counts
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Process request
    let response = next.run(req).await;

    // Record metrics
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    // Normalize path to avoid high cardinality (group dynamic segments)
    let normalized_path = normalize_path(&path);

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &normalized_path, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &normalized_path, &status])
        .inc();

    Ok(response)
}

/// Normalize path to prevent metric cardinality explosion
/// /download/report.pdf -> /download/{filename}
fn normalize_path(path: &str) -> String {
    for (prefix, placeholder) in [
        ("/download/", "/download/{filename}"),
        ("/files/", "/files/{filename}"),
        ("/static/", "/static/{asset}"),
    ] {
        match path.strip_prefix(prefix) {
            Some(rest) if !rest.is_empty() => return placeholder.to_string(),
            _ => {}
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/download/report.pdf"),
            "/download/{filename}"
        );
        assert_eq!(normalize_path("/files/a%20b.txt"), "/files/{filename}");
        assert_eq!(normalize_path("/static/index.html"), "/static/{asset}");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/getTexts"), "/getTexts");
        // Bare collection routes keep their own identity.
        assert_eq!(normalize_path("/files"), "/files");
    }
}
