//! Metrics definitions for the casting service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `casting_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: the routed paths with ids replaced by `{id}`, everything else `/other`
//! - `status`: success, error, timeout
//! - `permission`: the eight route permissions
//! - `outcome`: `granted` or an `AuthError` code

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used by
/// `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("casting_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("casting_jwks_refresh".to_string()),
            &[0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000],
        )
        .map_err(|e| format!("Failed to set JWKS refresh buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `casting_http_requests_total`, `casting_http_request_duration_seconds`
///
/// Covers every response, including 404 for unrouted paths and 405.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("casting_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("casting_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto one of the routed endpoints.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/actors" => "/actors",
        "/movies" => "/movies",
        _ => normalize_dynamic_endpoint(path),
    }
}

fn normalize_dynamic_endpoint(path: &str) -> &'static str {
    let mut segments = path.trim_start_matches('/').split('/');

    match (segments.next(), segments.next(), segments.next()) {
        (Some("actors"), Some(id), None) if !id.is_empty() => "/actors/{id}",
        (Some("movies"), Some(id), None) if !id.is_empty() => "/movies/{id}",
        _ => "/other",
    }
}

// ============================================================================
// Authorization Metrics
// ============================================================================

/// Record the outcome of a permission gate.
///
/// Metric: `casting_authorization_total`
/// Labels: `permission`, `outcome` ("granted" or the rejecting error code)
pub fn record_authorization(permission: &'static str, outcome: &'static str) {
    counter!("casting_authorization_total",
        "permission" => permission,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a JWKS fetch.
///
/// Metric: `casting_jwks_refresh_total`, `casting_jwks_refresh_duration_seconds`
/// Labels: `status` ("success" or "error")
pub fn record_jwks_refresh(status: &'static str, duration: Duration) {
    histogram!("casting_jwks_refresh_duration_seconds").record(duration.as_secs_f64());

    counter!("casting_jwks_refresh_total",
        "status" => status
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these calls go to the no-op recorder;
    // they only need to not panic.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/actors", 200, Duration::from_millis(5));
        record_http_request("PATCH", "/actors/1", 404, Duration::from_millis(3));
        record_http_request("DELETE", "/movies/12", 401, Duration::from_millis(2));
        record_http_request("GET", "/actors2", 404, Duration::from_millis(1));
        record_http_request("GET", "/movies", 504, Duration::from_secs(30));
    }

    #[test]
    fn test_record_authorization_and_jwks() {
        record_authorization("get:actors", "granted");
        record_authorization("post:movies", "unauthorized");
        record_jwks_refresh("success", Duration::from_millis(40));
        record_jwks_refresh("error", Duration::from_secs(5));
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(299), "success");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(401), "error");
        assert_eq!(categorize_status_code(422), "error");
        assert_eq!(categorize_status_code(503), "error");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        assert_eq!(normalize_endpoint("/health"), "/health");
        assert_eq!(normalize_endpoint("/ready"), "/ready");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/actors"), "/actors");
        assert_eq!(normalize_endpoint("/movies"), "/movies");
    }

    #[test]
    fn test_normalize_endpoint_resource_ids() {
        assert_eq!(normalize_endpoint("/actors/1"), "/actors/{id}");
        assert_eq!(normalize_endpoint("/actors/2000"), "/actors/{id}");
        assert_eq!(normalize_endpoint("/movies/abc"), "/movies/{id}");
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/actors2"), "/other");
        assert_eq!(normalize_endpoint("/actors/"), "/other");
        assert_eq!(normalize_endpoint("/actors/1/movies"), "/other");
        assert_eq!(normalize_endpoint("/api/v1/me"), "/other");
    }
}
