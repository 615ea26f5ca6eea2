// Prometheus metrics definitions for the paldex backend.

use std::sync::Once;
use std::time::Instant;

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Stored pals across all species, as of the last write.
    pub static ref STORED_PALS: IntGauge =
        IntGauge::new("paldex_stored_pals", "Stored pals across all species").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    pub static ref PALS_ADDED_TOTAL: IntCounter =
        IntCounter::new("paldex_pals_added_total", "Pals added to the store").unwrap();

    pub static ref PALS_REMOVED_TOTAL: IntCounter =
        IntCounter::new("paldex_pals_removed_total", "Pals removed from the store").unwrap();

    pub static ref IMPORTS_TOTAL: IntCounter =
        IntCounter::new("paldex_imports_total", "Bulk data imports").unwrap();

    /// Rejected requests, by error kind.
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("paldex_validation_failures_total", "Requests rejected by validation"),
        &["kind"],
    )
    .unwrap();

    /// Failed store calls, by operation (read/write).
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("paldex_store_errors_total", "Failed store gateway calls"),
        &["op"],
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("paldex_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "paldex_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(STORED_PALS.clone()),
            Box::new(PALS_ADDED_TOTAL.clone()),
            Box::new(PALS_REMOVED_TOTAL.clone()),
            Box::new(IMPORTS_TOTAL.clone()),
            Box::new(VALIDATION_FAILURES_TOTAL.clone()),
            Box::new(STORE_ERRORS_TOTAL.clone()),
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(API_REQUEST_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::warn!("Failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Label for requests that matched no route.
pub const UNMATCHED: &str = "unmatched";

/// Middleware recording request count and latency, labelled by route
/// template so unknown paths share a single series.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED.to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();
    API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(started.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use prometheus::core::Collector;
    use tower::ServiceExt;

    #[test]
    fn test_register_twice_does_not_panic() {
        register_metrics();
        register_metrics();
        PALS_ADDED_TOTAL.inc();
        let output = gather_metrics();
        assert!(output.contains("paldex_pals_added_total"));
    }

    #[test]
    fn test_metric_increments() {
        STORED_PALS.inc();
        STORED_PALS.dec();

        VALIDATION_FAILURES_TOTAL
            .with_label_values(&["unknown_trait"])
            .inc();
        STORE_ERRORS_TOTAL.with_label_values(&["write"]).inc();
        API_REQUESTS_TOTAL
            .with_label_values(&["GET", "/api/pals", "200"])
            .inc();
        API_REQUEST_DURATION_SECONDS
            .with_label_values(&["/api/pals"])
            .observe(0.01);
    }

    #[tokio::test]
    async fn test_unknown_paths_share_one_series() {
        let app = Router::new()
            .route("/api/pals", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(track_requests));
        let unmatched = API_REQUESTS_TOTAL.with_label_values(&["GET", UNMATCHED, "404"]);
        let before = unmatched.get();

        for uri in ["/scan/abc", "/scan/def", "/api/pals"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            app.clone().oneshot(req).await.unwrap();
        }

        assert!(unmatched.get() >= before + 2);
        let labels: Vec<String> = API_REQUESTS_TOTAL
            .collect()
            .iter()
            .flat_map(|family| family.get_metric().to_vec())
            .flat_map(|m| m.get_label().to_vec())
            .map(|l| l.get_value().to_string())
            .collect();
        assert!(labels.iter().any(|l| l == "/api/pals"));
        assert!(!labels.iter().any(|l| l.starts_with("/scan")));
    }
}
