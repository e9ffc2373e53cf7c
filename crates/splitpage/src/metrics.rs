//! Prometheus metrics for splitpage.
//!
//! Tracks request outcomes, selections and upstream fetch performance.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use tracing::error;

lazy_static! {
    /// Total number of inbound requests answered
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "splitpage_requests_total",
        "Total number of requests answered by the responder",
        &["method", "status"]
    )
    .unwrap();

    /// Pipeline failures by kind
    pub static ref PIPELINE_ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "splitpage_pipeline_errors_total",
        "Total number of requests that ended in a pipeline error",
        &["kind"]  // kind: unsupported_method|upstream_fetch_failure|empty_manifest|malformed_variant_url|rewrite
    )
    .unwrap();

    /// Selections by origin
    pub static ref SELECTIONS_TOTAL: CounterVec = register_counter_vec!(
        "splitpage_selections_total",
        "Total number of variant selections",
        &["source"]  // source: sticky|fresh
    )
    .unwrap();

    /// Upstream request duration
    pub static ref UPSTREAM_REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "splitpage_upstream_request_duration_ms",
        "Duration of outbound manifest and page requests",
        &["target", "status"],  // target: manifest|page
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap();

    /// Upstream transport errors (no status available)
    pub static ref UPSTREAM_ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "splitpage_upstream_errors_total",
        "Total number of outbound requests that failed without a response",
        &["target"]
    )
    .unwrap();

    /// Total request duration
    pub static ref REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "splitpage_request_duration_ms",
        "Total request duration including fetches and rewriting",
        &["method"],
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record an answered request
pub fn record_request(method: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
}

/// Helper to record a pipeline failure
pub fn record_pipeline_error(kind: &str) {
    PIPELINE_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Helper to record where a selection came from
pub fn record_selection(source: &str) {
    SELECTIONS_TOTAL.with_label_values(&[source]).inc();
}

/// Helper to record upstream request duration
pub fn record_upstream_duration(target: &str, status: u16, duration_ms: f64) {
    UPSTREAM_REQUEST_DURATION_MS
        .with_label_values(&[target, &status.to_string()])
        .observe(duration_ms);
}

/// Helper to record an upstream transport error
pub fn record_upstream_error(target: &str) {
    UPSTREAM_ERRORS_TOTAL.with_label_values(&[target]).inc();
}

/// Helper to record total request duration
pub fn record_request_duration(method: &str, duration_ms: f64) {
    REQUEST_DURATION_MS
        .with_label_values(&[method])
        .observe(duration_ms);
}
