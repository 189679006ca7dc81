//! Prometheus metrics
//!
//! Handlers record one counter increment and one latency sample per request:
//! - `design_mentor_requests_total{kind, outcome}`
//! - `design_mentor_request_duration_seconds{kind}`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::state::AppState;

pub const REQUESTS_TOTAL: &str = "design_mentor_requests_total";
pub const REQUEST_DURATION: &str = "design_mentor_request_duration_seconds";

/// Install the global Prometheus recorder
///
/// Returns `None` if a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            metrics::describe_counter!(REQUESTS_TOTAL, "Requests handled, by kind and outcome");
            metrics::describe_histogram!(REQUEST_DURATION, "Request latency in seconds");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not install Prometheus recorder");
            None
        }
    }
}

pub fn record_request(kind: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(REQUESTS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
    metrics::histogram!(REQUEST_DURATION, "kind" => kind).record(elapsed.as_secs_f64());
}

/// Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(ref handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics are disabled".to_string(),
        ),
    }
}
