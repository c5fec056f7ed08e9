//! Prometheus metrics for the proofgate server.
//!
//! Provides metric initialization and helper functions for recording HTTP, verification and
//! user store metrics.

use std::time::{Duration, Instant};

use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use strum::IntoStaticStr;

/// Outcome of a `/api/verify` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum VerifyOutcome {
    /// Inbound body could not be decoded.
    InvalidRequest,
    /// Verifier accepted the proof.
    Verified,
    /// Verifier answered with a failure that was relayed to the caller.
    Rejected,
    /// Verifier could not be reached or answered with garbage.
    Error,
}

/// Initialize the Prometheus metrics exporter and register metric descriptions.
///
/// Returns a handle that can be used to render metrics for the `/metrics` endpoint.
pub(crate) fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // HTTP layer metrics
    describe_counter!("proofgate_http_requests_total", "Total HTTP requests");
    describe_histogram!(
        "proofgate_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "proofgate_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    // Verify metrics
    describe_counter!("proofgate_verify_total", "Total verify requests by outcome");
    describe_histogram!(
        "proofgate_verify_duration_seconds",
        "Verify request time in seconds, verifier and store round trips included"
    );
    describe_counter!(
        "proofgate_store_updates_total",
        "Total user store updates by status"
    );

    describe_gauge!("proofgate_build_info", "Build information");

    Ok(handle)
}

/// Record an HTTP request start (increment in-flight gauge).
pub(crate) fn record_request_start(endpoint: &str) {
    gauge!("proofgate_http_requests_in_flight", "endpoint" => endpoint.to_string()).increment(1.0);
}

/// Record an HTTP request completion with status and duration.
pub(crate) fn record_request_end(endpoint: &str, method: &str, status: u16, duration: Duration) {
    gauge!("proofgate_http_requests_in_flight", "endpoint" => endpoint.to_string()).decrement(1.0);
    counter!(
        "proofgate_http_requests_total",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "proofgate_http_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a verify request result.
pub(crate) fn record_verify(outcome: VerifyOutcome, duration: Duration) {
    let outcome: &'static str = outcome.into();
    counter!("proofgate_verify_total", "outcome" => outcome).increment(1);
    histogram!("proofgate_verify_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

/// Record a user store update result.
pub(crate) fn record_store_update(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!("proofgate_store_updates_total", "status" => status).increment(1);
}

/// Set the build info gauge with version label.
pub(crate) fn set_build_info(version: &str) {
    gauge!("proofgate_build_info", "version" => version.to_string()).set(1.0);
}

/// Endpoint label of a request: its route template, never the raw path.
pub(crate) fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Axum middleware that records HTTP request metrics.
pub(crate) async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = endpoint_label(&request);

    record_request_start(&path);

    let response = next.run(request).await;

    let status = response.status().as_u16();
    record_request_end(&path, &method, status, start.elapsed());

    response
}
