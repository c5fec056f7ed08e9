//! Application state, initialization, and HTTP endpoints.

use axum::{
    Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use proofgate_server_config::Config;
use reqwest::StatusCode;
use tower_http::trace::TraceLayer;

use crate::{
    app::verify::verify_proof, metrics::http_metrics_middleware, store::UserStore,
    verifier::VerifierClient,
};

mod verify;

/// Largest accepted request body, the usual 1 MiB JSON body parser limit.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Client of the external verifier.
    pub(crate) verifier: VerifierClient,
    /// Store of the user records flagged on successful verification.
    pub(crate) store: UserStore,
    /// Prometheus metrics handle for rendering metrics.
    pub(crate) metrics: PrometheusHandle,
}

impl AppState {
    /// Creates a new application state from configuration.
    pub(crate) fn new(config: &Config, metrics: PrometheusHandle) -> anyhow::Result<Self> {
        Ok(Self {
            verifier: VerifierClient::new(&config.verifier)?,
            store: UserStore::new(&config.store)?,
            metrics,
        })
    }
}

/// Builds the Axum router with all endpoints and middleware.
pub(crate) fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/verify", post(verify_proof))
        .route("/health", get(StatusCode::OK))
        .route("/metrics", get(get_metrics))
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// HTTP handler for the `/metrics` endpoint.
async fn get_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
