// Lightweight mocks of the verifier and the user store that can be used for unit tests.

use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

use crate::store::StoreError;

/// In-memory user store recording every update it receives.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockUserStore {
    updates: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockUserStore {
    /// Construct a `MockUserStore` that rejects every update after recording it.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Nullifier hashes of the updates received so far.
    pub(crate) fn updates(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }

    pub(crate) fn mark_verified(&self, nullifier_hash: &str) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push(nullifier_hash.to_string());
        if self.fail {
            return Err(StoreError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                msg: Some("mock store failure".to_string()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        io,
        net::SocketAddr,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Router,
        body::Bytes,
        extract::State,
        http::{HeaderMap, Method, StatusCode, Uri, header::CONTENT_TYPE},
        response::{IntoResponse, Response},
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use proofgate_server_config::VerifierConfig;
    use serde_json::Value;
    use tokio::net::TcpListener;

    use crate::{app::AppState, store::UserStore, verifier::VerifierClient};

    /// Request captured by a [`MockServer`].
    #[derive(Clone, Debug)]
    pub(crate) struct ReceivedRequest {
        pub(crate) method: Method,
        pub(crate) path: String,
        pub(crate) query: Option<String>,
        pub(crate) headers: HeaderMap,
        pub(crate) body: Value,
    }

    impl ReceivedRequest {
        pub(crate) fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|v| v.to_str().ok())
        }
    }

    #[derive(Clone)]
    struct MockServerState {
        status: StatusCode,
        body: String,
        delay: Arc<Mutex<Duration>>,
        received: Arc<Mutex<Vec<ReceivedRequest>>>,
    }

    /// HTTP server answering every request with a fixed status and body, standing in for the
    /// verifier or the user store.
    pub(crate) struct MockServer {
        addr: SocketAddr,
        state: MockServerState,
    }

    impl MockServer {
        pub(crate) async fn spawn(status: StatusCode, body: Value) -> Self {
            Self::spawn_raw(status, &body.to_string()).await
        }

        pub(crate) async fn spawn_raw(status: StatusCode, body: &str) -> Self {
            let state = MockServerState {
                status,
                body: body.to_string(),
                delay: Default::default(),
                received: Default::default(),
            };
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let router = Router::new()
                .fallback(record_and_respond)
                .with_state(state.clone());
            tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
            Self { addr, state }
        }

        /// Delays every response by `delay`.
        pub(crate) fn with_delay(self, delay: Duration) -> Self {
            *self.state.delay.lock().unwrap() = delay;
            self
        }

        pub(crate) fn base_url(&self) -> String {
            format!("http://{}", self.addr)
        }

        pub(crate) fn received(&self) -> Vec<ReceivedRequest> {
            self.state.received.lock().unwrap().clone()
        }
    }

    async fn record_and_respond(
        State(state): State<MockServerState>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        state.received.lock().unwrap().push(ReceivedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

        let delay = *state.delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        (
            state.status,
            [(CONTENT_TYPE, "application/json")],
            state.body.clone(),
        )
            .into_response()
    }

    /// Log output of a fmt subscriber, kept in memory.
    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Subscriber writing plain text lines at info level and above into this buffer.
        pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
            let logs = self.clone();
            tracing_subscriber::fmt()
                .with_writer(move || logs.clone())
                .with_ansi(false)
                .finish()
        }

        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Returns a base URL nothing listens on.
    pub(crate) async fn unreachable_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Create an AppState forwarding to `verifier_base_url` and writing to `store`.
    pub(crate) fn mock_app_state(verifier_base_url: String, store: UserStore) -> AppState {
        let verifier = VerifierClient::new(&VerifierConfig {
            base_url: verifier_base_url,
            app_id: "app_staging_test".to_string(),
            timeout_ms: Some(2000),
        })
        .unwrap();

        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            verifier,
            store,
            metrics: recorder.handle(),
        }
    }
}
