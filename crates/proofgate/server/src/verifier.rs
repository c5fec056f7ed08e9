//! HTTP client of the external proof verifier.

use anyhow::Context;
use proofgate_server_config::VerifierConfig;
use proofgate_types::{VerifierResponse, VerifyRequest};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// Failure of a verify round trip before a verifier answer could be read.
#[derive(Debug, Error)]
pub(crate) enum VerifierError {
    /// Connection, timeout or body read failure.
    #[error("Request to verifier failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The verifier answered with a body that is not a JSON object.
    #[error("Verifier answered {status} with an undecodable body {body:?}: {source}")]
    Decode {
        /// Status of the verifier response.
        status: StatusCode,
        /// Raw response body.
        body: String,
        /// Decoding error.
        source: serde_json::Error,
    },
    /// The verifier answered with JSON that is not an object.
    #[error("Verifier answered {status} with a non-object body {body}")]
    NotAnObject {
        /// Status of the verifier response.
        status: StatusCode,
        /// Decoded response body.
        body: Value,
    },
}

/// Verifier answer: its status, the body as received and the fields read from it.
#[derive(Clone, Debug)]
pub(crate) struct VerifierReply {
    pub(crate) status: StatusCode,
    pub(crate) raw: Value,
    pub(crate) body: VerifierResponse,
}

/// Client posting proofs to `<base_url>/api/v1/verify/<app_id>`.
#[derive(Clone, Debug)]
pub(crate) struct VerifierClient {
    client: Client,
    endpoint: Url,
}

impl VerifierClient {
    /// Creates a client from configuration. Fails if the endpoint is not a valid URL.
    pub(crate) fn new(config: &VerifierConfig) -> anyhow::Result<Self> {
        let endpoint = config.verify_endpoint()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Failed to build verifier HTTP client")?;
        Ok(Self { client, endpoint })
    }

    /// Returns the verify endpoint.
    pub(crate) fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts the payload as JSON and returns whatever the verifier answered, whatever the status.
    pub(crate) async fn verify(
        &self,
        payload: &VerifyRequest,
    ) -> Result<VerifierReply, VerifierError> {
        let res = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = res.status();
        let bytes = res.bytes().await?;
        let raw: Value = serde_json::from_slice(&bytes).map_err(|source| VerifierError::Decode {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            source,
        })?;
        let Some(body) = VerifierResponse::from_json(&raw) else {
            return Err(VerifierError::NotAnObject { status, body: raw });
        };

        Ok(VerifierReply { status, raw, body })
    }
}
