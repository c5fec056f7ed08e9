use proofgate_types::{VerifyReply, VerifyRequest};
use reqwest::{Client, IntoUrl, StatusCode, Url};

use crate::Error;

/// HTTP client for proofgate servers.
#[derive(Clone, Debug)]
pub struct ProofgateClient {
    base_url: Url,
    client: Client,
}

impl ProofgateClient {
    /// Creates a new client connected to the specified server URL.
    pub fn new(base_url: impl IntoUrl) -> Result<Self, Error> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a new client with a custom [`reqwest::Client`].
    pub fn with_client(base_url: impl IntoUrl, client: Client) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.into_url()?,
            client,
        })
    }

    /// Submits a proof for verification.
    ///
    /// Returns the status and reply for every response carrying a reply, including verifier
    /// rejections relayed by the server. Inspect [`VerifyReply::is_success`] to tell them apart.
    pub async fn verify(&self, req: &VerifyRequest) -> Result<(StatusCode, VerifyReply), Error> {
        let res = self
            .client
            .post(self.base_url.join("api/verify")?)
            .json(req)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        match serde_json::from_str(&body) {
            Ok(reply) => Ok((status, reply)),
            Err(_) => Err(Error::UnexpectedResponse { status, body }),
        }
    }

    /// Checks if the server is healthy and responsive.
    pub async fn health(&self) -> Result<(), Error> {
        let res = self
            .client
            .get(self.base_url.join("health")?)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let msg = res.text().await.ok();
            return Err(Error::ErrorStatus { status, msg });
        }

        Ok(())
    }
}
