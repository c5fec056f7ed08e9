use reqwest::StatusCode;
use thiserror::Error;

/// Error type for proofgate client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Base URL could not be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// Server answered with a body that is not a reply.
    #[error("Unexpected response with status {status}: {body}")]
    UnexpectedResponse {
        /// Status of the response.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },
    /// Server returned an error status.
    #[error("Request failed with status {status} and msg {}", msg.as_deref().unwrap_or("Unknown"))]
    ErrorStatus {
        /// Status of the response.
        status: StatusCode,
        /// Response body, if available.
        msg: Option<String>,
    },
}
