use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use proofgate_types::{VerifyReply, VerifyRequest};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{
    app::AppState,
    metrics::{VerifyOutcome, record_store_update, record_verify},
};

/// HTTP handler for the `/api/verify` endpoint.
///
/// Forwards the proof to the verifier. If the verifier answers 200 the user record with the
/// returned nullifier hash is flagged as verified and a static success reply is sent. Any other
/// verifier answer is relayed with its status, and a failed round trip becomes a generic 500.
///
/// The store update is awaited before replying, but its failure is only logged.
#[instrument(skip_all)]
pub(crate) async fn verify_proof(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<VerifyReply>) {
    let start = Instant::now();

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected undecodable verify request");
            record_verify(VerifyOutcome::InvalidRequest, start.elapsed());
            return (
                rejection.status(),
                Json(VerifyReply::invalid_request(rejection.body_text())),
            );
        }
    };
    info!(request = %body, "Received request to verify credential");

    let Some(payload) = VerifyRequest::from_json(&body) else {
        warn!("Rejected verify request that is not a JSON object");
        record_verify(VerifyOutcome::InvalidRequest, start.elapsed());
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(VerifyReply::invalid_request("Expected a JSON object")),
        );
    };
    info!(
        endpoint = %state.verifier.endpoint(),
        payload = ?payload,
        "Sending request to verifier"
    );

    let res = match state.verifier.verify(&payload).await {
        Ok(res) => res,
        Err(error) => {
            error!(%error, "Error during verifier round trip");
            record_verify(VerifyOutcome::Error, start.elapsed());
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyReply::internal_error()),
            );
        }
    };
    info!(status = %res.status, body = %res.raw, "Received response from verifier");

    if res.status != StatusCode::OK {
        record_verify(VerifyOutcome::Rejected, start.elapsed());
        return (res.status, Json(res.body.into_relayed_reply()));
    }

    match res.body.nullifier_hash.as_deref() {
        Some(nullifier_hash) => {
            info!(nullifier_hash, "Credential verified");
            let result = state.store.mark_verified(nullifier_hash).await;
            record_store_update(result.is_ok());
            if let Err(error) = result {
                error!(nullifier_hash, %error, "Error updating user store");
            }
        }
        None => warn!("Verifier accepted the proof without a nullifier hash, store not updated"),
    }

    record_verify(VerifyOutcome::Verified, start.elapsed());
    (StatusCode::OK, Json(VerifyReply::success()))
}
