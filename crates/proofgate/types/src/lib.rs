//! Wire types shared by the proofgate server and client.
//!
//! [`VerifyRequest`] is the six-field proof payload. The server receives it from the caller and
//! sends the same shape to the verifier. [`VerifyReply`] is the `{code, detail}` body every
//! proofgate response carries. [`VerifierResponse`] is the lenient view of whatever the verifier
//! answers with.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Code of the reply sent when the verifier accepted the proof.
pub const SUCCESS_CODE: &str = "success";
/// Detail of the reply sent when the verifier accepted the proof.
pub const SUCCESS_DETAIL: &str = "This action verified correctly!";
/// Code of the reply sent when the verifier could not be reached.
pub const ERROR_CODE: &str = "error";
/// Detail of the reply sent when the verifier could not be reached.
pub const ERROR_DETAIL: &str = "Internal server error";
/// Code of the reply sent when the inbound body could not be decoded.
pub const INVALID_REQUEST_CODE: &str = "invalid_request";

/// Proof-of-personhood payload, used both as the inbound `/verify` body and as the body
/// forwarded to the verifier.
///
/// Fields are kept as raw JSON values and copied verbatim. A field the caller omitted (or sent
/// as `null`) is omitted from the serialized payload. Unknown fields are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Per app and action identifier of the verified human.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifier_hash: Option<Value>,
    /// Root of the identity set the proof was generated against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<Value>,
    /// Zero-knowledge proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
    /// Credential level, e.g. `orb` or `device`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_level: Option<Value>,
    /// Action being verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    /// Application supplied value bound into the proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<Value>,
}

impl VerifyRequest {
    /// Creates a request with every field set to the given string.
    pub fn new(
        nullifier_hash: impl Into<String>,
        merkle_root: impl Into<String>,
        proof: impl Into<String>,
        verification_level: VerificationLevel,
        action: impl Into<String>,
        signal: impl Into<String>,
    ) -> Self {
        Self {
            nullifier_hash: Some(Value::String(nullifier_hash.into())),
            merkle_root: Some(Value::String(merkle_root.into())),
            proof: Some(Value::String(proof.into())),
            verification_level: Some(Value::String(verification_level.to_string())),
            action: Some(Value::String(action.into())),
            signal: Some(Value::String(signal.into())),
        }
    }

    /// Reads the six forwarded fields out of an inbound body.
    ///
    /// Returns `None` unless the body is a JSON object. Other keys are dropped and `null` values
    /// count as absent.
    pub fn from_json(body: &Value) -> Option<Self> {
        let map = body.as_object()?;
        let field = |name: &str| map.get(name).filter(|v| !v.is_null()).cloned();
        Some(Self {
            nullifier_hash: field("nullifier_hash"),
            merkle_root: field("merkle_root"),
            proof: field("proof"),
            verification_level: field("verification_level"),
            action: field("action"),
            signal: field("signal"),
        })
    }
}

/// Credential level of a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationLevel {
    /// Credential issued after a biometric check.
    Orb,
    /// Credential bound to a single device.
    Device,
}

/// Body of every `/verify` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReply {
    /// Short machine readable outcome.
    pub code: String,
    /// Human readable message.
    pub detail: String,
}

impl VerifyReply {
    /// Creates a reply from any code and detail.
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }

    /// Static reply for an accepted proof.
    pub fn success() -> Self {
        Self::new(SUCCESS_CODE, SUCCESS_DETAIL)
    }

    /// Static reply for a failed round trip to the verifier.
    pub fn internal_error() -> Self {
        Self::new(ERROR_CODE, ERROR_DETAIL)
    }

    /// Reply for an inbound body that could not be decoded.
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST_CODE, detail)
    }

    /// Returns `true` if this is the success reply.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Response body of the verifier.
///
/// On success only `nullifier_hash` is read; on failure `code` and `detail` are relayed.
/// Every field is optional and unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerifierResponse {
    /// Nullifier hash of the verified human.
    pub nullifier_hash: Option<String>,
    /// Error code.
    pub code: Option<String>,
    /// Error message.
    pub detail: Option<String>,
}

impl VerifierResponse {
    /// Reads the known fields out of a verifier body.
    ///
    /// Returns `None` unless the body is a JSON object. A string field is taken as is, any other
    /// non-null value as its JSON text.
    pub fn from_json(body: &Value) -> Option<Self> {
        let map = body.as_object()?;
        let field = |name: &str| match map.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Some(Self {
            nullifier_hash: field("nullifier_hash"),
            code: field("code"),
            detail: field("detail"),
        })
    }

    /// Converts a verifier failure into the reply relayed to the caller.
    pub fn into_relayed_reply(self) -> VerifyReply {
        VerifyReply {
            code: self.code.unwrap_or_default(),
            detail: self.detail.unwrap_or_default(),
        }
    }
}
