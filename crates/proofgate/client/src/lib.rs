//! HTTP client for proofgate servers.
//!
//! ## Example
//!
//! ```no_run
//! use proofgate_client::{Error, ProofgateClient};
//! use proofgate_client::types::{VerificationLevel, VerifyRequest};
//!
//! # async fn example() -> Result<(), Error> {
//! let client = ProofgateClient::new("http://localhost:3000")?;
//!
//! let request = VerifyRequest::new(
//!     "0x2bf8406809dcefb1a3a6d3b0e5ee2ae1e6c9f36b0e1b5e1c0e8a5d4e3e2b1a09",
//!     "0x2264a66d162d7893e12ea8e3c072c51e785bc085ad655f64c10c1a61e00f0bc2",
//!     "0x1aa8b8f3b2d2de5ff452c0e1a83e29d6bf46fb83ef35dc5957121ff3d3698a11",
//!     VerificationLevel::Orb,
//!     "vote",
//!     "user-1",
//! );
//! let (status, reply) = client.verify(&request).await?;
//! println!("{status}: {} ({})", reply.code, reply.detail);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub use client::ProofgateClient;
pub use error::Error;
pub use proofgate_types as types;
pub use reqwest::StatusCode;

mod client;
mod error;
