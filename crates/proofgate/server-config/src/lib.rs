//! Server configuration and TOML/YAML parsing.
//!
//! Defines the configuration of the verifier endpoint and the user store, loaded once at
//! startup and shared read-only by every request.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;

pub use config::{Config, StoreConfig, VERIFY_PATH, VerifierConfig};
