//! Server configuration and TOML/YAML parsing.

use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

/// Path segment between the verifier base URL and the application id.
pub const VERIFY_PATH: &str = "/api/v1/verify/";

/// Server configuration loaded from a TOML/YAML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// External proof verifier.
    pub verifier: VerifierConfig,
    /// Store holding the user records flagged as verified.
    pub store: StoreConfig,
}

/// Configuration of the external proof verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Base URL of the verifier API.
    #[serde(default = "default_verifier_base_url")]
    pub base_url: String,
    /// Application id registered with the verifier.
    pub app_id: String,
    /// Timeout of a verify round trip in milliseconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Configuration of the user store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store's REST API.
    pub url: String,
    /// Access key sent with every store request.
    pub key: String,
    /// Table holding the user records.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_port() -> u16 {
    3000
}

fn default_verifier_base_url() -> String {
    "https://developer.worldcoin.org".to_string()
}

fn default_table() -> String {
    "users".to_string()
}

impl Config {
    /// Creates a config from the required values, using defaults for the rest.
    pub fn new(
        app_id: impl Into<String>,
        store_url: impl Into<String>,
        store_key: impl Into<String>,
    ) -> Self {
        Self {
            port: default_port(),
            verifier: VerifierConfig {
                base_url: default_verifier_base_url(),
                app_id: app_id.into(),
                timeout_ms: None,
            },
            store: StoreConfig {
                url: store_url.into(),
                key: store_key.into(),
                table: default_table(),
            },
        }
    }

    /// Load config from file (auto-detects format from extension).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {path:?}"))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_str(&string),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&string),
            Some(ext) => anyhow::bail!("Unsupported config format: .{ext}"),
            None => anyhow::bail!("Config file must have an extension (e.g., .toml)"),
        }
    }

    /// Parse config from TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml_edit::de::from_str(s)
            .with_context(|| format!("Failed to deserialize TOML config:\n{s}"))
    }

    /// Converts to TOML string.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml_edit::ser::to_document(&self)?.to_string())
    }

    /// Parse config from YAML string.
    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(s).with_context(|| format!("Failed to deserialize YAML config:\n{s}"))
    }
}

impl VerifierConfig {
    /// Returns the verify endpoint, `<base_url>/api/v1/verify/<app_id>`.
    ///
    /// The parts are concatenated as is, so a trailing slash on `base_url` is kept.
    pub fn verify_endpoint(&self) -> anyhow::Result<Url> {
        let endpoint = format!("{}{VERIFY_PATH}{}", self.base_url, self.app_id);
        Url::parse(&endpoint).with_context(|| format!("Invalid verify endpoint: {endpoint}"))
    }

    /// Returns the configured round trip timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
