//! User store holding the `verified` flag of each user record.
//!
//! The only write is flagging the record with a given nullifier hash as verified. Zero matched
//! records is not an error.

use anyhow::Context;
use proofgate_server_config::StoreConfig;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use thiserror::Error;

/// Failure of a store update.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    /// Connection or timeout failure.
    #[error("Request to user store failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The store rejected the update.
    #[error("User store rejected update with status {status}: {}", msg.as_deref().unwrap_or("Unknown"))]
    Status {
        /// Status returned by the store.
        status: StatusCode,
        /// Response body, if readable.
        msg: Option<String>,
    },
}

/// User store backend.
#[derive(Clone, Debug)]
pub(crate) enum UserStore {
    /// Supabase table accessed through its PostgREST API.
    Supabase(SupabaseStore),
    /// In-memory store
    #[cfg(test)]
    Mock(crate::mock::MockUserStore),
}

impl UserStore {
    /// Creates the store described by the configuration.
    pub(crate) fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        Ok(Self::Supabase(SupabaseStore::new(config, Client::new())?))
    }

    /// Sets `verified = true` on the user record whose `nullifier_hash` matches.
    pub(crate) async fn mark_verified(&self, nullifier_hash: &str) -> Result<(), StoreError> {
        match self {
            Self::Supabase(store) => store.mark_verified(nullifier_hash).await,
            #[cfg(test)]
            Self::Mock(store) => store.mark_verified(nullifier_hash),
        }
    }
}

/// Supabase user table.
///
/// `mark_verified` is the REST form of
/// `UPDATE <table> SET verified = true WHERE nullifier_hash = :hash`.
#[derive(Clone, Debug)]
pub(crate) struct SupabaseStore {
    client: Client,
    table_url: Url,
    key: String,
}

impl SupabaseStore {
    /// Creates a store for `<url>/rest/v1/<table>`.
    pub(crate) fn new(config: &StoreConfig, client: Client) -> anyhow::Result<Self> {
        let table_url = format!("{}/rest/v1/{}", config.url.trim_end_matches('/'), config.table);
        let table_url = Url::parse(&table_url)
            .with_context(|| format!("Invalid user store URL: {table_url}"))?;
        Ok(Self {
            client,
            table_url,
            key: config.key.clone(),
        })
    }

    async fn mark_verified(&self, nullifier_hash: &str) -> Result<(), StoreError> {
        let res = self
            .client
            .patch(self.table_url.clone())
            .query(&[("nullifier_hash", format!("eq.{nullifier_hash}"))])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(&json!({ "verified": true }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let msg = res.text().await.ok();
            return Err(StoreError::Status { status, msg });
        }

        Ok(())
    }
}
