//! Proof-of-personhood verification forwarder.
//!
//! Forwards proofs to an external verifier and, when the verifier accepts one, flags the
//! matching user record as verified.
//!
//! ## Endpoints
//!
//! - `POST /api/verify` - Forward a proof to the verifier
//! - `GET /health` - Liveness check
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Configuration
//!
//! The server is configured via a TOML/YAML file, command line flags or environment variables.
//! Flags and environment variables override the file. See [`Cli`] and
//! [`proofgate_server_config::Config`] for details.
//!
//! ## Usage
//!
//! ```bash
//! proofgate --config proofgate.toml
//! WLD_APP_ID=app_staging_1234 SUPABASE_URL=https://project.supabase.co SUPABASE_ANON_KEY=key proofgate
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use proofgate_server_config::Config;
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
};
use tracing::info;

use crate::{
    app::{AppState, app},
    metrics::{init_metrics, set_build_info},
};

mod app;
mod metrics;
mod store;
mod verifier;

#[cfg(test)]
mod mock;

/// Command-line interface for the proofgate server.
#[derive(Parser, Debug)]
#[command(name = "proofgate")]
#[command(about = "Proof-of-personhood verification forwarder", long_about = None)]
pub struct Cli {
    /// Config file path.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the verifier API.
    #[arg(long, env = "WLD_API_BASE_URL")]
    pub verifier_base_url: Option<String>,

    /// Application id registered with the verifier.
    #[arg(long, env = "WLD_APP_ID")]
    pub app_id: Option<String>,

    /// Timeout of a verify round trip in milliseconds.
    #[arg(long, env = "WLD_VERIFY_TIMEOUT_MS")]
    pub verifier_timeout_ms: Option<u64>,

    /// Base URL of the user store.
    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    /// Access key of the user store.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Table holding the user records.
    #[arg(long, env = "SUPABASE_TABLE")]
    pub store_table: Option<String>,
}

impl Cli {
    /// Builds the config from the config file, if any, overridden by flags.
    ///
    /// Without a config file the app id, store URL and store key are required.
    pub fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(
                self.app_id
                    .clone()
                    .context("Missing --app-id (or WLD_APP_ID)")?,
                self.store_url
                    .clone()
                    .context("Missing --store-url (or SUPABASE_URL)")?,
                self.store_key
                    .clone()
                    .context("Missing --store-key (or SUPABASE_ANON_KEY)")?,
            ),
        };

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(base_url) = self.verifier_base_url {
            config.verifier.base_url = base_url;
        }
        if let Some(app_id) = self.app_id {
            config.verifier.app_id = app_id;
        }
        if let Some(timeout_ms) = self.verifier_timeout_ms {
            config.verifier.timeout_ms = Some(timeout_ms);
        }
        if let Some(url) = self.store_url {
            config.store.url = url;
        }
        if let Some(key) = self.store_key {
            config.store.key = key;
        }
        if let Some(table) = self.store_table {
            config.store.table = table;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_thread_names(true)
        .with_ansi(true)
        .init();

    let config = Cli::parse().into_config()?;

    let metrics = init_metrics()?;
    set_build_info(env!("CARGO_PKG_VERSION"));

    let state = AppState::new(&config, metrics)?;
    info!(endpoint = %state.verifier.endpoint(), "Forwarding proofs to verifier");
    let router = app(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("proofgate listening on {addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, starting graceful shutdown"),
        _ = sigint.recv() => info!("Received SIGINT (Ctrl-C), starting graceful shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use proofgate_server_config::Config;

    use crate::Cli;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("proofgate").chain(args.iter().copied()))
    }

    #[test]
    fn test_config_from_flags() {
        let config = cli(&[
            "--app-id",
            "app_staging_1234",
            "--store-url",
            "https://project.supabase.co",
            "--store-key",
            "anon-key",
            "--port",
            "8080",
            "--verifier-timeout-ms",
            "3000",
        ])
        .into_config()
        .unwrap();

        let mut expected =
            Config::new("app_staging_1234", "https://project.supabase.co", "anon-key");
        expected.port = 8080;
        expected.verifier.timeout_ms = Some(3000);
        assert_eq!(config, expected);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proofgate.toml");
        let file_config = Config::new("app_from_file", "https://file.supabase.co", "file-key");
        std::fs::write(&path, file_config.to_toml().unwrap()).unwrap();

        let config = cli(&[
            "--config",
            path.to_str().unwrap(),
            "--verifier-base-url",
            "https://staging-developer.worldcoin.org",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.verifier.app_id, "app_from_file");
        assert_eq!(
            config.verifier.base_url,
            "https://staging-developer.worldcoin.org"
        );
        assert_eq!(config.store, file_config.store);
    }
}
