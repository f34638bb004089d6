//! Configuration module
//!
//! Env-based configuration for the CLI and other long-lived callers. Library
//! users can also construct [`ClientConfig`] directly.

use std::env;

use anyhow::Context;

/// Everything needed to authenticate and drive one upload workflow.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Control-plane base URL, e.g. `https://ingest.example.com`.
    pub server: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl ClientConfig {
    /// Read configuration from `UPLINK_*` environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            server: env::var("UPLINK_SERVER").context("UPLINK_SERVER must be set")?,
            client_id: env::var("UPLINK_CLIENT_ID").context("UPLINK_CLIENT_ID must be set")?,
            client_secret: env::var("UPLINK_CLIENT_SECRET")
                .context("UPLINK_CLIENT_SECRET must be set")?,
            username: env::var("UPLINK_USERNAME").context("UPLINK_USERNAME must be set")?,
            password: env::var("UPLINK_PASSWORD").context("UPLINK_PASSWORD must be set")?,
        })
    }
}
