//! Shared helpers for the uplink CLI binary.

use anyhow::Context;
use serde::Serialize;

/// Initialize tracing for CLI binaries.
/// Respects RUST_LOG; defaults to "info".
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Pretty-print an API response to stdout.
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}
