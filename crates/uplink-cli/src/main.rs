//! Uplink CLI — drives the upload-session workflow end to end.
//!
//! Set UPLINK_SERVER, UPLINK_CLIENT_ID, UPLINK_CLIENT_SECRET, UPLINK_USERNAME
//! and UPLINK_PASSWORD (dotenv supported).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uplink_cli::{init_tracing, print_json};
use uplink_client::ApiClient;
use uplink_core::ClientConfig;
use uplink_transfer::{ResumableUploader, S3Sink};

#[derive(Parser)]
#[command(name = "uplink", about = "Upload-session client for remote media ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a session, upload files into it, and finalize it
    Upload {
        /// Destination folder identifier
        #[arg(long)]
        folder: String,
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Cap on transfer attempts per file (unbounded when omitted)
        #[arg(long)]
        max_attempts: Option<usize>,
    },
    /// Delete a session by its correlation identifier (SessionId)
    Delete {
        session_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Failed to read UPLINK_* configuration")?;
    let client = ApiClient::connect(&config).await?;

    match cli.command {
        Commands::Upload {
            folder,
            files,
            max_attempts,
        } => {
            let mut session = client.new_session(&folder).await?;

            let mut uploader = ResumableUploader::new(Arc::new(S3Sink::new()));
            if let Some(max) = max_attempts {
                uploader = uploader.with_max_attempts(max);
            }

            for file in &files {
                uploader
                    .upload_file(&session, file)
                    .await
                    .with_context(|| format!("Failed to upload {}", file.display()))?;
            }

            session = client.finish_session(&session).await?;
            let (refreshed, _) = client.session_status(&session).await?;
            session = refreshed;
            print_json(&session)?;
        }
        Commands::Delete { session_id } => {
            client.delete_session(&session_id).await?;
            println!("Deleted session {}", session_id);
        }
    }

    Ok(())
}
