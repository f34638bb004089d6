//! Uplink Core Library
//!
//! This crate provides the domain model and configuration shared across all
//! Uplink components: the upload-session entity returned by the control plane
//! and the env-based client configuration.

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::UploadSession;
