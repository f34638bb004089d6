use thiserror::Error;

/// Control-plane call errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A session operation was attempted before a successful `authenticate`.
    /// Raised before any network I/O; always a caller-ordering bug.
    #[error("Not authenticated: call authenticate() first")]
    Unauthorized,

    /// The control plane answered with a status other than the one the
    /// operation expects. The raw response body is preserved for diagnostics;
    /// nothing is retried at this layer.
    #[error("Control plane returned {status}: {body}")]
    ServiceCallFailed { status: u16, body: String },

    /// Transport-level failure (connection, timeout, body decode).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
