//! Object-storage collaborator seam.
//!
//! The uploader does not implement chunking, checksums, or wire retries
//! itself; those belong to the [`ObjectSink`] implementation. The trait only
//! fixes the escalation contract: a simple upload either completes or hands
//! back the multipart state needed to resume without re-sending durable
//! parts.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncSeek};

use crate::target::TransferTarget;

/// Data-plane errors.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Upload-target locator with fewer than three usable segments.
    #[error("Malformed upload target: {0}")]
    MalformedTarget(String),

    /// Local file path without a usable file name.
    #[error("Invalid local file path: {0}")]
    InvalidPath(String),

    /// Unrecoverable storage-side failure; aborts the current file only.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The configured attempt cap was reached before the transfer completed.
    #[error("Upload incomplete after {0} attempts")]
    AttemptsExhausted(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for data-plane operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Seekable byte source for a transfer. The uploader rewinds it between
/// attempts so the sink always observes the stream from offset 0 (or seeks
/// forward itself past parts already stored).
pub trait ByteSource: AsyncRead + AsyncSeek + Send + Unpin {}
impl<T: AsyncRead + AsyncSeek + Send + Unpin + ?Sized> ByteSource for T {}

/// One part durably stored on the storage side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPartRecord {
    pub part_number: i32,
    pub etag: String,
}

/// Partial-transfer state captured when an attempt does not complete.
///
/// Owned exclusively by the in-progress `upload_file` call and discarded at
/// its completion; never persisted across calls or processes. Completed
/// parts are a contiguous run of full-size parts starting at part 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartProgress {
    /// Multipart-session token assigned by the storage side.
    pub upload_id: String,
    pub completed: Vec<CompletedPartRecord>,
}

/// Outcome of one transfer attempt.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The object is durably stored.
    Complete,
    /// Recoverable signal: the payload needs (or still needs) a multipart
    /// transfer. Handled entirely inside the uploader, never surfaced to
    /// callers.
    Incomplete(MultipartProgress),
}

/// External object-storage collaborator.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Stream the whole source to `{endpoint, bucket, key}` in one request,
    /// or signal that a multipart transfer is required.
    async fn simple_upload(
        &self,
        target: &TransferTarget,
        key: &str,
        source: &mut (dyn ByteSource),
    ) -> TransferResult<UploadOutcome>;

    /// Resume a multipart transfer using previously captured state so parts
    /// already durably stored are not re-sent.
    async fn resume_multipart(
        &self,
        target: &TransferTarget,
        key: &str,
        source: &mut (dyn ByteSource),
        progress: MultipartProgress,
    ) -> TransferResult<UploadOutcome>;
}
