//! Data-plane transfer for upload sessions.
//!
//! The control plane hands out an opaque upload-target locator; this crate
//! decodes it into transfer coordinates ([`TransferTarget`]), drives the
//! object-storage collaborator behind the [`ObjectSink`] seam, and escalates
//! a simple whole-file upload into a resumable multipart transfer when the
//! collaborator signals the payload needs one ([`ResumableUploader`]).

pub mod s3;
pub mod target;
pub mod traits;
pub mod uploader;

pub use s3::S3Sink;
pub use target::TransferTarget;
pub use traits::{
    ByteSource, CompletedPartRecord, MultipartProgress, ObjectSink, TransferError, TransferResult,
    UploadOutcome,
};
pub use uploader::ResumableUploader;
