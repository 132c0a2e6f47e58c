//! Upload transport abstraction
//!
//! The resumable upload endpoint is an external collaborator; this module
//! defines the session contract the driver streams through. Implementations
//! own protocol details (chunk framing, retries at the wire level, auth).

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use attachkit_core::{RemoteUpload, UploadKey, UploadMetadata};

/// Upload operation errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to open upload session: {0}")]
    SessionOpen(String),

    #[error("Chunk transfer failed: {0}")]
    Transfer(String),

    #[error("Upload finalization failed: {0}")]
    Finalize(String),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// One in-flight resumable transfer.
///
/// Chunks arrive in order via [`send`](Self::send); [`finish`](Self::finish)
/// closes the session and yields the remote handle for the stored file.
#[async_trait]
pub trait UploadSession: Send {
    async fn send(&mut self, chunk: Bytes) -> UploadResult<()>;

    async fn finish(&mut self) -> UploadResult<RemoteUpload>;
}

/// Opens resumable sessions against the remote upload endpoint.
///
/// The `key` is the opaque authorization obtained from the owning entity's
/// API ahead of the batch; `metadata` carries the string-valued fields the
/// protocol accepts alongside the bytes.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn open(
        &self,
        key: &UploadKey,
        metadata: &UploadMetadata,
        total_bytes: u64,
    ) -> UploadResult<Box<dyn UploadSession>>;
}
