//! Domain models shared across the attachkit crates.

pub mod attachment;
pub mod upload;

pub use attachment::{AttachmentRecord, FileMetadata, SignedUrl, TargetId};
pub use upload::{
    preview_uri, FileSource, RemoteUpload, StageUpload, UploadItemPatch, UploadKey, UploadMetadata,
    UploadQueueItem, UploadStatus,
};
