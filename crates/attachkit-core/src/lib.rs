//! Attachkit Core Library
//!
//! This crate provides the domain models, client-side id generation, error
//! types, configuration, and file validation shared across all attachkit
//! components.

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::UploadConfig;
pub use error::{AppError, AppResult};
pub use ids::{UploadIdGenerator, UploadItemId};
pub use models::{
    preview_uri, AttachmentRecord, FileMetadata, FileSource, RemoteUpload, SignedUrl, StageUpload,
    TargetId, UploadItemPatch, UploadKey, UploadMetadata, UploadQueueItem, UploadStatus,
};
pub use validation::{sanitize_filename, FileValidator};
