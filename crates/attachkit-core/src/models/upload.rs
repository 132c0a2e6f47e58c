//! Upload queue models.
//!
//! A queue item moves through a strict forward machine:
//! `Queued → Uploading → {Uploaded | Failed}`. A failed item re-enters
//! `Queued` only through an explicit retry.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::UploadItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Queued,
    Uploading,
    Uploaded,
    Failed,
}

impl UploadStatus {
    /// Pending items are the ones a batch upload will pick up.
    pub fn is_pending(self) -> bool {
        matches!(self, UploadStatus::Queued | UploadStatus::Uploading)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Uploaded | UploadStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Queued => "queued",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Failed => "failed",
        }
    }
}

/// Binary content staged for upload.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}

impl FileSource {
    /// Size in bytes. Stats the file for path-backed sources.
    pub fn byte_len(&self) -> std::io::Result<u64> {
        match self {
            FileSource::Path(path) => Ok(std::fs::metadata(path)?.len()),
            FileSource::Memory(bytes) => Ok(bytes.len() as u64),
        }
    }
}

/// Parameters accepted when staging a file for upload.
#[derive(Debug, Clone, Validate)]
pub struct StageUpload {
    pub source: FileSource,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub filename: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
    pub is_global: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A file staged for upload against a scope.
#[derive(Debug, Clone)]
pub struct UploadQueueItem {
    pub id: UploadItemId,
    pub source: FileSource,
    pub is_global: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub filename: String,
    pub size_bytes: u64,
    pub preview_uri: String,
    pub status: UploadStatus,
}

/// Shallow patch applied to a queue item in place.
///
/// Progress bookkeeping is deliberately absent: percentages live in the
/// uploader's ephemeral tracker, keyed by item id, not in the item.
#[derive(Debug, Clone, Default)]
pub struct UploadItemPatch {
    pub status: Option<UploadStatus>,
    pub filename: Option<String>,
    pub is_global: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl UploadQueueItem {
    pub fn apply(&mut self, patch: UploadItemPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(filename) = patch.filename {
            self.filename = filename;
        }
        if let Some(is_global) = patch.is_global {
            self.is_global = is_global;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
    }
}

/// Local preview handle for a staged item, released together with the item.
pub fn preview_uri(id: &UploadItemId) -> String {
    format!("attachkit://preview/{id}")
}

/// Opaque key authorizing a resumable upload batch. Issued by the owning
/// entity's API ahead of the batch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadKey(pub String);

impl UploadKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// String-valued metadata the resumable protocol accepts alongside the
/// bytes. `is_global` travels as `"1"`/`"0"`, dates as ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub filename: String,
    pub is_global: String,
    pub expires_at: Option<String>,
}

impl UploadMetadata {
    pub fn for_item(item: &UploadQueueItem) -> Self {
        UploadMetadata {
            filename: item.filename.clone(),
            is_global: if item.is_global { "1" } else { "0" }.to_string(),
            expires_at: item
                .expires_at
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Handle returned by the remote endpoint once a transfer finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUpload {
    pub token: String,
}
