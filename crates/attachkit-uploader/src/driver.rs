//! Sequential batch upload driver.
//!
//! Walks the pending items of one scope in insertion order, one transfer at
//! a time. Failure attribution is deterministic: the first transport error
//! stops the batch, the failing item is marked `Failed`, and everything
//! after it stays `Queued`. Cancelling an item aborts only that transfer;
//! the batch moves on. In every case the scope's queue is flushed and the
//! uploading flag cleared before the call returns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use attachkit_core::{
    FileSource, RemoteUpload, UploadConfig, UploadItemId, UploadItemPatch, UploadKey,
    UploadMetadata, UploadQueueItem, UploadStatus,
};
use attachkit_state::{Scope, SharedState};

use crate::progress::ProgressTracker;
use crate::transport::{UploadError, UploadResult, UploadTransport};

/// What a settled batch left behind: the drained queue items with the
/// statuses they held at flush time, in insertion order, plus counters.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<UploadQueueItem>,
    pub uploaded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// A failed batch still flushes; the report rides along with the cause.
#[derive(Debug, Error)]
#[error("Batch upload failed: {source}")]
pub struct BatchError {
    #[source]
    pub source: UploadError,
    pub report: BatchReport,
}

#[derive(Clone)]
pub struct UploadDriver {
    transport: Arc<dyn UploadTransport>,
    state: SharedState,
    progress: ProgressTracker,
    chunk_size: usize,
    uploading: Arc<AtomicBool>,
    cancellations: Arc<Mutex<HashMap<UploadItemId, CancellationToken>>>,
}

impl UploadDriver {
    pub fn new(transport: Arc<dyn UploadTransport>, state: SharedState, config: &UploadConfig) -> Self {
        UploadDriver {
            transport,
            state,
            progress: ProgressTracker::new(),
            chunk_size: config.chunk_size_bytes,
            uploading: Arc::new(AtomicBool::new(false)),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Whether a batch is currently running. Informational only; concurrent
    /// batch calls for one scope are not guarded here.
    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, attachkit_state::AttachmentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_cancellations(&self) -> MutexGuard<'_, HashMap<UploadItemId, CancellationToken>> {
        self.cancellations.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Abort the in-flight transfer for an item, if any. The transfer stops
    /// at the next chunk boundary.
    pub fn cancel(&self, id: &UploadItemId) {
        if let Some(token) = self.lock_cancellations().get(id) {
            token.cancel();
        }
    }

    /// Drop an item from the queue and abort its transfer if it is in
    /// flight. Returns the removed item.
    pub fn abandon(&self, scope: &Scope, id: &UploadItemId) -> Option<UploadQueueItem> {
        let removed = self.lock_state().remove_upload(scope, id);
        if removed.is_some() {
            self.cancel(id);
            self.progress.remove(id);
        }
        removed
    }

    /// Upload every pending item of the scope, sequentially, against the
    /// given upload key. See the module docs for the failure contract.
    pub async fn upload_pending(
        &self,
        scope: &Scope,
        key: &UploadKey,
    ) -> Result<BatchReport, BatchError> {
        self.uploading.store(true, Ordering::SeqCst);
        let outcome = self.run_batch(scope, key).await;

        // Epilogue, regardless of outcome: drain the queue, drop progress
        // entries for everything drained, clear the flag.
        let items = self.lock_state().flush_uploads(scope);
        for item in &items {
            self.progress.remove(&item.id);
        }
        self.uploading.store(false, Ordering::SeqCst);

        let mut report = BatchReport {
            items,
            ..Default::default()
        };
        match outcome {
            Ok(counts) => {
                report.uploaded = counts.uploaded;
                report.cancelled = counts.cancelled;
                Ok(report)
            }
            Err(source) => {
                report.uploaded = report
                    .items
                    .iter()
                    .filter(|i| i.status == UploadStatus::Uploaded)
                    .count();
                report.failed = report
                    .items
                    .iter()
                    .filter(|i| i.status == UploadStatus::Failed)
                    .count();
                Err(BatchError { source, report })
            }
        }
    }

    async fn run_batch(&self, scope: &Scope, key: &UploadKey) -> UploadResult<BatchCounts> {
        let pending = self.lock_state().pending_uploads(scope);
        debug!(count = pending.len(), "starting upload batch");

        let mut counts = BatchCounts::default();
        for item in pending {
            let token = CancellationToken::new();
            self.lock_cancellations().insert(item.id.clone(), token.clone());
            self.set_status(scope, &item.id, UploadStatus::Uploading);

            let outcome = self.upload_item(&item, key, &token).await;
            self.lock_cancellations().remove(&item.id);
            match outcome {
                Ok(remote) => {
                    debug!(id = %item.id, filename = %item.filename, token = %remote.token, "upload complete");
                    self.set_status(scope, &item.id, UploadStatus::Uploaded);
                    counts.uploaded += 1;
                }
                Err(UploadError::Cancelled) => {
                    warn!(id = %item.id, filename = %item.filename, "upload abandoned");
                    counts.cancelled += 1;
                }
                Err(err) => {
                    error!(id = %item.id, filename = %item.filename, %err, "upload failed, stopping batch");
                    self.set_status(scope, &item.id, UploadStatus::Failed);
                    self.progress.reset(&item.id);
                    return Err(err);
                }
            }
        }
        Ok(counts)
    }

    async fn upload_item(
        &self,
        item: &UploadQueueItem,
        key: &UploadKey,
        token: &CancellationToken,
    ) -> UploadResult<RemoteUpload> {
        let metadata = UploadMetadata::for_item(item);
        let total = item.size_bytes;
        let mut session = self.transport.open(key, &metadata, total).await?;

        let mut reader = ChunkReader::open(&item.source, self.chunk_size).await?;
        let mut sent: u64 = 0;
        while let Some(chunk) = reader.next_chunk().await? {
            if token.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            let len = chunk.len() as u64;
            session.send(chunk).await?;
            if token.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            sent += len;
            self.progress.set(&item.id, percent(sent, total));
        }
        if token.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        session.finish().await
    }

    fn set_status(&self, scope: &Scope, id: &UploadItemId, status: UploadStatus) {
        self.lock_state().update_upload(
            scope,
            id,
            UploadItemPatch {
                status: Some(status),
                ..Default::default()
            },
        );
    }
}

#[derive(Debug, Default)]
struct BatchCounts {
    uploaded: usize,
    cancelled: usize,
}

fn percent(sent: u64, total: u64) -> f64 {
    sent as f64 / total.max(1) as f64 * 100.0
}

/// Reads a file source as ordered chunks of at most `chunk_size` bytes.
enum ChunkReader {
    File { file: tokio::fs::File, chunk_size: usize },
    Memory { bytes: Bytes, offset: usize, chunk_size: usize },
}

impl ChunkReader {
    async fn open(source: &FileSource, chunk_size: usize) -> std::io::Result<Self> {
        match source {
            FileSource::Path(path) => Ok(ChunkReader::File {
                file: tokio::fs::File::open(path).await?,
                chunk_size,
            }),
            FileSource::Memory(bytes) => Ok(ChunkReader::Memory {
                bytes: bytes.clone(),
                offset: 0,
                chunk_size,
            }),
        }
    }

    async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        match self {
            ChunkReader::File { file, chunk_size } => {
                let mut buf = vec![0u8; *chunk_size];
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    return Ok(None);
                }
                buf.truncate(n);
                Ok(Some(Bytes::from(buf)))
            }
            ChunkReader::Memory {
                bytes,
                offset,
                chunk_size,
            } => {
                if *offset >= bytes.len() {
                    return Ok(None);
                }
                let end = (*offset + *chunk_size).min(bytes.len());
                let chunk = bytes.slice(*offset..end);
                *offset = end;
                Ok(Some(chunk))
            }
        }
    }
}
