//! Ephemeral per-item upload progress.
//!
//! Percentages live here, keyed by item id, not on the queue items, so
//! progress streaming never churns the queue collections. Values are raw
//! floats (`bytes_sent / bytes_total * 100`), neither clamped nor rounded;
//! display layers clamp for presentation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use attachkit_core::UploadItemId;

#[derive(Clone, Debug, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<HashMap<UploadItemId, f64>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UploadItemId, f64>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, id: &UploadItemId, percent: f64) {
        self.lock().insert(id.clone(), percent);
    }

    pub fn get(&self, id: &UploadItemId) -> Option<f64> {
        self.lock().get(id).copied()
    }

    /// Reset to zero, keeping the entry (a failed item shows an empty bar).
    pub fn reset(&self, id: &UploadItemId) {
        self.lock().insert(id.clone(), 0.0);
    }

    pub fn remove(&self, id: &UploadItemId) {
        self.lock().remove(id);
    }

    pub fn snapshot(&self) -> HashMap<UploadItemId, f64> {
        self.lock().clone()
    }
}
