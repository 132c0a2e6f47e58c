//! Per-target facade over the shared attachment state.
//!
//! UI code works against one [`TargetAttachments`] handle per form. The
//! handle resolves its scope exactly once, at construction: a known target
//! id routes to the keyed collections, an absent one to the draft buffers.
//! A single handle never mixes the two.

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use attachkit_core::{
    AppResult, AttachmentRecord, StageUpload, TargetId, UploadConfig, UploadItemId,
    UploadItemPatch, UploadQueueItem,
};

use crate::scope::Scope;
use crate::state::AttachmentState;

pub type SharedState = Arc<Mutex<AttachmentState>>;

/// Build a fresh shared state container.
pub fn shared_state(config: &UploadConfig) -> SharedState {
    Arc::new(Mutex::new(AttachmentState::new(config)))
}

#[derive(Clone)]
pub struct TargetAttachments {
    state: SharedState,
    scope: Scope,
}

impl TargetAttachments {
    pub fn new(state: SharedState, target: Option<TargetId>) -> Self {
        TargetAttachments {
            state,
            scope: Scope::from_target(target),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, AttachmentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ---- existing attachments -------------------------------------------

    pub fn set_existing(&self, records: Vec<AttachmentRecord>) {
        self.lock().set_existing(&self.scope, records);
    }

    pub fn add_existing(&self, record: AttachmentRecord) {
        self.lock().add_existing(&self.scope, record);
    }

    pub fn upsert_existing(&self, record: AttachmentRecord) {
        self.lock().upsert_existing(&self.scope, record);
    }

    pub fn existing(&self) -> Vec<AttachmentRecord> {
        self.lock().existing(&self.scope).to_vec()
    }

    // ---- staged removals ------------------------------------------------

    pub fn stage_removal(&self, attachment_id: Uuid) {
        self.lock().stage_removal(&self.scope, attachment_id);
    }

    pub fn restore_removal(&self, attachment_id: Uuid) {
        self.lock().restore_removal(&self.scope, attachment_id);
    }

    pub fn commit_removals(&self) {
        self.lock().commit_removals(&self.scope);
    }

    pub fn pending_removals(&self) -> Vec<AttachmentRecord> {
        self.lock().pending_removals(&self.scope).to_vec()
    }

    // ---- upload queue ---------------------------------------------------

    pub fn enqueue_upload(&self, stage: StageUpload) -> AppResult<UploadItemId> {
        self.lock().enqueue_upload(&self.scope, stage)
    }

    pub fn update_upload(&self, id: &UploadItemId, patch: UploadItemPatch) {
        self.lock().update_upload(&self.scope, id, patch);
    }

    pub fn remove_upload(&self, id: &UploadItemId) -> Option<UploadQueueItem> {
        self.lock().remove_upload(&self.scope, id)
    }

    pub fn clear_failed(&self) {
        self.lock().clear_failed(&self.scope);
    }

    pub fn retry_failed(&self) {
        self.lock().retry_failed(&self.scope);
    }

    pub fn uploads(&self) -> Vec<UploadQueueItem> {
        self.lock().uploads(&self.scope).to_vec()
    }

    pub fn pending_uploads(&self) -> Vec<UploadQueueItem> {
        self.lock().pending_uploads(&self.scope)
    }

    pub fn failed_uploads(&self) -> Vec<UploadQueueItem> {
        self.lock().failed_uploads(&self.scope)
    }

    // ---- library selections ---------------------------------------------

    pub fn select_from_library(&self, record: AttachmentRecord) {
        self.lock().select_from_library(&self.scope, record);
    }

    pub fn deselect_from_library(&self, attachment_id: Uuid) {
        self.lock().deselect_from_library(&self.scope, attachment_id);
    }

    pub fn selected(&self) -> Vec<AttachmentRecord> {
        self.lock().selected(&self.scope).to_vec()
    }

    // ---- draft promotion ------------------------------------------------

    /// Hand every draft-buffered upload to a target that just acquired an
    /// id. Only meaningful on a draft-scoped handle; a targeted handle owns
    /// no draft content and this is a no-op there.
    pub fn promote_uploads(&self, target: &TargetId) {
        if !self.scope.is_draft() {
            return;
        }
        self.lock().promote_uploads(target);
    }

    /// Same transition for draft library selections.
    pub fn promote_selections(&self, target: &TargetId) {
        if !self.scope.is_draft() {
            return;
        }
        self.lock().promote_selections(target);
    }
}
