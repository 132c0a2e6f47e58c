//! The attachment state container.
//!
//! One instance per client context, dependency-injected (never a process
//! global) so tests can run isolated instances side by side.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use attachkit_core::{
    preview_uri, AppError, AppResult, AttachmentRecord, FileValidator, StageUpload, TargetId,
    UploadConfig, UploadIdGenerator, UploadItemId, UploadItemPatch, UploadQueueItem, UploadStatus,
};

use crate::scope::Scope;

#[derive(Debug, Default)]
struct DraftBuffers {
    existing: Vec<AttachmentRecord>,
    pending_delete: Vec<AttachmentRecord>,
    upload_queue: Vec<UploadQueueItem>,
    library_selection: Vec<AttachmentRecord>,
}

/// Per-target attachment collections plus the draft buffers.
///
/// Lookup misses are silent no-ops throughout: staging a removal for an id
/// that is not present leaves every collection untouched. Callers that care
/// can observe the `debug` events these paths emit.
#[derive(Debug)]
pub struct AttachmentState {
    existing: HashMap<TargetId, Vec<AttachmentRecord>>,
    pending_delete: HashMap<TargetId, Vec<AttachmentRecord>>,
    upload_queue: HashMap<TargetId, Vec<UploadQueueItem>>,
    library_selection: HashMap<TargetId, Vec<AttachmentRecord>>,
    draft: DraftBuffers,
    ids: UploadIdGenerator,
    validator: FileValidator,
}

impl AttachmentState {
    pub fn new(config: &UploadConfig) -> Self {
        AttachmentState {
            existing: HashMap::new(),
            pending_delete: HashMap::new(),
            upload_queue: HashMap::new(),
            library_selection: HashMap::new(),
            draft: DraftBuffers::default(),
            ids: UploadIdGenerator::new(),
            validator: FileValidator::from_config(config),
        }
    }

    fn existing_mut(&mut self, scope: &Scope) -> &mut Vec<AttachmentRecord> {
        match scope {
            Scope::Target(target) => self.existing.entry(target.clone()).or_default(),
            Scope::Draft => &mut self.draft.existing,
        }
    }

    fn pending_delete_mut(&mut self, scope: &Scope) -> &mut Vec<AttachmentRecord> {
        match scope {
            Scope::Target(target) => self.pending_delete.entry(target.clone()).or_default(),
            Scope::Draft => &mut self.draft.pending_delete,
        }
    }

    fn upload_queue_mut(&mut self, scope: &Scope) -> &mut Vec<UploadQueueItem> {
        match scope {
            Scope::Target(target) => self.upload_queue.entry(target.clone()).or_default(),
            Scope::Draft => &mut self.draft.upload_queue,
        }
    }

    fn library_selection_mut(&mut self, scope: &Scope) -> &mut Vec<AttachmentRecord> {
        match scope {
            Scope::Target(target) => self.library_selection.entry(target.clone()).or_default(),
            Scope::Draft => &mut self.draft.library_selection,
        }
    }

    // ---- existing attachments -------------------------------------------

    /// Wholesale replace after a fresh list-fetch. The caller guarantees the
    /// records belong to this scope.
    pub fn set_existing(&mut self, scope: &Scope, records: Vec<AttachmentRecord>) {
        *self.existing_mut(scope) = records;
    }

    /// Append without de-duplication; calling twice with the same record
    /// duplicates it.
    pub fn add_existing(&mut self, scope: &Scope, record: AttachmentRecord) {
        self.existing_mut(scope).push(record);
    }

    /// Replace-by-id if present, else append.
    pub fn upsert_existing(&mut self, scope: &Scope, record: AttachmentRecord) {
        let records = self.existing_mut(scope);
        match records.iter().position(|r| r.id == record.id) {
            Some(index) => records[index] = record,
            None => records.push(record),
        }
    }

    pub fn existing(&self, scope: &Scope) -> &[AttachmentRecord] {
        match scope {
            Scope::Target(target) => self
                .existing
                .get(target)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            Scope::Draft => &self.draft.existing,
        }
    }

    // ---- staged removals ------------------------------------------------

    /// Atomically move a record from the existing set to the pending-delete
    /// set. Nothing is deleted remotely; this is staging only.
    pub fn stage_removal(&mut self, scope: &Scope, attachment_id: Uuid) {
        let existing = self.existing_mut(scope);
        let Some(index) = existing.iter().position(|r| r.id == attachment_id) else {
            debug!(%attachment_id, "stage_removal: id not in existing set");
            return;
        };
        let record = existing.remove(index);
        self.pending_delete_mut(scope).push(record);
    }

    /// Inverse of [`stage_removal`](Self::stage_removal).
    pub fn restore_removal(&mut self, scope: &Scope, attachment_id: Uuid) {
        let pending = self.pending_delete_mut(scope);
        let Some(index) = pending.iter().position(|r| r.id == attachment_id) else {
            debug!(%attachment_id, "restore_removal: id not staged for deletion");
            return;
        };
        let record = pending.remove(index);
        self.existing_mut(scope).push(record);
    }

    /// Finalize staged removals after the owning entity's save succeeded and
    /// the caller has issued the remote deletions. Drops any pending ids
    /// still present in the existing set, then clears the staging area.
    pub fn commit_removals(&mut self, scope: &Scope) {
        let removed: HashSet<Uuid> = self
            .pending_delete_mut(scope)
            .drain(..)
            .map(|r| r.id)
            .collect();
        if removed.is_empty() {
            return;
        }
        self.existing_mut(scope).retain(|r| !removed.contains(&r.id));
    }

    pub fn pending_removals(&self, scope: &Scope) -> &[AttachmentRecord] {
        match scope {
            Scope::Target(target) => self
                .pending_delete
                .get(target)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            Scope::Draft => &self.draft.pending_delete,
        }
    }

    // ---- upload queue ---------------------------------------------------

    /// Validate and stage a file for upload. Returns the client-scoped id
    /// synchronously; no transfer starts here.
    pub fn enqueue_upload(&mut self, scope: &Scope, stage: StageUpload) -> AppResult<UploadItemId> {
        stage
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let size_bytes = stage.source.byte_len()?;
        self.validator
            .validate(&stage.filename, &stage.content_type, size_bytes)?;

        let id = self.ids.next_id();
        let item = UploadQueueItem {
            preview_uri: preview_uri(&id),
            id: id.clone(),
            source: stage.source,
            is_global: stage.is_global,
            expires_at: stage.expires_at,
            filename: attachkit_core::sanitize_filename(&stage.filename),
            size_bytes,
            status: UploadStatus::Queued,
        };
        self.upload_queue_mut(scope).push(item);
        Ok(id)
    }

    /// Shallow-merge a patch into a queued item.
    pub fn update_upload(&mut self, scope: &Scope, id: &UploadItemId, patch: UploadItemPatch) {
        let queue = self.upload_queue_mut(scope);
        let Some(item) = queue.iter_mut().find(|i| &i.id == id) else {
            debug!(%id, "update_upload: id not in queue");
            return;
        };
        item.apply(patch);
    }

    /// Drop an item regardless of status, returning it so the caller can
    /// cancel an in-flight transfer.
    pub fn remove_upload(&mut self, scope: &Scope, id: &UploadItemId) -> Option<UploadQueueItem> {
        let queue = self.upload_queue_mut(scope);
        let index = queue.iter().position(|i| &i.id == id)?;
        Some(queue.remove(index))
    }

    pub fn clear_failed(&mut self, scope: &Scope) {
        self.upload_queue_mut(scope)
            .retain(|i| i.status != UploadStatus::Failed);
    }

    /// Re-queue every failed item.
    pub fn retry_failed(&mut self, scope: &Scope) {
        for item in self.upload_queue_mut(scope) {
            if item.status == UploadStatus::Failed {
                item.status = UploadStatus::Queued;
            }
        }
    }

    /// Clear the whole queue for a scope, returning the drained items.
    pub fn flush_uploads(&mut self, scope: &Scope) -> Vec<UploadQueueItem> {
        self.upload_queue_mut(scope).drain(..).collect()
    }

    pub fn uploads(&self, scope: &Scope) -> &[UploadQueueItem] {
        match scope {
            Scope::Target(target) => self
                .upload_queue
                .get(target)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            Scope::Draft => &self.draft.upload_queue,
        }
    }

    /// Queued and uploading items, in insertion order. This is the slice a
    /// batch upload walks.
    pub fn pending_uploads(&self, scope: &Scope) -> Vec<UploadQueueItem> {
        self.uploads(scope)
            .iter()
            .filter(|i| i.status.is_pending())
            .cloned()
            .collect()
    }

    pub fn failed_uploads(&self, scope: &Scope) -> Vec<UploadQueueItem> {
        self.uploads(scope)
            .iter()
            .filter(|i| i.status == UploadStatus::Failed)
            .cloned()
            .collect()
    }

    // ---- library selections ---------------------------------------------

    pub fn select_from_library(&mut self, scope: &Scope, record: AttachmentRecord) {
        let selection = self.library_selection_mut(scope);
        if selection.iter().any(|r| r.id == record.id) {
            debug!(attachment_id = %record.id, "select_from_library: already selected");
            return;
        }
        selection.push(record);
    }

    pub fn deselect_from_library(&mut self, scope: &Scope, attachment_id: Uuid) {
        self.library_selection_mut(scope)
            .retain(|r| r.id != attachment_id);
    }

    pub fn selected(&self, scope: &Scope) -> &[AttachmentRecord] {
        match scope {
            Scope::Target(target) => self
                .library_selection
                .get(target)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            Scope::Draft => &self.draft.library_selection,
        }
    }

    // ---- draft promotion ------------------------------------------------

    /// Move every draft-buffered upload into the queue of a now-known
    /// target, preserving order. One-shot and irreversible; the draft buffer
    /// is left empty.
    pub fn promote_uploads(&mut self, target: &TargetId) {
        let drained: Vec<UploadQueueItem> = self.draft.upload_queue.drain(..).collect();
        if drained.is_empty() {
            return;
        }
        debug!(%target, count = drained.len(), "promoting draft uploads");
        self.upload_queue
            .entry(target.clone())
            .or_default()
            .extend(drained);
    }

    /// Same transition for draft library selections.
    pub fn promote_selections(&mut self, target: &TargetId) {
        let drained: Vec<AttachmentRecord> = self.draft.library_selection.drain(..).collect();
        if drained.is_empty() {
            return;
        }
        debug!(%target, count = drained.len(), "promoting draft selections");
        self.library_selection
            .entry(target.clone())
            .or_default()
            .extend(drained);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attachkit_core::FileSource;
    use bytes::Bytes;
    use chrono::Utc;

    fn state() -> AttachmentState {
        AttachmentState::new(&UploadConfig::default())
    }

    fn record(name: &str) -> AttachmentRecord {
        AttachmentRecord {
            id: Uuid::new_v4(),
            original_name: name.into(),
            file_type: "text/plain".into(),
            size_bytes: 42,
            is_global: false,
            expires_at: None,
            created_at: Utc::now(),
            signed_url: None,
            target_id: None,
            owner_id: None,
        }
    }

    fn stage(filename: &str) -> StageUpload {
        StageUpload {
            source: FileSource::Memory(Bytes::from_static(b"contents")),
            filename: filename.into(),
            content_type: "text/plain".into(),
            is_global: false,
            expires_at: None,
        }
    }

    fn task_scope() -> Scope {
        Scope::Target(TargetId::new("task-1"))
    }

    #[test]
    fn stage_removal_moves_atomically() {
        let mut state = state();
        let scope = task_scope();
        let a = record("a.txt");
        let id = a.id;
        state.set_existing(&scope, vec![a, record("b.txt")]);

        state.stage_removal(&scope, id);

        assert!(state.existing(&scope).iter().all(|r| r.id != id));
        assert_eq!(
            state
                .pending_removals(&scope)
                .iter()
                .filter(|r| r.id == id)
                .count(),
            1
        );
    }

    #[test]
    fn restore_removal_is_the_exact_inverse() {
        let mut state = state();
        let scope = task_scope();
        let a = record("a.txt");
        let id = a.id;
        state.set_existing(&scope, vec![a]);

        state.stage_removal(&scope, id);
        state.restore_removal(&scope, id);

        assert_eq!(state.existing(&scope).len(), 1);
        assert!(state.pending_removals(&scope).is_empty());
    }

    #[test]
    fn missing_id_is_a_silent_noop() {
        let mut state = state();
        let scope = task_scope();
        state.set_existing(&scope, vec![record("a.txt")]);

        state.stage_removal(&scope, Uuid::new_v4());

        assert_eq!(state.existing(&scope).len(), 1);
        assert!(state.pending_removals(&scope).is_empty());

        state.restore_removal(&scope, Uuid::new_v4());
        assert_eq!(state.existing(&scope).len(), 1);
        assert!(state.pending_removals(&scope).is_empty());
    }

    #[test]
    fn commit_removals_clears_staging_and_existing() {
        let mut state = state();
        let scope = task_scope();
        let a = record("a.txt");
        let id = a.id;
        state.set_existing(&scope, vec![a.clone(), record("b.txt")]);
        state.stage_removal(&scope, id);
        // A duplicate of the staged record lingering in the existing set is
        // dropped defensively on commit.
        state.add_existing(&scope, a);

        state.commit_removals(&scope);

        assert!(state.pending_removals(&scope).is_empty());
        assert!(state.existing(&scope).iter().all(|r| r.id != id));
        assert_eq!(state.existing(&scope).len(), 1);
    }

    #[test]
    fn add_existing_does_not_deduplicate() {
        let mut state = state();
        let scope = task_scope();
        let a = record("a.txt");
        state.add_existing(&scope, a.clone());
        state.add_existing(&scope, a);
        assert_eq!(state.existing(&scope).len(), 2);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut state = state();
        let scope = task_scope();
        let mut a = record("a.txt");
        state.add_existing(&scope, a.clone());
        a.original_name = "renamed.txt".into();
        state.upsert_existing(&scope, a.clone());
        assert_eq!(state.existing(&scope).len(), 1);
        assert_eq!(state.existing(&scope)[0].original_name, "renamed.txt");

        state.upsert_existing(&scope, record("new.txt"));
        assert_eq!(state.existing(&scope).len(), 2);
    }

    #[test]
    fn enqueue_validates_and_sanitizes() {
        let mut state = state();
        let scope = task_scope();
        let id = state.enqueue_upload(&scope, stage("my notes.txt")).unwrap();

        let uploads = state.uploads(&scope);
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].id, id);
        assert_eq!(uploads[0].filename, "my_notes.txt");
        assert_eq!(uploads[0].status, UploadStatus::Queued);
        assert_eq!(uploads[0].preview_uri, format!("attachkit://preview/{id}"));
    }

    #[test]
    fn enqueue_rejects_disallowed_extension() {
        let mut state = state();
        let err = state
            .enqueue_upload(&task_scope(), stage("payload.exe"))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn clear_failed_keeps_other_statuses() {
        let mut state = state();
        let scope = task_scope();
        let a = state.enqueue_upload(&scope, stage("a.txt")).unwrap();
        let _b = state.enqueue_upload(&scope, stage("b.txt")).unwrap();
        state.update_upload(
            &scope,
            &a,
            UploadItemPatch {
                status: Some(UploadStatus::Failed),
                ..Default::default()
            },
        );

        state.clear_failed(&scope);

        let uploads = state.uploads(&scope);
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].filename, "b.txt");
    }

    #[test]
    fn retry_failed_requeues() {
        let mut state = state();
        let scope = task_scope();
        let a = state.enqueue_upload(&scope, stage("a.txt")).unwrap();
        state.update_upload(
            &scope,
            &a,
            UploadItemPatch {
                status: Some(UploadStatus::Failed),
                ..Default::default()
            },
        );

        state.retry_failed(&scope);

        assert_eq!(state.uploads(&scope)[0].status, UploadStatus::Queued);
    }

    #[test]
    fn flush_drains_everything() {
        let mut state = state();
        let scope = task_scope();
        state.enqueue_upload(&scope, stage("a.txt")).unwrap();
        state.enqueue_upload(&scope, stage("b.txt")).unwrap();

        let drained = state.flush_uploads(&scope);

        assert_eq!(drained.len(), 2);
        assert!(state.uploads(&scope).is_empty());
    }

    #[test]
    fn promote_uploads_preserves_order_and_empties_draft() {
        let mut state = state();
        let a = state.enqueue_upload(&Scope::Draft, stage("a.txt")).unwrap();
        let b = state.enqueue_upload(&Scope::Draft, stage("b.txt")).unwrap();
        let target = TargetId::new("task-9");

        state.promote_uploads(&target);

        assert!(state.uploads(&Scope::Draft).is_empty());
        let queue = state.uploads(&Scope::Target(target));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, a);
        assert_eq!(queue[1].id, b);
    }

    #[test]
    fn promote_selections_moves_draft_picks() {
        let mut state = state();
        let rec = record("lib.txt");
        state.select_from_library(&Scope::Draft, rec.clone());
        let target = TargetId::new("task-9");

        state.promote_selections(&target);

        assert!(state.selected(&Scope::Draft).is_empty());
        let selected = state.selected(&Scope::Target(target));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, rec.id);
    }

    #[test]
    fn selections_do_not_duplicate() {
        let mut state = state();
        let scope = task_scope();
        let rec = record("lib.txt");
        state.select_from_library(&scope, rec.clone());
        state.select_from_library(&scope, rec.clone());
        assert_eq!(state.selected(&scope).len(), 1);

        state.deselect_from_library(&scope, rec.id);
        assert!(state.selected(&scope).is_empty());
    }

    #[test]
    fn scopes_are_isolated() {
        let mut state = state();
        let t1 = Scope::Target(TargetId::new("task-1"));
        let t2 = Scope::Target(TargetId::new("task-2"));
        state.enqueue_upload(&t1, stage("a.txt")).unwrap();

        assert_eq!(state.uploads(&t1).len(), 1);
        assert!(state.uploads(&t2).is_empty());
        assert!(state.uploads(&Scope::Draft).is_empty());
    }
}
