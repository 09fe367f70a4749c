use std::collections::BTreeMap;

use editor_logging::{editor_debug, editor_info, editor_warn};

use crate::content::check_content;
use crate::view_model::{EditorViewModel, TaskTally, UploadRowView};
use crate::{
    BatchTask, Document, EditorSettings, Effect, FileRef, ImageNode, NodeId, NoticeKind,
    UploadResult,
};

pub type TaskId = u64;
pub type BatchId = u64;

/// Reason shown when a failure arrives without any message.
pub const UNKNOWN_UPLOAD_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Uploading,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub id: TaskId,
    pub batch_id: BatchId,
    pub file: FileRef,
    pub status: TaskStatus,
    pub progress: u8,
    pub placeholder_id: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchState {
    indicator_id: Option<NodeId>,
    settled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub(crate) document: Document,
    pub(crate) drag: crate::DragTracker,
    pub(crate) settings: EditorSettings,
    tasks: BTreeMap<TaskId, UploadTask>,
    batches: BTreeMap<BatchId, BatchState>,
    next_task_id: TaskId,
    next_batch_id: BatchId,
    tally: TaskTally,
    dropped_edits: usize,
    dirty: bool,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = document;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn task(&self, task_id: TaskId) -> Option<&UploadTask> {
        self.tasks.get(&task_id)
    }

    pub fn active_task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    /// No tracked task and no batch waiting for its finish event.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.batches.is_empty()
    }

    pub fn view(&self) -> EditorViewModel {
        EditorViewModel {
            live_html: self.document.to_live_html(),
            canonical_html: self.document.to_canonical_html(),
            notices: self.document.notices().cloned().collect(),
            batch_labels: self
                .document
                .batch_indicators()
                .map(|batch| batch.label())
                .collect(),
            overlay: self.drag.overlay().cloned(),
            uploads: self
                .tasks
                .values()
                .map(|task| UploadRowView {
                    task_id: task.id,
                    file_name: task.file.name.clone(),
                    status: task.status,
                    progress: task.progress,
                })
                .collect(),
            tally: self.tally.clone(),
            dropped_edits: self.dropped_edits,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Tracks every accepted file as a pending task of a new batch. Multi-file
    /// batches get an aggregate progress indicator at the cursor.
    pub(crate) fn register_batch(&mut self, files: Vec<FileRef>) -> (BatchId, Vec<BatchTask>) {
        self.next_batch_id += 1;
        let batch_id = self.next_batch_id;
        let indicator_id = (files.len() > 1)
            .then(|| self.document.insert_batch_progress(batch_id, files.len()));

        let mut tasks = Vec::with_capacity(files.len());
        for file in files {
            self.next_task_id += 1;
            let task_id = self.next_task_id;
            self.tasks.insert(
                task_id,
                UploadTask {
                    id: task_id,
                    batch_id,
                    file: file.clone(),
                    status: TaskStatus::Pending,
                    progress: 0,
                    placeholder_id: None,
                },
            );
            tasks.push(BatchTask { task_id, file });
        }
        self.batches.insert(
            batch_id,
            BatchState {
                indicator_id,
                settled: 0,
            },
        );
        editor_info!("Batch {} accepted {} file(s)", batch_id, tasks.len());
        self.mark_dirty();
        (batch_id, tasks)
    }

    /// First event creates the placeholder; later ones update it in place.
    pub(crate) fn apply_progress(&mut self, task_id: TaskId, progress: u8) {
        let Some(task) = self.tasks.get_mut(&task_id) else {
            editor_debug!("Progress for untracked task {} ignored", task_id);
            return;
        };
        let progress = progress.min(100);
        if let Some(id) = &task.placeholder_id {
            self.document.set_progress(id, progress);
        } else {
            let id = self
                .document
                .insert_placeholder(task_id, &task.file.name, progress);
            task.placeholder_id = Some(id);
        }
        task.status = TaskStatus::Uploading;
        task.progress = progress;
        self.dirty = true;
    }

    /// Terminal transport outcome. Handled at most once per task: a result
    /// for a task that is no longer tracked (cancelled, already settled) is
    /// dropped.
    pub(crate) fn apply_done(&mut self, task_id: TaskId, result: UploadResult) -> Vec<Effect> {
        let Some(task) = self.untrack(task_id) else {
            editor_debug!("Result for untracked task {} ignored", task_id);
            return Vec::new();
        };

        let mut effects = Vec::new();
        match result {
            Ok(image) => {
                editor_info!("Task {} uploaded {} to {}", task_id, task.file.name, image.url);
                self.document.insert_image(ImageNode {
                    src: image.url,
                    alt: task.file.alt_text(),
                    public_id: Some(image.public_id),
                });
                self.record(TaskStatus::Completed);
                effects.extend(self.show_notice(
                    NoticeKind::Success,
                    format!("{} uploaded successfully", task.file.name),
                ));
                effects.extend(self.persist_content());
            }
            Err(reason) => {
                let reason = if reason.trim().is_empty() {
                    UNKNOWN_UPLOAD_ERROR.to_string()
                } else {
                    reason
                };
                editor_warn!("Task {} failed for {}: {}", task_id, task.file.name, reason);
                self.record(TaskStatus::Failed);
                effects.extend(self.show_notice(
                    NoticeKind::Error,
                    format!("Failed to upload {}: {}", task.file.name, reason),
                ));
            }
        }
        self.settle(task.batch_id);
        effects
    }

    /// Local cleanup happens immediately; the transport abort is an effect.
    pub(crate) fn cancel(&mut self, task_id: TaskId) -> Vec<Effect> {
        let Some(task) = self.untrack(task_id) else {
            editor_debug!("Cancel for unknown task {} ignored", task_id);
            return Vec::new();
        };
        editor_info!("Task {} cancelled ({})", task_id, task.file.name);
        self.record(TaskStatus::Cancelled);
        self.settle(task.batch_id);

        let mut effects = vec![Effect::CancelUpload { task_id }];
        effects.extend(self.show_notice(
            NoticeKind::Cancelled,
            format!("Upload of {} cancelled", task.file.name),
        ));
        effects
    }

    pub(crate) fn finish_batch(&mut self, batch_id: BatchId) {
        let Some(batch) = self.batches.remove(&batch_id) else {
            return;
        };
        if let Some(id) = batch.indicator_id {
            self.document.remove(&id);
        }
        editor_info!("Batch {} finished", batch_id);
        self.dirty = true;
    }

    pub(crate) fn show_notice(&mut self, kind: NoticeKind, message: String) -> Option<Effect> {
        let node_id = self.document.insert_notice(kind, message);
        self.dirty = true;
        kind.auto_dismisses().then(|| Effect::ScheduleDismiss {
            node_id,
            after: self.settings.notice_dismiss_after(),
        })
    }

    pub(crate) fn dismiss(&mut self, node_id: &NodeId) {
        if self.document.remove(node_id) {
            self.dirty = true;
        }
    }

    /// Emits the persistence effect when the canonical content fits the
    /// content limits. Over-limit content is logged and dropped.
    pub(crate) fn persist_content(&mut self) -> Option<Effect> {
        match check_content(&self.document, &self.settings.content) {
            Ok(html) => Some(Effect::PersistContent { html }),
            Err(rejection) => {
                editor_warn!("Content update not persisted: {}", rejection);
                self.dropped_edits += 1;
                None
            }
        }
    }

    fn untrack(&mut self, task_id: TaskId) -> Option<UploadTask> {
        let mut task = self.tasks.remove(&task_id)?;
        if let Some(id) = task.placeholder_id.take() {
            self.document.remove(&id);
        }
        self.dirty = true;
        Some(task)
    }

    fn settle(&mut self, batch_id: BatchId) {
        let Some(batch) = self.batches.get_mut(&batch_id) else {
            return;
        };
        batch.settled += 1;
        if let Some(id) = &batch.indicator_id {
            self.document.set_batch_completed(id, batch.settled);
        }
    }

    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Completed => self.tally.completed += 1,
            TaskStatus::Failed => self.tally.failed += 1,
            TaskStatus::Cancelled => self.tally.cancelled += 1,
            TaskStatus::Pending | TaskStatus::Uploading => {}
        }
    }
}
