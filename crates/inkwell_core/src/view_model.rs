use crate::{DropOverlay, Notice, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskTally {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorViewModel {
    pub live_html: String,
    pub canonical_html: String,
    pub notices: Vec<Notice>,
    pub batch_labels: Vec<String>,
    pub overlay: Option<DropOverlay>,
    pub uploads: Vec<UploadRowView>,
    pub tally: TaskTally,
    /// Content updates withheld from persistence because they exceeded the
    /// content limits.
    pub dropped_edits: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub task_id: TaskId,
    pub file_name: String,
    pub status: TaskStatus,
    pub progress: u8,
}
