use std::time::Duration;

use crate::{BatchId, FileRef, NodeId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTask {
    pub task_id: TaskId,
    pub file: FileRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload `tasks` one after another, in order.
    StartBatch {
        batch_id: BatchId,
        folder: Option<String>,
        tasks: Vec<BatchTask>,
    },
    /// Abort the transport call for `task_id`, if it is still running.
    CancelUpload { task_id: TaskId },
    /// Deliver `Msg::NoticeDismissed` for `node_id` after `after`.
    ScheduleDismiss { node_id: NodeId, after: Duration },
    /// Canonical content changed and passed the content limits.
    PersistContent { html: String },
}
