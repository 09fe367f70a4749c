use crate::{BatchId, ClipboardPayload, FileRef, NodeId, TaskId};

/// Transport result as the editor sees it: the failure side is already a
/// human-readable reason.
pub type UploadResult = Result<UploadedImage, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User moved the caret to a block index.
    CursorMoved(usize),
    /// User typed a paragraph at the caret.
    TextEntered(String),
    /// Paste event with the clipboard contents.
    Pasted(ClipboardPayload),
    /// Pointer dragging files entered an element of the editor.
    DragEntered,
    /// Dragover with the currently hovered files.
    DragOver(Vec<FileRef>),
    /// Pointer left an element of the editor.
    DragLeft,
    /// Files dropped on the editor.
    Dropped(Vec<FileRef>),
    /// Files chosen through the toolbar image picker.
    FilesPicked {
        files: Vec<FileRef>,
        folder: Option<String>,
    },
    /// Transport progress for a task (0..=100).
    UploadProgress { task_id: TaskId, progress: u8 },
    /// Transport resolution for a task.
    UploadDone { task_id: TaskId, result: UploadResult },
    /// Every task of the batch has been resolved by the transport.
    BatchFinished { batch_id: BatchId },
    /// User clicked the cancel button of an upload placeholder.
    CancelClicked { task_id: TaskId },
    /// Notice dismissed by the user or by its timer.
    NoticeDismissed { node_id: NodeId },
    /// Host loop tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
