//! Inkwell core: pure editor state machine for image uploads.
//!
//! Event sources (paste, drag-and-drop, file picker) become [`Msg`]s,
//! [`update`] applies them to the [`EditorState`] and its [`Document`], and
//! anything that needs IO comes back out as an [`Effect`].
mod content;
mod document;
mod drag;
mod effect;
mod file;
mod msg;
mod paste;
mod settings;
mod state;
mod update;
mod validate;
mod view_model;

pub use content::{
    check_content, ContentLimits, ContentRejection, DEFAULT_MAX_CONTENT_BYTES,
    DEFAULT_MAX_CONTENT_IMAGES,
};
pub use document::{
    BatchProgress, Document, ImageNode, Node, NodeId, Notice, NoticeKind, Placeholder,
};
pub use drag::{DragTracker, DropOverlay, OverlayVerdict};
pub use effect::{BatchTask, Effect};
pub use file::{FileRef, FileSource};
pub use msg::{Msg, UploadResult, UploadedImage};
pub use paste::{
    classify_paste, ClipboardItem, ClipboardPayload, PasteOutcome, HTML_IMAGE_GUIDANCE,
};
pub use settings::{EditorSettings, DEFAULT_NOTICE_DISMISS_MS};
pub use state::{BatchId, EditorState, TaskId, TaskStatus, UploadTask, UNKNOWN_UPLOAD_ERROR};
pub use update::update;
pub use validate::{
    screen_files, validate_file, RejectedFile, Rejection, Screening, UploadLimits,
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use view_model::{EditorViewModel, TaskTally, UploadRowView};
