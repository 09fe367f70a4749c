use std::fmt;

use inkwell_core::{BatchId, NodeId, TaskId, UNKNOWN_UPLOAD_ERROR};

/// What the storage provider returned for a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        task_id: TaskId,
        percent: u8,
    },
    UploadCompleted {
        task_id: TaskId,
        result: Result<UploadReceipt, UploadError>,
    },
    BatchFinished {
        batch_id: BatchId,
    },
    DismissDue {
        node_id: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct UploadError {
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "upload cancelled")
    }

    /// Reason shown to the user; never empty.
    pub fn user_message(&self) -> String {
        if self.message.trim().is_empty() {
            UNKNOWN_UPLOAD_ERROR.to_string()
        } else {
            self.message.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    Io,
    Network,
    Timeout,
    HttpStatus(u16),
    Rejected,
    InvalidResponse,
    Cancelled,
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid upload endpoint"),
            FailureKind::Io => write!(f, "file read error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::InvalidResponse => write!(f, "invalid server response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Panicked => write!(f, "transport panicked"),
        }
    }
}
