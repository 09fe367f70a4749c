use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use editor_logging::{editor_debug, editor_info, editor_warn};
use futures_util::FutureExt;
use inkwell_core::{BatchId, BatchTask, TaskId};
use tokio_util::sync::CancellationToken;

use crate::transport::{ProgressSink, UploadOptions, UploadTransport};
use crate::{EngineEvent, FailureKind, UploadError, UploadReceipt};

/// Cancellation tokens of in-flight and queued uploads, keyed by task id.
#[derive(Debug, Default)]
pub struct CancelRegistry {
    tokens: Mutex<HashMap<TaskId, CancellationToken>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh token, replacing any token left under the same id.
    pub fn register(&self, task_id: TaskId) -> CancellationToken {
        let token = CancellationToken::new();
        self.lock().insert(task_id, token.clone());
        token
    }

    /// Returns `false` when no upload is registered under `task_id`.
    pub fn cancel(&self, task_id: TaskId) -> bool {
        match self.lock().remove(&task_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn unregister(&self, task_id: TaskId) {
        self.lock().remove(&task_id);
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.lock().contains_key(&task_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One accepted batch, with a token already registered per task.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub batch_id: BatchId,
    pub folder: Option<String>,
    pub tasks: Vec<(BatchTask, CancellationToken)>,
}

impl BatchRequest {
    /// Registers every task of the batch before any upload can start, so a
    /// cancel issued right after acceptance always finds its token.
    pub fn register(
        registry: &CancelRegistry,
        batch_id: BatchId,
        folder: Option<String>,
        tasks: Vec<BatchTask>,
    ) -> Self {
        let tasks = tasks
            .into_iter()
            .map(|task| {
                let token = registry.register(task.task_id);
                (task, token)
            })
            .collect();
        Self {
            batch_id,
            folder,
            tasks,
        }
    }
}

/// Uploads the batch in order, awaiting each transport call before the next.
///
/// A started task first reports 0% so the editor can show its placeholder.
/// Every task yields exactly one `UploadCompleted` event, followed by a
/// single `BatchFinished` once the whole batch has been walked.
pub async fn run_batch(
    transport: Arc<dyn UploadTransport>,
    registry: Arc<CancelRegistry>,
    request: BatchRequest,
    sink: Arc<dyn ProgressSink>,
) {
    let BatchRequest {
        batch_id,
        folder,
        tasks,
    } = request;
    let options = UploadOptions { folder };
    editor_info!("Batch {} running {} upload(s)", batch_id, tasks.len());

    for (task, token) in tasks {
        let task_id = task.task_id;
        let result = if token.is_cancelled() {
            editor_debug!("Task {} cancelled before it started", task_id);
            Err(UploadError::cancelled())
        } else {
            sink.emit(EngineEvent::Progress {
                task_id,
                percent: 0,
            });
            upload_one(transport.as_ref(), &task, &options, &token, sink.clone()).await
        };
        registry.unregister(task_id);

        if let Err(err) = &result {
            if err.kind != FailureKind::Cancelled {
                editor_warn!("Task {} failed: {}", task_id, err);
            }
        }
        sink.emit(EngineEvent::UploadCompleted { task_id, result });
    }

    sink.emit(EngineEvent::BatchFinished { batch_id });
}

async fn upload_one(
    transport: &dyn UploadTransport,
    task: &BatchTask,
    options: &UploadOptions,
    token: &CancellationToken,
    sink: Arc<dyn ProgressSink>,
) -> Result<UploadReceipt, UploadError> {
    let upload = transport.upload(task.task_id, &task.file, options, sink);
    let upload = AssertUnwindSafe(upload).catch_unwind();

    tokio::select! {
        _ = token.cancelled() => Err(UploadError::cancelled()),
        outcome = upload => match outcome {
            Ok(result) => result,
            Err(payload) => Err(UploadError::new(
                FailureKind::Panicked,
                panic_message(payload.as_ref()),
            )),
        },
    }
}

/// Panic payloads are usually `&str` or `String`; anything else has no
/// message and maps to the generic reason downstream.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::new()
    }
}
