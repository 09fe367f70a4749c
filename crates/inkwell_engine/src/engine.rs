use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use editor_logging::{editor_debug, editor_info};
use inkwell_core::{BatchId, BatchTask, NodeId, TaskId};

use crate::runner::{run_batch, BatchRequest, CancelRegistry};
use crate::transport::{
    ChannelProgressSink, ProgressSink, ReqwestTransport, TransportSettings, UploadTransport,
};
use crate::{EngineEvent, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build upload transport: {0}")]
    Transport(#[from] UploadError),
    #[error("failed to spawn engine thread: {0}")]
    Thread(std::io::Error),
}

enum EngineCommand {
    RunBatch(BatchRequest),
    ScheduleDismiss { node_id: NodeId, after: Duration },
}

/// Background worker owning the async runtime. Commands go in through the
/// handle; progress and completion come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    registry: Arc<CancelRegistry>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings) -> Result<Self, EngineError> {
        let transport = ReqwestTransport::new(settings)?;
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn UploadTransport>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let registry = Arc::new(CancelRegistry::new());
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let worker_registry = registry.clone();
        thread::Builder::new()
            .name("inkwell-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    handle_command(
                        &runtime,
                        transport.clone(),
                        worker_registry.clone(),
                        command,
                        event_tx.clone(),
                    );
                }
                editor_debug!("Engine command channel closed");
            })
            .map_err(EngineError::Thread)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            registry,
        })
    }

    /// Tokens are registered here, on the caller's thread, so that a cancel
    /// issued right after this call is never lost.
    pub fn start_batch(&self, batch_id: BatchId, folder: Option<String>, tasks: Vec<BatchTask>) {
        let request = BatchRequest::register(&self.registry, batch_id, folder, tasks);
        let _ = self.cmd_tx.send(EngineCommand::RunBatch(request));
    }

    /// Trips the task's token. Unknown or already finished ids are ignored.
    pub fn cancel(&self, task_id: TaskId) -> bool {
        let found = self.registry.cancel(task_id);
        if found {
            editor_info!("Cancellation requested for task {}", task_id);
        } else {
            editor_debug!("No running upload for task {}", task_id);
        }
        found
    }

    pub fn schedule_dismiss(&self, node_id: NodeId, after: Duration) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ScheduleDismiss { node_id, after });
    }

    /// Uploads that are queued or running.
    pub fn pending_uploads(&self) -> usize {
        self.registry.len()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    transport: Arc<dyn UploadTransport>,
    registry: Arc<CancelRegistry>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::RunBatch(request) => {
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx));
            runtime.spawn(run_batch(transport, registry, request, sink));
        }
        EngineCommand::ScheduleDismiss { node_id, after } => {
            runtime.spawn(async move {
                tokio::time::sleep(after).await;
                let _ = event_tx.send(EngineEvent::DismissDue { node_id });
            });
        }
    }
}
