use std::time::Duration;

use editor_logging::{editor_error, editor_info, editor_warn};
use inkwell_core::{Effect, Msg, UploadedImage};
use inkwell_engine::{ContentStore, EngineEvent, EngineHandle};

/// Executes core effects against the engine and turns engine events back
/// into messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    store: Option<ContentStore>,
}

impl EffectRunner {
    pub(crate) fn new(engine: EngineHandle, store: Option<ContentStore>) -> Self {
        Self { engine, store }
    }

    pub(crate) fn store(&self) -> Option<&ContentStore> {
        self.store.as_ref()
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartBatch {
                    batch_id,
                    folder,
                    tasks,
                } => {
                    editor_info!(
                        "StartBatch batch_id={} tasks={} folder={:?}",
                        batch_id,
                        tasks.len(),
                        folder
                    );
                    self.engine.start_batch(batch_id, folder, tasks);
                }
                Effect::CancelUpload { task_id } => {
                    self.engine.cancel(task_id);
                }
                Effect::ScheduleDismiss { node_id, after } => {
                    self.engine.schedule_dismiss(node_id, after);
                }
                Effect::PersistContent { html } => self.persist(&html),
            }
        }
    }

    pub(crate) fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    fn persist(&mut self, html: &str) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.save(html) {
            Ok(path) => editor_info!("Saved {} bytes to {:?}", html.len(), path),
            Err(err) => editor_error!("Failed to save content to {:?}: {}", store.target(), err),
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { task_id, percent } => Msg::UploadProgress {
            task_id,
            progress: percent,
        },
        EngineEvent::UploadCompleted { task_id, result } => Msg::UploadDone {
            task_id,
            result: result
                .map(|receipt| UploadedImage {
                    url: receipt.url,
                    public_id: receipt.public_id,
                })
                .map_err(|err| {
                    editor_warn!("Upload {} failed: {}", task_id, err);
                    err.user_message()
                }),
        },
        EngineEvent::BatchFinished { batch_id } => Msg::BatchFinished { batch_id },
        EngineEvent::DismissDue { node_id } => Msg::NoticeDismissed { node_id },
    }
}
