use std::time::{Duration, Instant};

use editor_logging::{editor_debug, editor_info, editor_warn};
use inkwell_core::{update, EditorState, EditorViewModel, Msg};

use crate::effects::EffectRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One headless editing session: the core state plus the effect runner
/// that drives it.
pub(crate) struct Session {
    state: EditorState,
    runner: EffectRunner,
}

impl Session {
    pub(crate) fn new(state: EditorState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    pub(crate) fn state(&self) -> &EditorState {
        &self.state
    }

    pub(crate) fn runner(&self) -> &EffectRunner {
        &self.runner
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            log_view(&state.view());
        }
        self.state = state;
        self.runner.run(effects);
    }

    /// Feeds engine events back into the core until every batch has
    /// finished. Returns `false` when `max_wait` elapsed first.
    pub(crate) fn run_until_idle(&mut self, max_wait: Duration) -> bool {
        let deadline = Instant::now() + max_wait;
        while !self.state.is_idle() {
            if Instant::now() >= deadline {
                editor_warn!(
                    "Gave up waiting on {} upload(s)",
                    self.state.active_task_ids().len()
                );
                return false;
            }
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.dispatch(msg);
            }
        }
        editor_info!("Session idle");
        true
    }

    pub(crate) fn view(&self) -> EditorViewModel {
        self.state.view()
    }
}

fn log_view(view: &EditorViewModel) {
    for upload in &view.uploads {
        editor_debug!(
            "upload {} {} {:?} {}%",
            upload.task_id,
            upload.file_name,
            upload.status,
            upload.progress
        );
    }
    for label in &view.batch_labels {
        editor_info!("{}", label);
    }
    if let Some(overlay) = &view.overlay {
        editor_info!(
            "drop overlay {:?}: {} {}",
            overlay.verdict,
            overlay.valid_label(),
            overlay.skipped_label().unwrap_or_default()
        );
    }
}
