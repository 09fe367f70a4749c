use crate::paste::{classify_paste, PasteOutcome, HTML_IMAGE_GUIDANCE};
use crate::validate::{screen_files, Screening};
use crate::{EditorState, Effect, Msg, NoticeKind};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: EditorState, msg: Msg) -> (EditorState, Vec<Effect>) {
    let effects = match msg {
        Msg::CursorMoved(position) => {
            state.document.set_cursor(position);
            state.mark_dirty();
            Vec::new()
        }
        Msg::TextEntered(text) => {
            if text.is_empty() {
                return (state, Vec::new());
            }
            state.document.insert_paragraph(text);
            state.mark_dirty();
            state.persist_content().into_iter().collect()
        }
        Msg::Pasted(payload) => {
            match classify_paste(&payload, &state.settings.upload) {
                PasteOutcome::PassThrough { text: None } => Vec::new(),
                PasteOutcome::PassThrough { text: Some(text) } => {
                    state.document.insert_paragraph(text);
                    state.mark_dirty();
                    state.persist_content().into_iter().collect()
                }
                PasteOutcome::HtmlImagesRejected { fallback_text } => {
                    let mut effects: Vec<Effect> = state
                        .show_notice(NoticeKind::Info, HTML_IMAGE_GUIDANCE.to_string())
                        .into_iter()
                        .collect();
                    if let Some(text) = fallback_text {
                        state.document.insert_paragraph(text);
                        effects.extend(state.persist_content());
                    }
                    effects
                }
                PasteOutcome::Images(screening) => {
                    let folder = state.settings.default_folder.clone();
                    start_batch(&mut state, screening, folder)
                }
            }
        }
        Msg::DragEntered => {
            if state.drag.enter() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DragOver(files) => {
            if state.drag.over(&files, &state.settings.upload) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DragLeft => {
            if state.drag.leave() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Dropped(files) => {
            if state.drag.reset() {
                state.mark_dirty();
            }
            let screening = screen_files(files, &state.settings.upload);
            let folder = state.settings.default_folder.clone();
            start_batch(&mut state, screening, folder)
        }
        Msg::FilesPicked { files, folder } => {
            let screening = screen_files(files, &state.settings.upload);
            let folder = folder.or_else(|| state.settings.default_folder.clone());
            start_batch(&mut state, screening, folder)
        }
        Msg::UploadProgress { task_id, progress } => {
            state.apply_progress(task_id, progress);
            Vec::new()
        }
        Msg::UploadDone { task_id, result } => state.apply_done(task_id, result),
        Msg::BatchFinished { batch_id } => {
            state.finish_batch(batch_id);
            Vec::new()
        }
        Msg::CancelClicked { task_id } => state.cancel(task_id),
        Msg::NoticeDismissed { node_id } => {
            state.dismiss(&node_id);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Reports every rejection in one error notice, then hands the accepted
/// files to the engine as a single sequential batch.
fn start_batch(
    state: &mut EditorState,
    screening: Screening,
    folder: Option<String>,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(message) = screening.combined_message() {
        effects.extend(state.show_notice(NoticeKind::Error, message));
    }
    if screening.accepted.is_empty() {
        return effects;
    }
    let (batch_id, tasks) = state.register_batch(screening.accepted);
    effects.push(Effect::StartBatch {
        batch_id,
        folder,
        tasks,
    });
    effects
}
