use std::sync::Once;

use inkwell_core::{
    update, DragTracker, EditorState, Effect, FileRef, Msg, NoticeKind, OverlayVerdict,
    UploadLimits,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(editor_logging::initialize_for_tests);
}

fn file(name: &str, mime: &str) -> FileRef {
    FileRef::from_path(format!("/home/user/{name}"), mime, 1024)
}

#[test]
fn nested_enter_and_leave_do_not_flicker_overlay() {
    let mut tracker = DragTracker::default();
    assert!(tracker.enter());
    assert!(!tracker.enter()); // child element
    assert!(!tracker.leave()); // left the child
    assert!(tracker.overlay().is_some());
    assert!(tracker.leave());
    assert!(tracker.overlay().is_none());
    assert_eq!(tracker.depth(), 0);
}

#[test]
fn stray_leave_does_not_underflow() {
    let mut tracker = DragTracker::default();
    assert!(!tracker.leave());
    assert_eq!(tracker.depth(), 0);
    assert!(tracker.enter());
}

#[test]
fn dragover_recolors_the_overlay() {
    let limits = UploadLimits::default();
    let mut tracker = DragTracker::default();
    tracker.enter();
    assert_eq!(tracker.overlay().unwrap().verdict, OverlayVerdict::Pending);

    tracker.over(&[file("a.png", "image/png")], &limits);
    assert_eq!(tracker.overlay().unwrap().verdict, OverlayVerdict::AllValid);

    tracker.over(&[file("a.tiff", "image/tiff")], &limits);
    assert_eq!(
        tracker.overlay().unwrap().verdict,
        OverlayVerdict::AllInvalid
    );

    let changed = tracker.over(&[file("a.tiff", "image/tiff")], &limits);
    assert!(!changed);
}

#[test]
fn dragover_without_enter_is_ignored() {
    let mut tracker = DragTracker::default();
    assert!(!tracker.over(&[file("a.png", "image/png")], &UploadLimits::default()));
    assert!(tracker.overlay().is_none());
}

#[test]
fn mixed_drag_previews_and_drops_only_valid_files() {
    init_logging();
    let files = vec![file("photo.jpg", "image/jpeg"), file("clip.mp4", "video/mp4")];

    let (state, _) = update(EditorState::new(), Msg::DragEntered);
    let (state, _) = update(state, Msg::DragEntered);
    let (state, _) = update(state, Msg::DragOver(files.clone()));

    let overlay = state.view().overlay.expect("overlay visible");
    assert_eq!(overlay.verdict, OverlayVerdict::SomeInvalid);
    assert_eq!(overlay.valid_label(), "1 valid file(s)");
    assert_eq!(
        overlay.skipped_label(),
        Some("1 file(s) will be skipped".to_string())
    );

    let (state, effects) = update(state, Msg::Dropped(files));

    assert!(state.view().overlay.is_none());
    let errors: Vec<_> = state
        .document()
        .notices()
        .filter(|n| n.kind == NoticeKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("clip.mp4: unsupported file type video/mp4"));

    let batches: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::StartBatch { tasks, .. } => Some(tasks),
            _ => None,
        })
        .collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].file.name, "photo.jpg");

    // A fresh gesture starts from depth zero after the drop.
    let (state, _) = update(state, Msg::DragEntered);
    let (state, _) = update(state, Msg::DragLeft);
    assert!(state.view().overlay.is_none());
}

#[test]
fn drop_of_only_invalid_files_starts_nothing() {
    init_logging();
    let (state, effects) = update(
        EditorState::new(),
        Msg::Dropped(vec![file("notes.txt", "text/plain")]),
    );
    assert!(effects.is_empty());
    assert_eq!(state.document().notices().count(), 1);
    assert!(state.is_idle());
}
