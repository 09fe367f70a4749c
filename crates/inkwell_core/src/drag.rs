use crate::validate::{validate_file, UploadLimits};
use crate::FileRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayVerdict {
    /// Entered, no dragover seen yet.
    Pending,
    AllValid,
    SomeInvalid,
    AllInvalid,
}

/// Top-level drop overlay shown while files are dragged over the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOverlay {
    pub verdict: OverlayVerdict,
    pub valid: usize,
    pub skipped: usize,
}

impl DropOverlay {
    fn pending() -> Self {
        Self {
            verdict: OverlayVerdict::Pending,
            valid: 0,
            skipped: 0,
        }
    }

    pub fn valid_label(&self) -> String {
        format!("{} valid file(s)", self.valid)
    }

    pub fn skipped_label(&self) -> Option<String> {
        (self.skipped > 0).then(|| format!("{} file(s) will be skipped", self.skipped))
    }
}

/// Enter/leave bookkeeping for the drop overlay.
///
/// Enter and leave fire for every child element the pointer crosses, so a
/// depth counter decides when the overlay appears (0 → 1) and disappears
/// (1 → 0).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DragTracker {
    depth: u32,
    overlay: Option<DropOverlay>,
}

impl DragTracker {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn overlay(&self) -> Option<&DropOverlay> {
        self.overlay.as_ref()
    }

    /// Returns `true` when this enter created the overlay.
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth == 1 {
            self.overlay = Some(DropOverlay::pending());
            true
        } else {
            false
        }
    }

    /// Speculative validation of the hovered files; recolors the overlay.
    /// Returns `true` when the overlay changed.
    pub fn over(&mut self, files: &[FileRef], limits: &UploadLimits) -> bool {
        let Some(overlay) = self.overlay.as_mut() else {
            return false;
        };
        let valid = files
            .iter()
            .filter(|file| validate_file(file, limits).is_ok())
            .count();
        let skipped = files.len() - valid;
        let verdict = if skipped == 0 && valid > 0 {
            OverlayVerdict::AllValid
        } else if valid == 0 {
            OverlayVerdict::AllInvalid
        } else {
            OverlayVerdict::SomeInvalid
        };
        let next = DropOverlay {
            verdict,
            valid,
            skipped,
        };
        if *overlay == next {
            return false;
        }
        *overlay = next;
        true
    }

    /// Returns `true` when this leave removed the overlay.
    pub fn leave(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.overlay = None;
            true
        } else {
            false
        }
    }

    /// Drop ends the gesture regardless of how many enters are outstanding.
    pub fn reset(&mut self) -> bool {
        let had_overlay = self.overlay.is_some();
        self.depth = 0;
        self.overlay = None;
        had_overlay
    }
}
