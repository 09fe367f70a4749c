use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContentLimits, UploadLimits};

pub const DEFAULT_NOTICE_DISMISS_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub upload: UploadLimits,
    pub content: ContentLimits,
    /// Lifetime of self-dismissing notices.
    pub notice_dismiss_ms: u64,
    /// Destination folder used when an event does not name one.
    pub default_folder: Option<String>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            upload: UploadLimits::default(),
            content: ContentLimits::default(),
            notice_dismiss_ms: DEFAULT_NOTICE_DISMISS_MS,
            default_folder: None,
        }
    }
}

impl EditorSettings {
    pub fn notice_dismiss_after(&self) -> Duration {
        Duration::from_millis(self.notice_dismiss_ms)
    }
}
