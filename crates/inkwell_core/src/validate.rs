use serde::{Deserialize, Serialize};

use crate::FileRef;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_ALLOWED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    /// Compares the MIME essence (parameters after `;` are ignored).
    pub fn allows_mime(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

/// Why a candidate file will not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("could not be read as a file")]
    Unreadable,
    #[error("file is too large ({})", size_against_limit(.size, .max))]
    TooLarge { size: u64, max: u64 },
    #[error("unsupported file type {mime} (use JPEG, PNG, GIF or WebP)")]
    UnsupportedType { mime: String },
}

/// Single validator shared by the paste, drag preview, drop and picker paths.
///
/// Checks run in a fixed order so the reported constraint is deterministic
/// when a file violates several: size first, then MIME type.
pub fn validate_file(file: &FileRef, limits: &UploadLimits) -> Result<(), Rejection> {
    if file.size > limits.max_bytes {
        return Err(Rejection::TooLarge {
            size: file.size,
            max: limits.max_bytes,
        });
    }
    if !limits.allows_mime(&file.mime_type) {
        let mime = if file.mime_type.trim().is_empty() {
            "unknown".to_string()
        } else {
            file.mime_type.clone()
        };
        return Err(Rejection::UnsupportedType { mime });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: Rejection,
}

impl RejectedFile {
    pub fn describe(&self) -> String {
        format!("{}: {}", self.name, self.reason)
    }
}

/// Result of validating one batch of candidates, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screening {
    pub accepted: Vec<FileRef>,
    pub rejected: Vec<RejectedFile>,
}

impl Screening {
    pub fn accept(&mut self, file: FileRef) {
        self.accepted.push(file);
    }

    pub fn reject(&mut self, name: impl Into<String>, reason: Rejection) {
        self.rejected.push(RejectedFile {
            name: name.into(),
            reason,
        });
    }

    /// All rejection reasons of the batch folded into one notice message.
    pub fn combined_message(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let reasons: Vec<String> = self.rejected.iter().map(RejectedFile::describe).collect();
        Some(format!(
            "{} file(s) skipped: {}",
            self.rejected.len(),
            reasons.join("; ")
        ))
    }
}

pub fn screen_files(files: impl IntoIterator<Item = FileRef>, limits: &UploadLimits) -> Screening {
    let mut screening = Screening::default();
    for file in files {
        match validate_file(&file, limits) {
            Ok(()) => screening.accept(file),
            Err(reason) => screening.reject(file.name.clone(), reason),
        }
    }
    screening
}

/// Falls back to exact byte counts when rounding would make the size read
/// the same as the limit.
fn size_against_limit(size: &u64, max: &u64) -> String {
    let (shown, limit) = (human_size(size), human_size(max));
    if shown == limit {
        format!("{size} bytes, limit {max} bytes")
    } else {
        format!("{shown}, limit {limit}")
    }
}

fn human_size(bytes: &u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let value = *bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::{human_size, size_against_limit, UploadLimits};

    #[test]
    fn mime_parameters_are_ignored() {
        let limits = UploadLimits::default();
        assert!(limits.allows_mime("image/PNG"));
        assert!(limits.allows_mime("image/jpeg; q=0.9"));
        assert!(!limits.allows_mime("image/svg+xml"));
    }

    #[test]
    fn sizes_render_in_readable_units() {
        assert_eq!(human_size(&512), "512 B");
        assert_eq!(human_size(&2048), "2.0 KB");
        assert_eq!(human_size(&(12 * 1024 * 1024)), "12.0 MB");
    }

    #[test]
    fn near_limit_sizes_are_shown_in_bytes() {
        let limit = 10 * 1024 * 1024;
        assert_eq!(
            size_against_limit(&(limit + 1), &limit),
            "10485761 bytes, limit 10485760 bytes"
        );
        assert_eq!(
            size_against_limit(&(12 * 1024 * 1024), &limit),
            "12.0 MB, limit 10.0 MB"
        );
    }
}
