use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the bytes of a candidate file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file on disk (picker, drag-and-drop from the file manager).
    Path(PathBuf),
    /// Bytes already in memory (clipboard image data).
    Memory(Arc<[u8]>),
}

/// A file handle surfaced by an event source. Size and MIME type are as
/// reported by the source; nothing here has been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl FileRef {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    pub fn from_path(
        path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        Self {
            name,
            mime_type: mime_type.into(),
            size,
            source: FileSource::Path(path),
        }
    }

    /// Alt text for the final image node: the file name without extension.
    pub fn alt_text(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.trim().is_empty())
            .unwrap_or_else(|| self.name.clone())
    }
}
