use std::fs;
use std::io;
use std::path::Path;

use editor_logging::editor_warn;
use inkwell_core::{ClipboardItem, ClipboardPayload, FileRef};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Content-sniffed MIME type; the file name extension is never trusted.
fn sniff_mime(path: &Path) -> io::Result<String> {
    Ok(infer::get_from_path(path)?
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string()))
}

/// A local file as the file manager would hand it to a drop or picker.
pub(crate) fn file_on_disk(path: &Path) -> io::Result<FileRef> {
    let size = fs::metadata(path)?.len();
    let mime = sniff_mime(path)?;
    Ok(FileRef::from_path(path, mime, size))
}

/// Clipboard image data lives in memory, so the bytes are read up front.
/// A file that cannot be read becomes an unreadable image item.
pub(crate) fn clipboard_item(path: &Path) -> ClipboardItem {
    let read = fs::read(path).and_then(|bytes| {
        let mime = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(FileRef::from_bytes(name, mime, bytes))
    });
    match read {
        Ok(file) => ClipboardItem::file(file),
        Err(err) => {
            editor_warn!("Clipboard item {:?} unreadable: {}", path, err);
            ClipboardItem::unreadable("image/*")
        }
    }
}

pub(crate) fn clipboard_payload(
    images: &[impl AsRef<Path>],
    html: Option<String>,
    text: Option<String>,
) -> ClipboardPayload {
    ClipboardPayload {
        items: images
            .iter()
            .map(|path| clipboard_item(path.as_ref()))
            .collect(),
        html,
        text,
    }
}
