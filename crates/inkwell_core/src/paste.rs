use scraper::{Html, Selector};

use crate::validate::{validate_file, Rejection, Screening, UploadLimits};
use crate::FileRef;

pub const HTML_IMAGE_GUIDANCE: &str = "Images inside pasted web content are not uploaded. \
Save the image and paste or drop the file itself.";

/// One entry of the clipboard's item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime_type: String,
    /// `None` when the item could not be extracted as a file.
    pub file: Option<FileRef>,
}

impl ClipboardItem {
    pub fn file(file: FileRef) -> Self {
        Self {
            mime_type: file.mime_type.clone(),
            file: Some(file),
        }
    }

    pub fn unreadable(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            file: None,
        }
    }

    fn is_image(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardPayload {
    pub items: Vec<ClipboardItem>,
    pub html: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// No image data: default text handling.
    PassThrough { text: Option<String> },
    /// HTML with `<img>` elements; only the plain text is kept.
    HtmlImagesRejected { fallback_text: Option<String> },
    /// Image items were intercepted and validated.
    Images(Screening),
}

pub fn classify_paste(payload: &ClipboardPayload, limits: &UploadLimits) -> PasteOutcome {
    let image_items: Vec<(usize, &ClipboardItem)> = payload
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_image())
        .collect();

    if !image_items.is_empty() {
        let mut screening = Screening::default();
        for (index, item) in image_items {
            match &item.file {
                None => screening.reject(
                    format!("clipboard item {}", index + 1),
                    Rejection::Unreadable,
                ),
                Some(file) => match validate_file(file, limits) {
                    Ok(()) => screening.accept(file.clone()),
                    Err(reason) => screening.reject(file.name.clone(), reason),
                },
            }
        }
        return PasteOutcome::Images(screening);
    }

    let text = payload
        .text
        .as_ref()
        .filter(|text| !text.trim().is_empty())
        .cloned();

    match payload.html.as_deref() {
        Some(html) if html_contains_images(html) => PasteOutcome::HtmlImagesRejected {
            fallback_text: text,
        },
        _ => PasteOutcome::PassThrough { text },
    }
}

fn html_contains_images(html: &str) -> bool {
    let fragment = Html::parse_fragment(html);
    Selector::parse("img")
        .ok()
        .map(|sel| fragment.select(&sel).next().is_some())
        .unwrap_or(false)
}
