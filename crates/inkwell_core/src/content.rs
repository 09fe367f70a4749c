use serde::{Deserialize, Serialize};

use crate::Document;

pub const DEFAULT_MAX_CONTENT_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_CONTENT_IMAGES: usize = 20;

/// Ceilings applied before canonical content is handed to the persistence
/// callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLimits {
    pub max_bytes: usize,
    pub max_images: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_CONTENT_BYTES,
            max_images: DEFAULT_MAX_CONTENT_IMAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentRejection {
    #[error("content is {size} bytes, over the {max} byte limit")]
    TooLarge { size: usize, max: usize },
    #[error("content embeds {count} images, over the limit of {max}")]
    TooManyImages { count: usize, max: usize },
}

/// Serialises the canonical content and checks it against `limits`.
pub fn check_content(doc: &Document, limits: &ContentLimits) -> Result<String, ContentRejection> {
    let html = doc.to_canonical_html();
    if html.len() > limits.max_bytes {
        return Err(ContentRejection::TooLarge {
            size: html.len(),
            max: limits.max_bytes,
        });
    }
    let count = doc.images().count();
    if count > limits.max_images {
        return Err(ContentRejection::TooManyImages {
            count,
            max: limits.max_images,
        });
    }
    Ok(html)
}
