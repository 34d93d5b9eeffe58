//! Core domain types shared across the figforge pipeline.

use serde::{Deserialize, Serialize};

/// A binary reference image sent alongside every model call.
///
/// Held constant across all enrichment iterations: the same screen
/// design renders the same pixels no matter which JSON chunk is being
/// processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g. `image/png`).
    pub mime_type: String,
}

impl ImageAttachment {
    /// Build an attachment, guessing the MIME type from a file extension.
    ///
    /// Unknown extensions fall back to `image/png`, matching what design
    /// tools export by default.
    pub fn from_bytes(data: Vec<u8>, extension: &str) -> Self {
        let mime_type = match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => "image/png",
        };
        Self {
            data,
            mime_type: mime_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(ImageAttachment::from_bytes(vec![], "png").mime_type, "image/png");
        assert_eq!(ImageAttachment::from_bytes(vec![], "JPG").mime_type, "image/jpeg");
        assert_eq!(ImageAttachment::from_bytes(vec![], "jpeg").mime_type, "image/jpeg");
        assert_eq!(ImageAttachment::from_bytes(vec![], "webp").mime_type, "image/webp");
        assert_eq!(ImageAttachment::from_bytes(vec![], "bin").mime_type, "image/png");
    }
}
