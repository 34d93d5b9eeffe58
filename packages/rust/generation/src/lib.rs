//! Capability boundary around a remote image+text-to-text generative model.
//!
//! The enrichment driver depends only on the [`GenerationClient`] trait;
//! [`GeminiClient`] is the production implementation over the Gemini REST
//! API. Failures are opaque [`FigforgeError::Generation`] values — the
//! client performs no retries and interprets nothing.

use async_trait::async_trait;

use figforge_shared::{ImageAttachment, Result};

mod gemini;

pub use gemini::{GeminiClient, GeminiClientConfig};

/// One element of a model request, in send order.
#[derive(Debug, Clone)]
pub enum ContentPart {
    /// Binary image data with its MIME type.
    Image { data: Vec<u8>, mime_type: String },
    /// A text segment (typically the compiled prompt).
    Text(String),
}

impl From<&ImageAttachment> for ContentPart {
    fn from(img: &ImageAttachment) -> Self {
        Self::Image {
            data: img.data.clone(),
            mime_type: img.mime_type.clone(),
        }
    }
}

/// A remote generative model: heterogeneous content parts in, text out.
///
/// Implementations must be safe for concurrent use; independent pipeline
/// runs may share one client. No determinism across calls is guaranteed.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send the parts to the model and return its generated text.
    async fn generate(&self, parts: &[ContentPart], model: &str) -> Result<String>;
}
