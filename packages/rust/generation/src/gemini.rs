//! Gemini REST implementation of [`GenerationClient`].

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use figforge_shared::{FigforgeError, Result};

use crate::{ContentPart, GenerationClient};

/// Default API endpoint root.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Constructor-injected configuration for [`GeminiClient`].
///
/// All state the client needs is passed in here — there are no
/// process-wide singletons or ambient credentials.
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// API key, resolved by the caller (typically from an env var).
    pub api_key: String,
    /// Endpoint root; override for proxies or tests.
    pub base_url: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl GeminiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("figforge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FigforgeError::Generation(format!("client build: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, parts: &[ContentPart], model: &str) -> Result<String> {
        let url = format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );

        let body = GenerateContentRequest::from_parts(parts);

        tracing::debug!(model, parts = parts.len(), "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FigforgeError::Generation(format!("request timed out: {e}"))
                } else {
                    FigforgeError::Generation(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FigforgeError::Generation(format!(
                "HTTP {status}: {}",
                detail.chars().take(500).collect::<String>()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| FigforgeError::Generation(format!("malformed response: {e}")))?;

        parsed.text().ok_or_else(|| {
            FigforgeError::Generation("response contained no generated text".into())
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types (generateContent request/response subset)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn from_parts(parts: &[ContentPart]) -> Self {
        let parts = parts
            .iter()
            .map(|part| match part {
                ContentPart::Image { data, mime_type } => Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.clone(),
                        data: BASE64.encode(data),
                    }),
                },
                ContentPart::Text(text) => Part {
                    text: Some(text.clone()),
                    inline_data: None,
                },
            })
            .collect();

        Self {
            contents: vec![Content { parts }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` if the model
    /// returned nothing usable (safety block, empty candidate list).
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
