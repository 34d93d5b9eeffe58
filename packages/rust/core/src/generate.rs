//! One-shot generation: produce the seed code artifact from the design
//! images and project context. Upstream of the enrichment loop.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, instrument};

use figforge_generation::{ContentPart, GenerationClient};
use figforge_shared::{FigforgeError, ImageAttachment, Result};

/// Compile the generate-template with the caller's static context and
/// send it with the design images. Returns the generated code.
///
/// Single call, no accumulated state; failures propagate as-is.
#[instrument(skip_all, fields(model = %model_id))]
pub async fn run_generation(
    client: &dyn GenerationClient,
    model_id: &str,
    reference_images: &[ImageAttachment],
    template: &str,
    context: &HashMap<String, String>,
    call_timeout: Duration,
) -> Result<String> {
    let prompt = figforge_prompt::compile(template, context)?;

    let mut parts: Vec<ContentPart> = reference_images.iter().map(ContentPart::from).collect();
    parts.push(ContentPart::Text(prompt));

    let code = match tokio::time::timeout(call_timeout, client.generate(&parts, model_id)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FigforgeError::Generation(format!(
                "generation call exceeded {call_timeout:?} timeout"
            )));
        }
    };

    info!(chars = code.len(), "seed code generated");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct OneShotClient {
        response: String,
        last_parts: Mutex<Option<(usize, String)>>,
    }

    #[async_trait]
    impl GenerationClient for OneShotClient {
        async fn generate(&self, parts: &[ContentPart], _model: &str) -> Result<String> {
            let images = parts
                .iter()
                .filter(|p| matches!(p, ContentPart::Image { .. }))
                .count();
            let text = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text(t) => Some(t.clone()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<String>();
            *self.last_parts.lock().unwrap() = Some((images, text));
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn generation_compiles_context_and_sends_images() {
        let client = OneShotClient {
            response: "seed artifact".into(),
            last_parts: Mutex::new(None),
        };
        let mut context = HashMap::new();
        context.insert("user_stories".into(), "As a user I want a form".into());

        let code = run_generation(
            &client,
            "test-model",
            &[ImageAttachment::from_bytes(vec![1], "png")],
            "stories: {user_stories}",
            &context,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert_eq!(code, "seed artifact");
        let (images, text) = client.last_parts.lock().unwrap().clone().unwrap();
        assert_eq!(images, 1);
        assert_eq!(text, "stories: As a user I want a form");
    }

    #[tokio::test]
    async fn missing_context_slot_fails_before_model_call() {
        let client = OneShotClient {
            response: "unused".into(),
            last_parts: Mutex::new(None),
        };

        let err = run_generation(
            &client,
            "test-model",
            &[],
            "{absent}",
            &HashMap::new(),
            Duration::from_secs(60),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FigforgeError::MissingSlot { .. }));
        assert!(client.last_parts.lock().unwrap().is_none());
    }
}
