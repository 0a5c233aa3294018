//! Full recipe plus step illustrations for a selected suggestion.

use serde::Serialize;

use crate::ai::prompts::render_step_image_prompt;
use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::types::{Detail, ImageRef, Suggestion};

use super::fan_out;

/// A recipe detail with one (possibly missing) illustration per step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedDetail {
    pub detail: Detail,
    /// Index-aligned with `detail.instructions`; `None` where generation failed.
    pub step_images: Vec<Option<ImageRef>>,
}

/// Fetch the recipe for `suggestion`, then illustrate each of its steps.
///
/// Only a failure to fetch the recipe itself fails the enrichment. Step image
/// failures are logged and leave `None` at that step's index.
pub async fn enrich_detail(
    client: &dyn GenerationClient,
    suggestion: &Suggestion,
    config: &PipelineConfig,
) -> Result<EnrichedDetail, GenerationError> {
    let detail = client.detail_for(&suggestion.name).await?;

    let prompts: Vec<String> = detail
        .instructions
        .iter()
        .map(|step| render_step_image_prompt(step))
        .collect();
    let width = config.fan_out_width(prompts.len());

    let results = fan_out(prompts, width, move |prompt| async move {
        client.image_for(&prompt).await
    })
    .await;

    let step_images = results
        .into_iter()
        .enumerate()
        .map(|(step, result)| match result {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(
                    recipe = %suggestion.name,
                    step,
                    error = %e,
                    "Step image generation failed"
                );
                None
            }
        })
        .collect();

    Ok(EnrichedDetail {
        detail,
        step_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeBackend;
    use crate::client::AiGenerationClient;

    fn client_with(backend: FakeBackend) -> AiGenerationClient {
        AiGenerationClient::new(Box::new(backend), &PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_every_step_illustrated() {
        let client = client_with(FakeBackend::with_recipe_responses());
        let suggestion = Suggestion::new("Cheesy Onion Omelette", "");

        let enriched = enrich_detail(&client, &suggestion, &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(enriched.detail.instructions.len(), 3);
        assert_eq!(enriched.step_images.len(), 3);
        assert!(enriched.step_images.iter().all(Option::is_some));
    }

    #[tokio::test]
    async fn test_failed_step_image_leaves_gap() {
        let client = client_with(
            FakeBackend::with_recipe_responses().fail_images_containing("beat the eggs"),
        );
        let suggestion = Suggestion::new("Cheesy Onion Omelette", "");

        let enriched = enrich_detail(&client, &suggestion, &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(enriched.step_images.len(), 3);
        assert!(enriched.step_images[0].is_some());
        assert!(enriched.step_images[1].is_none());
        assert!(enriched.step_images[2].is_some());
    }

    #[tokio::test]
    async fn test_detail_failure_propagates() {
        let client = client_with(FakeBackend::with_response(
            "recipe_detail",
            r#"{"instructions": []}"#,
        ));
        let suggestion = Suggestion::new("Moon Cheese Souffle", "");

        let err = enrich_detail(&client, &suggestion, &PipelineConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::NotFound(_)));
    }
}
