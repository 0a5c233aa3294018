//! Cover images for freshly discovered suggestions.

use crate::ai::prompts::render_cover_image_prompt;
use crate::client::GenerationClient;
use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::types::{ImageRef, Suggestion};

use super::fan_out;

/// Attach a generated cover image to every suggestion.
///
/// One image request per suggestion, all in flight together (up to the
/// configured width). If any request fails the whole enrichment fails with
/// the first failure by position, so a result list never mixes suggestions
/// with and without covers.
pub async fn enrich_cover_images(
    client: &dyn GenerationClient,
    suggestions: Vec<Suggestion>,
    config: &PipelineConfig,
) -> Result<Vec<Suggestion>, GenerationError> {
    let prompts: Vec<String> = suggestions
        .iter()
        .map(|suggestion| render_cover_image_prompt(&suggestion.name))
        .collect();
    let width = config.fan_out_width(prompts.len());

    let results = fan_out(prompts, width, move |prompt| async move {
        client.image_for(&prompt).await
    })
    .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        tracing::warn!(
            failed,
            total = results.len(),
            "Cover image generation failed, discarding suggestions"
        );
    }

    let covers = results
        .into_iter()
        .collect::<Result<Vec<ImageRef>, GenerationError>>()?;

    Ok(suggestions
        .into_iter()
        .zip(covers)
        .map(|(mut suggestion, cover)| {
            suggestion.cover_image = Some(cover);
            suggestion
        })
        .collect())
}
