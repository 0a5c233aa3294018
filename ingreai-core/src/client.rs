//! Typed façade over the four generation operations the pipeline depends on.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ai::prompts::{
    render_detail_prompt, render_suggest_from_image_prompt, render_suggest_from_text_prompt,
    DETAIL_PROMPT_NAME, IMAGE_PROMPT_NAME, SUGGEST_FROM_IMAGE_PROMPT_NAME,
    SUGGEST_FROM_TEXT_PROMPT_NAME,
};
use crate::ai::{AiBackend, AiError, GenerateRequest, ImageData};
use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::image::validate_image;
use crate::types::{Detail, ImageRef, Suggestion};

/// The generation operations used by the enrichers and the pipeline.
///
/// Each call is one logical request to the backend. Implementations never
/// retry and never recover: every failure is returned to the caller as-is.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Suggest recipes for a free-text ingredient list.
    async fn suggest_from_text(&self, ingredients: &str)
        -> Result<Vec<Suggestion>, GenerationError>;

    /// Suggest recipes for a photo of ingredients.
    async fn suggest_from_image(&self, image: &[u8]) -> Result<Vec<Suggestion>, GenerationError>;

    /// Fetch the full recipe for a suggestion name.
    async fn detail_for(&self, name: &str) -> Result<Detail, GenerationError>;

    /// Generate one image for a prompt.
    async fn image_for(&self, prompt: &str) -> Result<ImageRef, GenerationError>;
}

/// Reject ingredient text that is blank after trimming.
pub fn validate_ingredients(ingredients: &str) -> Result<&str, GenerationError> {
    let trimmed = ingredients.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::InvalidInput(
            "Ingredient list is empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Reject an empty ingredient photo. Anything else is left to the backend.
pub fn validate_photo(image: &[u8]) -> Result<&[u8], GenerationError> {
    if image.is_empty() {
        return Err(GenerationError::InvalidInput("Image is empty".to_string()));
    }
    Ok(image)
}

/// Classify a photo before upload. Bytes that can't be classified fail the
/// call the same way a backend decode failure would.
fn classify_photo(image: &[u8]) -> Result<&'static str, GenerationError> {
    validate_image(image)
        .map_err(|reason| GenerationError::Upstream(format!("Unreadable photo: {}", reason)))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestionsPayload {
    Wrapped { recipes: Vec<SuggestionPayload> },
    Bare(Vec<SuggestionPayload>),
}

#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    name: String,
    #[serde(default, alias = "shortDescription")]
    description: String,
}

/// Strip a Markdown code fence some models wrap around JSON output.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_suggestions(content: &str) -> Result<Vec<Suggestion>, GenerationError> {
    let payload: SuggestionsPayload = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| {
            GenerationError::from(AiError::ParseError(format!(
                "Failed to parse suggestions: {}",
                e
            )))
        })?;

    let items = match payload {
        SuggestionsPayload::Wrapped { recipes } => recipes,
        SuggestionsPayload::Bare(recipes) => recipes,
    };

    Ok(items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .map(|item| Suggestion::new(item.name.trim(), item.description.trim()))
        .collect())
}

fn parse_detail(name: &str, content: &str) -> Result<Detail, GenerationError> {
    let mut detail: Detail = serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        GenerationError::from(AiError::ParseError(format!(
            "Failed to parse recipe detail: {}",
            e
        )))
    })?;

    detail.instructions = detail
        .instructions
        .into_iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();

    if detail.instructions.is_empty() {
        return Err(GenerationError::NotFound(format!(
            "No instructions available for {}",
            name
        )));
    }

    Ok(detail)
}

/// Production generation client: prompt templates over an `AiBackend`.
pub struct AiGenerationClient {
    backend: Box<dyn AiBackend>,
    request_timeout: Option<Duration>,
}

impl AiGenerationClient {
    pub fn new(backend: Box<dyn AiBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            request_timeout: config.request_timeout,
        }
    }

    /// Await a backend call, bounded by the configured timeout.
    async fn bounded<T: Send>(
        &self,
        call: impl Future<Output = Result<T, AiError>> + Send,
    ) -> Result<T, GenerationError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GenerationError::Timeout(limit))?
                .map_err(GenerationError::from),
            None => call.await.map_err(GenerationError::from),
        }
    }
}

#[async_trait]
impl GenerationClient for AiGenerationClient {
    async fn suggest_from_text(
        &self,
        ingredients: &str,
    ) -> Result<Vec<Suggestion>, GenerationError> {
        let ingredients = validate_ingredients(ingredients)?;
        let request = GenerateRequest {
            temperature: Some(0.8),
            ..GenerateRequest::json(render_suggest_from_text_prompt(ingredients))
        };

        let response = self
            .bounded(self.backend.generate(SUGGEST_FROM_TEXT_PROMPT_NAME, request))
            .await?;

        parse_suggestions(&response.content)
    }

    async fn suggest_from_image(&self, image: &[u8]) -> Result<Vec<Suggestion>, GenerationError> {
        let image = validate_photo(image)?;
        let mime_type = classify_photo(image)?;
        let request = GenerateRequest {
            temperature: Some(0.8),
            ..GenerateRequest::json(render_suggest_from_image_prompt())
        }
        .with_image(ImageData::new(mime_type, image.to_vec()));

        let response = self
            .bounded(self.backend.generate(SUGGEST_FROM_IMAGE_PROMPT_NAME, request))
            .await?;

        parse_suggestions(&response.content)
    }

    async fn detail_for(&self, name: &str) -> Result<Detail, GenerationError> {
        if name.trim().is_empty() {
            return Err(GenerationError::InvalidInput(
                "Recipe name is empty".to_string(),
            ));
        }

        let request = GenerateRequest {
            temperature: Some(0.4),
            ..GenerateRequest::json(render_detail_prompt(name))
        };

        let response = self
            .bounded(self.backend.generate(DETAIL_PROMPT_NAME, request))
            .await?;

        parse_detail(name, &response.content)
    }

    async fn image_for(&self, prompt: &str) -> Result<ImageRef, GenerationError> {
        let image = self
            .bounded(self.backend.generate_image(IMAGE_PROMPT_NAME, prompt))
            .await?;

        Ok(ImageRef::from_bytes(&image.mime_type, &image.data))
    }
}
