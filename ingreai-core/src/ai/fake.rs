//! Fake AI backend for testing and offline runs.
//!
//! This backend returns deterministic responses based on prompt matching,
//! allowing tests to run without network access or API costs.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb};

use super::client::{AiBackend, AiError};
use super::prompts::{
    DETAIL_PROMPT_NAME, SUGGEST_FROM_IMAGE_PROMPT_NAME, SUGGEST_FROM_TEXT_PROMPT_NAME,
};
use super::types::{GenerateRequest, GenerateResponse, GeneratedImage, Usage};

/// A fake backend for testing.
///
/// Text responses are matched by checking whether the prompt name or the prompt
/// contains a registered substring (case-insensitive, first registration wins).
/// Images are tiny solid-colour PNGs unless the prompt matches a failure pattern.
#[derive(Debug, Default)]
pub struct FakeBackend {
    /// Ordered (substring, response) pairs.
    responses: Vec<(String, String)>,
    /// Response if no pattern matches.
    default_response: Option<String>,
    /// Image prompts containing any of these fail.
    failing_images: Vec<String>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
}

impl FakeBackend {
    /// Create a new FakeBackend with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FakeBackend that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut backend = Self::new();
        backend.add_response(prompt_contains, response);
        backend
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.responses
            .push((prompt_contains.to_lowercase(), response.to_string()));
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Make image generation fail for prompts containing a substring.
    pub fn fail_images_containing(mut self, prompt_contains: &str) -> Self {
        self.failing_images.push(prompt_contains.to_lowercase());
        self
    }

    /// Number of text generations served so far.
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::Relaxed)
    }

    /// Number of image generations attempted so far.
    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::Relaxed)
    }

    /// Create a FakeBackend with a small canned recipe catalogue.
    pub fn with_recipe_responses() -> Self {
        let suggestions = r#"{"recipes": [
            {"name": "Cheesy Onion Omelette", "description": "Fluffy eggs folded around caramelised onion and melted cheese."},
            {"name": "Onion and Cheese Frittata", "description": "An oven-finished frittata, golden on top and tender inside."},
            {"name": "Savoury Egg Muffins", "description": "Grab-and-go muffins packed with onion and sharp cheddar."}
        ]}"#;

        let mut backend = Self::new();
        backend.add_response(SUGGEST_FROM_TEXT_PROMPT_NAME, suggestions);
        backend.add_response(SUGGEST_FROM_IMAGE_PROMPT_NAME, suggestions);
        backend.add_response(
            DETAIL_PROMPT_NAME,
            r#"{
                "ingredients": ["3 eggs", "1 small onion, sliced", "40g grated cheddar", "1 tbsp butter"],
                "instructions": [
                    "Melt the butter in a non-stick pan and soften the onion for 8 minutes.",
                    "Beat the eggs with a pinch of salt and pour over the onion.",
                    "Scatter the cheese over one half, fold and cook for another minute."
                ],
                "prepTime": "5 minutes",
                "cookTime": "12 minutes",
                "servings": "1"
            }"#,
        );
        backend
    }
}

/// Encode a 1x1 PNG whose colour is derived from the prompt.
fn placeholder_png(prompt: &str) -> Result<Vec<u8>, AiError> {
    let seed = prompt
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let [r, g, b, _] = seed.to_le_bytes();
    let pixel: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgb([r, g, b]));

    let mut data = Cursor::new(Vec::new());
    pixel
        .write_to(&mut data, ImageFormat::Png)
        .map_err(|e| AiError::RequestFailed(format!("FakeBackend: PNG encode failed: {}", e)))?;
    Ok(data.into_inner())
}

#[async_trait]
impl AiBackend for FakeBackend {
    async fn generate(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        self.text_calls.fetch_add(1, Ordering::Relaxed);

        let name_lower = prompt_name.to_lowercase();
        let prompt_lower = request.prompt.to_lowercase();
        let matched = self.responses.iter().find(|(pattern, _)| {
            name_lower.contains(pattern.as_str()) || prompt_lower.contains(pattern.as_str())
        });

        match matched.map(|(_, response)| response).or(self.default_response.as_ref()) {
            Some(response) => Ok(GenerateResponse {
                content: response.clone(),
                usage: Usage::default(),
            }),
            None => Err(AiError::RequestFailed(format!(
                "FakeBackend: No response configured for prompt (first 100 chars): {}",
                request.prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    async fn generate_image(
        &self,
        _prompt_name: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, AiError> {
        self.image_calls.fetch_add(1, Ordering::Relaxed);

        let prompt_lower = prompt.to_lowercase();
        if self
            .failing_images
            .iter()
            .any(|pattern| prompt_lower.contains(pattern.as_str()))
        {
            return Err(AiError::ApiError {
                status: 500,
                message: "FakeBackend: image generation failed".to_string(),
            });
        }

        Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            data: placeholder_png(prompt)?,
        })
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}
