//! AI request and response types.

use serde::{Deserialize, Serialize};

/// Inline image attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Request for a text (or JSON) generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Optional image the prompt refers to.
    pub image: Option<ImageData>,
    /// If true, ask the model for a JSON response body.
    pub json_response: bool,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    /// Plain JSON-mode request for a prompt.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_response: true,
            ..Default::default()
        }
    }

    /// Attach an image to the request.
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a text generation.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated content.
    pub content: String,
    /// Token usage statistics.
    pub usage: Usage,
}

/// Raw bytes of a generated image.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}
