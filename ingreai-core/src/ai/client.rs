//! Backend trait for the generative model service.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{GenerateRequest, GenerateResponse, GeneratedImage};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Response contained no content")]
    NoContent,

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for generative model backends.
///
/// Implementations are stateless apart from configuration and safe to share
/// across concurrent requests. The `prompt_name` identifies which template
/// produced the prompt and is used for logging and fake matching.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Generate text (or JSON, if requested) for a prompt.
    async fn generate(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError>;

    /// Generate a single image for a prompt.
    async fn generate_image(
        &self,
        prompt_name: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, AiError>;

    /// Backend name (e.g., "gemini", "fake").
    fn backend_name(&self) -> &'static str;
}
