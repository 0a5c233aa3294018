//! Generative model backend used by the generation client.
//!
//! This module provides:
//! - `AiBackend` trait for abstracting model providers
//! - `GeminiBackend` talking to the Gemini API over HTTP
//! - `FakeBackend` for tests and offline runs
//! - Prompt templates for each generation task
//!
//! # Configuration
//!
//! Set these environment variables:
//!
//! - `INGREAI_PROVIDER` (optional): "gemini" (default) or "fake"
//! - `GEMINI_API_KEY` (required for gemini): Your Gemini API key
//! - `INGREAI_TEXT_MODEL` (optional): Text model, e.g., "gemini-2.5-flash"
//! - `INGREAI_IMAGE_MODEL` (optional): Image model, e.g., "imagen-3.0-generate-002"
//! - `INGREAI_AI_BASE_URL` (optional): API base URL
//!
//! # Example
//!
//! ```ignore
//! use ingreai_core::ai::{create_backend_from_env, GenerateRequest};
//!
//! let backend = create_backend_from_env()?;
//! let response = backend
//!     .generate("test", GenerateRequest::json("Suggest a soup"))
//!     .await?;
//! println!("Response: {}", response.content);
//! ```

mod client;
mod config;
mod fake;
mod gemini;
pub mod prompts;
mod types;

pub use client::{AiBackend, AiError};
pub use config::{AiConfig, ConfigError};
pub use fake::FakeBackend;
pub use gemini::GeminiBackend;
pub use types::{GenerateRequest, GenerateResponse, GeneratedImage, ImageData, Usage};

/// Create the backend selected by `INGREAI_PROVIDER`.
pub fn create_backend_from_env() -> Result<Box<dyn AiBackend>, AiError> {
    let provider = std::env::var("INGREAI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());

    match provider.as_str() {
        "gemini" => Ok(Box::new(GeminiBackend::from_env()?)),
        "fake" => Ok(Box::new(FakeBackend::with_recipe_responses())),
        other => Err(ConfigError::UnknownProvider(other.to_string()).into()),
    }
}
