//! AI configuration from environment variables.

use std::env;
use thiserror::Error;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for suggestions and recipe details.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for cover and step images.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// Gemini backend configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the Gemini API.
    pub api_key: String,
    /// Model used for text/JSON generation (e.g., "gemini-2.5-flash").
    pub text_model: String,
    /// Model used for image generation (e.g., "imagen-3.0-generate-002").
    pub image_model: String,
    /// Base URL for the API.
    pub base_url: String,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `GEMINI_API_KEY`: API key
    ///
    /// Optional:
    /// - `INGREAI_TEXT_MODEL`: Text model (default: "gemini-2.5-flash")
    /// - `INGREAI_IMAGE_MODEL`: Image model (default: "imagen-3.0-generate-002")
    /// - `INGREAI_AI_BASE_URL`: API base URL
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let text_model =
            env::var("INGREAI_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string());

        let image_model =
            env::var("INGREAI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());

        let base_url =
            env::var("INGREAI_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key)
            .with_text_model(text_model)
            .with_image_model(image_model)
            .with_base_url(base_url))
    }

    /// Configuration with default models and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}
