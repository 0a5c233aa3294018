//! Gemini (Google Generative Language API) backend.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::client::{AiBackend, AiError};
use super::config::AiConfig;
use super::types::{GenerateRequest, GenerateResponse, GeneratedImage, Usage};

/// Gemini API backend: `generateContent` for text, Imagen `predict` for images.
pub struct GeminiBackend {
    config: AiConfig,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new client with the given configuration.
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, AiError> {
        Ok(Self::new(AiConfig::from_env()?))
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, method)
    }

    /// POST a JSON body and return the raw response text, mapping HTTP failures.
    async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<String, AiError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(AiError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(api_error(status, text));
        }

        Ok(text)
    }
}

/// Build an `ApiError`, preferring the message from Google's error envelope.
fn api_error(status: u16, body: String) -> AiError {
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    AiError::ApiError { status, message }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentRequest {
    fn from_request(request: GenerateRequest) -> Self {
        let mut parts = vec![Part {
            text: Some(request.prompt),
            inline_data: None,
        }];

        if let Some(image) = request.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type,
                    data: STANDARD.encode(&image.data),
                }),
            });
        }

        let generation_config = (request.json_response || request.temperature.is_some())
            .then(|| GenerationConfig {
                response_mime_type: request
                    .json_response
                    .then(|| "application/json".to_string()),
                temperature: request.temperature,
            });

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config,
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<GenerateResponse, AiError> {
    let usage = response
        .usage_metadata
        .map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    let content: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(AiError::NoContent);
    }

    Ok(GenerateResponse { content, usage })
}

fn extract_image(response: PredictResponse) -> Result<GeneratedImage, AiError> {
    let prediction = response
        .predictions
        .into_iter()
        .find(|p| p.bytes_base64_encoded.is_some())
        .ok_or(AiError::NoContent)?;

    let encoded = prediction.bytes_base64_encoded.unwrap_or_default();
    let data = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| AiError::ParseError(format!("Invalid image payload: {}", e)))?;

    Ok(GeneratedImage {
        mime_type: prediction
            .mime_type
            .unwrap_or_else(|| "image/png".to_string()),
        data,
    })
}

#[async_trait]
impl AiBackend for GeminiBackend {
    async fn generate(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        tracing::debug!(
            prompt_name = prompt_name,
            model = %self.config.text_model,
            has_image = request.image.is_some(),
            "Calling Gemini generateContent"
        );

        let url = self.model_url(&self.config.text_model, "generateContent");
        let body = self
            .post(&url, &GenerateContentRequest::from_request(request))
            .await?;

        let response: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| AiError::ParseError(e.to_string()))?;

        extract_text(response)
    }

    async fn generate_image(
        &self,
        prompt_name: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, AiError> {
        tracing::debug!(
            prompt_name = prompt_name,
            model = %self.config.image_model,
            "Calling Imagen predict"
        );

        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "4:3".to_string(),
            },
        };

        let url = self.model_url(&self.config.image_model, "predict");
        let body = self.post(&url, &request).await?;

        let response: PredictResponse =
            serde_json::from_str(&body).map_err(|e| AiError::ParseError(e.to_string()))?;

        extract_image(response)
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}
