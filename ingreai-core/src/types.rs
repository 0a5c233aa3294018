//! Recipe data shared between the generation client, enrichers and pipeline.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Reference to a generated image.
///
/// Always a `data:<mime>;base64,<payload>` URL, which is what the
/// presentation layer can render without a second fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Build a data URL from raw image bytes.
    pub fn from_bytes(mime_type: &str, data: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime_type, STANDARD.encode(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type from the data URL header (e.g. "image/png").
    pub fn mime_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .unwrap_or("application/octet-stream")
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self
            .0
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or_default();
        STANDARD.decode(payload)
    }
}

/// A lightweight recipe candidate returned by the discovery phase.
///
/// Suggestions carry no id: a suggestion is identified by its position in
/// the list produced by one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub name: String,
    #[serde(rename = "shortDescription", alias = "description")]
    pub description: String,
    #[serde(default, alias = "cover_image", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageRef>,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cover_image: None,
        }
    }
}

/// Full instructions and metadata for one selected suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Ordered preparation steps.
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, alias = "prepTime", skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, alias = "cookTime", skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    /// Any other structured fields the backend returned.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
