use std::time::Duration;

use thiserror::Error;

use crate::ai::AiError;

/// Failure of a single generation call.
///
/// `InvalidInput` is raised before anything leaves the process; every other
/// variant means the backend call itself failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// True for every failure that came from (or while waiting on) the backend.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, GenerationError::InvalidInput(_))
    }
}

impl From<AiError> for GenerationError {
    fn from(err: AiError) -> Self {
        GenerationError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(!GenerationError::InvalidInput("blank".to_string()).is_upstream());
        assert!(GenerationError::NotFound("soup".to_string()).is_upstream());
        assert!(GenerationError::Upstream("503".to_string()).is_upstream());
        assert!(GenerationError::Timeout(Duration::from_secs(1)).is_upstream());
    }

    #[test]
    fn test_ai_error_becomes_upstream() {
        let err: GenerationError = AiError::ApiError {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(
            err,
            GenerationError::Upstream("API returned error: 500 - boom".to_string())
        );
    }
}
