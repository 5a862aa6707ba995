//! Error types for narrative generation

use brief_core::BriefError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NarrativeError>;

/// Errors that can occur while producing a narrative
#[derive(Error, Debug)]
pub enum NarrativeError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<NarrativeError> for BriefError {
    fn from(err: NarrativeError) -> Self {
        match err {
            NarrativeError::ConfigurationError(msg) => BriefError::Config(msg),
            other => BriefError::Narrative(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_brief_error() {
        let err: BriefError = NarrativeError::RequestFailed("HTTP 502".to_string()).into();
        assert_eq!(err.to_string(), "Narrative error: API request failed: HTTP 502");

        let err: BriefError =
            NarrativeError::ConfigurationError("OPENAI_API_KEY not set".to_string()).into();
        assert!(matches!(err, BriefError::Config(_)));
    }
}
