//! NLP-specific error types

use thiserror::Error;

/// NLP-specific error types
#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("NLP backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Classifier artifact error: {0}")]
    ClassifierArtifact(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Entity extraction error: {0}")]
    EntityExtraction(String),
}

impl NlpError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    pub fn unsupported_language(msg: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(msg.into())
    }

    pub fn classifier_artifact(msg: impl Into<String>) -> Self {
        Self::ClassifierArtifact(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn entity_extraction(msg: impl Into<String>) -> Self {
        Self::EntityExtraction(msg.into())
    }
}

impl From<regex::Error> for NlpError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidPattern(err.to_string())
    }
}

/// Result type for NLP operations
pub type Result<T> = std::result::Result<T, NlpError>;
