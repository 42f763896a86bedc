//! Conversation error types

use thiserror::Error;
use unibot_core::CoreError;
use unibot_nlp::NlpError;

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("{0}")]
    Nlp(#[from] NlpError),

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for conversation operations
pub type Result<T> = std::result::Result<T, ConversationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let err: ConversationError = NlpError::validation("Query cannot be empty").into();
        assert_eq!(err.to_string(), "Validation error: Query cannot be empty");

        let err: ConversationError = CoreError::MissingColumns(vec!["Room".to_string()]).into();
        assert_eq!(
            err.to_string(),
            "Missing required columns in schedule data: Room"
        );
    }
}
