//! Core error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or schedule data.
///
/// All of these are fatal at startup: nothing in the workspace tries to run
/// on a partially loaded dataset.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Schedule file not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing required columns in schedule data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to parse schedule data: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = CoreError::MissingColumns(vec!["Room".to_string(), "Exam Time".to_string()]);
        assert_eq!(
            err.to_string(),
            "Missing required columns in schedule data: Room, Exam Time"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = CoreError::NotFound(PathBuf::from("data/schedule.json"));
        assert!(err.to_string().contains("data/schedule.json"));
    }
}
