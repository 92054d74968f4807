//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Tokenline
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TokenlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Tokenline operations
pub type Result<T> = std::result::Result<T, TokenlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = TokenlineError::Storage("disk full".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "Storage");
        assert_eq!(json["message"], "disk full");
    }

    #[test]
    fn display_includes_category() {
        let err = TokenlineError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}
