//! API-specific error types
//!
//! Provides error classification for API operations. Errors are `Clone` so a
//! single refresh outcome can be handed to every request waiting on it.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tokenline_domain::TokenlineError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403 responses and refresh failures
    Authentication,
    /// 429 responses
    RateLimit,
    /// 5xx responses
    Server,
    /// Other 4xx responses, malformed requests or bodies
    Client,
    /// Connection failures and timeouts
    Network,
    /// Configuration or credential store problems
    Config,
}

/// API operation errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{url} returned status {status}{}", format_body(.body))]
    Status { status: StatusCode, url: String, body: String },

    #[error("Token refresh failed: {0}")]
    Refresh(Box<ApiError>),

    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiErrorCategory::Authentication
                }
                StatusCode::TOO_MANY_REQUESTS => ApiErrorCategory::RateLimit,
                s if s.is_server_error() => ApiErrorCategory::Server,
                s if s.is_client_error() => ApiErrorCategory::Client,
                _ => ApiErrorCategory::Network,
            },
            Self::Refresh(_) | Self::MissingRefreshToken => ApiErrorCategory::Authentication,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) | Self::Request(_) => ApiErrorCategory::Client,
            Self::Store(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// HTTP status of the failed response, if the failure was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` only for a 401 response; this is what triggers a refresh
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<TokenlineError> for ApiError {
    fn from(err: TokenlineError) -> Self {
        match err {
            TokenlineError::Network(message) => Self::Network(message),
            TokenlineError::Storage(message) => Self::Store(message),
            TokenlineError::Config(message) => Self::Config(message),
            TokenlineError::Auth(message)
            | TokenlineError::NotFound(message)
            | TokenlineError::InvalidInput(message)
            | TokenlineError::Internal(message) => Self::Request(message),
        }
    }
}
