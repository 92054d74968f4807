//! Application constants
//!
//! Credential keys, endpoint paths and client defaults.

// Credential store keys
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Transport retry policy (connection failures and 5xx only)

// Credential persistence
pub const DEFAULT_CREDENTIALS_FILE: &str = "tokenline-credentials.json";
pub const KEYCHAIN_SERVICE_NAME: &str = "Tokenline.api";

pub const BEARER_PREFIX: &str = "Bearer ";
pub const DEFAULT_LOG_LEVEL: &str = "info";
