//! Configuration structures
//!
//! Every section has serde defaults so a partial file (or no file at all)
//! still yields a usable configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CREDENTIALS_FILE, DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_PATH,
    DEFAULT_TIMEOUT_SECS, KEYCHAIN_SERVICE_NAME,
};
use crate::errors::TokenlineError;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub credentials: CredentialConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the token refresh endpoint, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_path: default_refresh_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where the credential pair is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    Memory,
    #[default]
    File,
    Keychain,
}

impl FromStr for CredentialBackend {
    type Err = TokenlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "keychain" => Ok(Self::Keychain),
            other => {
                Err(TokenlineError::Config(format!("Unknown credential backend: {other}")))
            }
        }
    }
}

/// Credential store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default)]
    pub backend: CredentialBackend,
    /// File path for the `file` backend
    #[serde(default = "default_credentials_path")]
    pub path: String,
    /// Keychain service name for the `keychain` backend
    #[serde(default = "default_keychain_service")]
    pub service_name: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            path: default_credentials_path(),
            service_name: default_keychain_service(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_credentials_path() -> String {
    DEFAULT_CREDENTIALS_FILE.to_string()
}

fn default_keychain_service() -> String {
    KEYCHAIN_SERVICE_NAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.refresh_path, "/auth/refresh");
        assert_eq!(config.credentials.backend, CredentialBackend::File);
    }

    #[test]
    fn partial_section_keeps_remaining_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api": {"base_url": "http://localhost:8080"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Keychain".parse::<CredentialBackend>().unwrap(), CredentialBackend::Keychain);
        assert_eq!("memory".parse::<CredentialBackend>().unwrap(), CredentialBackend::Memory);
        assert!("vault".parse::<CredentialBackend>().is_err());
    }
}
