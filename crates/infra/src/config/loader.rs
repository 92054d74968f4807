//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `TOKENLINE_API_BASE_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. If no file exists either, uses the built-in defaults
//!
//! ## Environment Variables
//! - `TOKENLINE_API_BASE_URL`: API base URL (required for env loading)
//! - `TOKENLINE_REFRESH_PATH`: Refresh endpoint path
//! - `TOKENLINE_API_TIMEOUT_SECS`: Per-call timeout in seconds
//! - `TOKENLINE_CREDENTIALS_BACKEND`: `memory`, `file` or `keychain`
//! - `TOKENLINE_CREDENTIALS_PATH`: Credential file for the `file` backend
//! - `TOKENLINE_KEYCHAIN_SERVICE`: Service name for the `keychain` backend
//! - `TOKENLINE_LOG_LEVEL`: Default log filter
//! - `TOKENLINE_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./tokenline.json` or `./tokenline.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use tokenline_domain::{
    ApiConfig, Config, CredentialBackend, CredentialConfig, LoggingConfig, Result,
    TokenlineError,
};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TokenlineError::Config` if an environment value or a found file
/// is invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No configuration file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// `TOKENLINE_API_BASE_URL` must be set; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `TokenlineError::Config` if the base URL is missing or a value
/// does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let base_url = env_var("TOKENLINE_API_BASE_URL")?;
    let refresh_path =
        std::env::var("TOKENLINE_REFRESH_PATH").unwrap_or(defaults.api.refresh_path);
    let timeout_secs =
        env_parse("TOKENLINE_API_TIMEOUT_SECS", defaults.api.timeout_secs, "timeout")?;

    let backend = match std::env::var("TOKENLINE_CREDENTIALS_BACKEND") {
        Ok(value) => value.parse::<CredentialBackend>()?,
        Err(_) => defaults.credentials.backend,
    };
    let path = std::env::var("TOKENLINE_CREDENTIALS_PATH").unwrap_or(defaults.credentials.path);
    let service_name =
        std::env::var("TOKENLINE_KEYCHAIN_SERVICE").unwrap_or(defaults.credentials.service_name);

    let level = std::env::var("TOKENLINE_LOG_LEVEL").unwrap_or(defaults.logging.level);
    let json = env_bool("TOKENLINE_LOG_JSON", defaults.logging.json);

    Ok(Config {
        api: ApiConfig { base_url, refresh_path, timeout_secs },
        credentials: CredentialConfig { backend, path, service_name },
        logging: LoggingConfig { level, json },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TokenlineError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TokenlineError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TokenlineError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TokenlineError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TokenlineError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TokenlineError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(TokenlineError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("tokenline.json"),
        dir.join("tokenline.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TokenlineError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, falling back to `default`
fn env_parse<T>(key: &str, default: T, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| TokenlineError::Config(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_by_extension() {
        let config = parse_config(
            "[api]\nbase_url = \"http://localhost:9000\"\n",
            Path::new("tokenline.toml"),
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.refresh_path, "/auth/refresh");
    }

    #[test]
    fn rejects_unknown_extension() {
        let result = parse_config("", Path::new("tokenline.yaml"));
        assert!(matches!(result, Err(TokenlineError::Config(_))));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let result = load_from_file(Some(PathBuf::from("/definitely/not/here.json")));
        assert!(matches!(result, Err(TokenlineError::Config(_))));
    }
}
