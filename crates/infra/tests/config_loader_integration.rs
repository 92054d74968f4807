//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and the
//! environment.

use std::io::Write;

use tempfile::TempDir;
use tokenline_domain::{CredentialBackend, TokenlineError};
use tokenline_infra::config;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    file.write_all(contents.as_bytes()).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "tokenline.json",
        r#"{
            "api": {
                "base_url": "https://api.test.local",
                "refresh_path": "/v2/auth/refresh",
                "timeout_secs": 12
            },
            "credentials": {
                "backend": "memory"
            },
            "logging": {
                "level": "debug",
                "json": true
            }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("JSON config should load");

    assert_eq!(config.api.base_url, "https://api.test.local");
    assert_eq!(config.api.refresh_path, "/v2/auth/refresh");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.credentials.backend, CredentialBackend::Memory);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "tokenline.toml",
        r#"
[api]
base_url = "http://localhost:8080"

[credentials]
backend = "file"
path = "/tmp/tokenline-test-credentials.json"
"#,
    );

    let config = config::load_from_file(Some(path)).expect("TOML config should load");

    assert_eq!(config.api.base_url, "http://localhost:8080");
    assert_eq!(config.api.refresh_path, "/auth/refresh");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.credentials.backend, CredentialBackend::File);
    assert_eq!(config.credentials.path, "/tmp/tokenline-test-credentials.json");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_file_contents_are_config_errors() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "tokenline.json", "{ not json");

    let result = config::load_from_file(Some(path));

    assert!(matches!(result, Err(TokenlineError::Config(_))));
}

#[test]
fn test_unknown_backend_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path =
        write_config(&dir, "tokenline.toml", "[credentials]\nbackend = \"floppy\"\n");

    assert!(config::load_from_file(Some(path)).is_err());
}

// All environment manipulation lives in one test so parallel tests in this
// binary never observe a half-set environment.
#[test]
fn test_load_config_from_environment() {
    std::env::remove_var("TOKENLINE_API_BASE_URL");
    assert!(matches!(config::load_from_env(), Err(TokenlineError::Config(_))));

    std::env::set_var("TOKENLINE_API_BASE_URL", "https://env.test.local");
    std::env::set_var("TOKENLINE_API_TIMEOUT_SECS", "7");
    std::env::set_var("TOKENLINE_CREDENTIALS_BACKEND", "Keychain");
    std::env::set_var("TOKENLINE_LOG_JSON", "yes");

    let config = config::load_from_env().expect("environment config should load");
    assert_eq!(config.api.base_url, "https://env.test.local");
    assert_eq!(config.api.timeout_secs, 7);
    assert_eq!(config.api.refresh_path, "/auth/refresh");
    assert_eq!(config.credentials.backend, CredentialBackend::Keychain);
    assert!(config.logging.json);

    let loaded = config::load().expect("load should prefer the environment");
    assert_eq!(loaded.api.base_url, "https://env.test.local");

    std::env::set_var("TOKENLINE_API_TIMEOUT_SECS", "soon");
    assert!(matches!(config::load_from_env(), Err(TokenlineError::Config(_))));

    for key in [
        "TOKENLINE_API_BASE_URL",
        "TOKENLINE_API_TIMEOUT_SECS",
        "TOKENLINE_CREDENTIALS_BACKEND",
        "TOKENLINE_LOG_JSON",
    ] {
        std::env::remove_var(key);
    }
}
