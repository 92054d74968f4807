//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokenline_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use tokenline_domain::{Result, TokenlineError};
use tokenline_infra::{ApiClient, ApiClientConfig, CredentialStore, MemoryCredentialStore};
use wiremock::MockServer;

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Store seeded with both tokens.
pub fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_entries([
        (ACCESS_TOKEN_KEY, access),
        (REFRESH_TOKEN_KEY, refresh),
    ]))
}

/// Client config pointed at a mock server.
pub fn config_for(server: &MockServer) -> ApiClientConfig {
    ApiClientConfig {
        base_url: server.uri(),
        refresh_path: REFRESH_PATH.to_string(),
        timeout: Duration::from_secs(5),
    }
}

pub fn client_for(server: &MockServer, store: Arc<dyn CredentialStore>) -> ApiClient {
    ApiClient::new(config_for(server), store).expect("client should build")
}

/// Store whose reads always fail; counts how often it was asked.
#[derive(Default)]
pub struct FailingStore {
    pub reads: AtomicUsize,
}

impl FailingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl CredentialStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(TokenlineError::Storage("credential store unavailable".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(TokenlineError::Storage("credential store unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(TokenlineError::Storage("credential store unavailable".into()))
    }
}
