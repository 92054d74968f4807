//! Credential persistence
//!
//! The API client reads and writes the access/refresh token pair through the
//! [`CredentialStore`] trait, injected at construction. Three backends are
//! provided:
//!
//! - [`MemoryCredentialStore`]: process-local map (tests, ephemeral sessions)
//! - [`FileCredentialStore`]: JSON file, written through on every change
//! - [`KeychainCredentialStore`]: platform keychain via `keyring`
//!
//! Keys are plain strings; the client uses
//! [`ACCESS_TOKEN_KEY`](tokenline_domain::constants::ACCESS_TOKEN_KEY) and
//! [`REFRESH_TOKEN_KEY`](tokenline_domain::constants::REFRESH_TOKEN_KEY).

mod file;
mod keychain;
mod memory;

use std::sync::Arc;

pub use file::FileCredentialStore;
pub use keychain::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;
use tokenline_domain::{CredentialBackend, CredentialConfig, Result};
use tracing::info;

/// Synchronous key-value store holding the credential pair.
///
/// Last writer wins; implementations only need to make each call atomic.
pub trait CredentialStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Open the store selected by configuration.
///
/// # Errors
/// Returns an error if the file backend cannot read an existing file.
pub fn open_store(config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>> {
    info!(backend = ?config.backend, "Opening credential store");

    let store: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        CredentialBackend::File => Arc::new(FileCredentialStore::open(&config.path)?),
        CredentialBackend::Keychain => {
            Arc::new(KeychainCredentialStore::new(config.service_name.clone()))
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_memory_backend() {
        let config =
            CredentialConfig { backend: CredentialBackend::Memory, ..CredentialConfig::default() };
        let store = open_store(&config).unwrap();

        store.set("access_token", "abc").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn opens_file_backend_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        let config = CredentialConfig {
            backend: CredentialBackend::File,
            path: path.to_string_lossy().into_owned(),
            ..CredentialConfig::default()
        };

        let store = open_store(&config).unwrap();
        store.set("refresh_token", "r1").unwrap();

        assert!(path.exists());
    }
}
