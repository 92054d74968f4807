use keyring::Entry;
use tokenline_domain::Result;
use tracing::debug;

use super::CredentialStore;
use crate::errors::InfraError;

/// Credential store backed by the platform keychain (macOS Keychain, Windows
/// Credential Manager, Linux Secret Service).
///
/// Each key becomes one keychain entry under `service_name`.
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
}

impl KeychainCredentialStore {
    /// Store whose entries live under `service_name`.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Keychain service the entries are filed under.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| InfraError::from(e).into())
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading keychain entry");

        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "Writing keychain entry");

        self.entry(key)?.set_password(value).map_err(|e| InfraError::from(e).into())
    }

    fn remove(&self, key: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "Deleting keychain entry");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}
