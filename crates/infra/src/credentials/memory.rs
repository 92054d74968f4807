use std::collections::HashMap;

use parking_lot::RwLock;
use tokenline_domain::Result;

use super::CredentialStore;

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: RwLock::new(entries) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_previous_value() {
        let store = MemoryCredentialStore::with_entries([("access_token", "old")]);
        store.set("access_token", "new").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let store = MemoryCredentialStore::new();
        assert!(store.remove("refresh_token").is_ok());
        assert!(store.get("refresh_token").unwrap().is_none());
    }
}
