//! In-memory token store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::Result;
use crate::error::StorageError;
use crate::traits::{StorageKey, TokenStore};

/// A [`TokenStore`] that lives only as long as the process.
///
/// Useful for tests and for sessions that must not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with tokens.
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            if let Some(token) = access_token {
                values.insert(StorageKey::AccessToken, token.to_string());
            }
            if let Some(token) = refresh_token {
                values.insert(StorageKey::RefreshToken, token.to_string());
            }
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(&key);
        Ok(())
    }
}
