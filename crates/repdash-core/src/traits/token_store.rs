//! Durable token storage trait.

use std::fmt;

use crate::Result;

/// Keys under which the session persists its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The access token (JWT).
    AccessToken,
    /// The refresh token.
    RefreshToken,
}

impl StorageKey {
    /// Both keys, in the order they are cleared.
    pub const ALL: [StorageKey; 2] = [StorageKey::AccessToken, StorageKey::RefreshToken];

    /// Returns the persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "token",
            StorageKey::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-local key/value storage for session tokens.
///
/// Implementations must be durable across restarts if the session is
/// expected to survive them. Removing an absent key is not an error.
pub trait TokenStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: StorageKey) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: StorageKey, value: &str) -> Result<()>;

    /// Delete a value.
    fn remove(&self, key: StorageKey) -> Result<()>;

    /// Delete every session key.
    fn clear(&self) -> Result<()> {
        for key in StorageKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}
