//! Session token storage.
//!
//! The request layer never reads ambient global storage. Callers inject a
//! [`TokenStore`]; the typed clients only ever `get` the bearer token from
//! it. Token refresh and persistence belong to whoever owns the store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "userId";

/// Opaque synchronous key-value store for session data.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self, key: &str);

    fn bearer_token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn user_id(&self) -> Option<String> {
        self.get(USER_ID_KEY)
    }
}

/// In-process [`TokenStore`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(TOKEN_KEY, &token.into());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
