//! Driven port for the persisted admin token.
//!
//! Storage holds a single opaque string under [`TOKEN_STORAGE_KEY`]. Absence
//! means the admin is anonymous.

use std::sync::Mutex;

use super::define_port_error;
use crate::domain::AuthToken;

/// Well-known key the token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "token";

define_port_error! {
    /// Errors raised by token storage adapters.
    pub enum TokenStoreError {
        /// The backing storage could not be read or written.
        Io { message: String } => "token storage failed: {message}",
        /// A stored value exists but is not a usable token.
        Corrupt { message: String } => "stored token is unusable: {message}",
    }
}

/// Port for loading, saving and clearing the admin token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when storage is unreadable or corrupt.
    fn load(&self) -> Result<Option<AuthToken>, TokenStoreError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the write fails.
    fn save(&self, token: &AuthToken) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the removal fails.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slot: Mutex<Option<AuthToken>>,
}

impl InMemoryTokenStore {
    /// Store pre-seeded with `token`.
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn with_slot<R>(
        &self,
        f: impl FnOnce(&mut Option<AuthToken>) -> R,
    ) -> Result<R, TokenStoreError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| TokenStoreError::io("in-memory token slot poisoned"))?;
        Ok(f(&mut *guard))
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, TokenStoreError> {
        self.with_slot(|slot| slot.clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), TokenStoreError> {
        self.with_slot(|slot| *slot = Some(token.clone()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.with_slot(|slot| *slot = None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn token(raw: &str) -> AuthToken {
        AuthToken::new(raw).expect("valid token")
    }

    #[test]
    fn in_memory_store_starts_empty() {
        let store = InMemoryTokenStore::default();
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn in_memory_store_saves_and_clears() {
        let store = InMemoryTokenStore::with_token(token("first"));
        store.save(&token("second")).expect("save");
        assert_eq!(store.load().expect("load"), Some(token("second")));

        store.clear().expect("clear");
        store.clear().expect("clearing twice is fine");
        assert_eq!(store.load().expect("load"), None);
    }
}
