//! High-level API over the credential slots.

use crate::{MemoryStore, SecureStore, StorageKeys, StorageResult};

/// High-level facade over a storage backend, exposing the named slots the
/// session engine and OAuth flow use. The session engine is the only writer
/// of the token slots; the OAuth flow owns the handshake slot.
pub struct TokenStore {
    store: Box<dyn SecureStore>,
}

impl TokenStore {
    /// Create a token store over the given backend.
    pub fn new(store: Box<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// Create a token store over an in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> StorageResult<Option<String>> {
        self.store.get(StorageKeys::ACCESS_TOKEN)
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.store.get(StorageKeys::REFRESH_TOKEN)
    }

    /// Overwrite both token slots. Subsequent reads observe the new values
    /// immediately.
    pub fn set_tokens(&self, access: &str, refresh: &str) -> StorageResult<()> {
        self.store.set(StorageKeys::ACCESS_TOKEN, access)?;
        self.store.set(StorageKeys::REFRESH_TOKEN, refresh)?;
        tracing::debug!("token pair persisted");
        Ok(())
    }

    /// Remove both token slots. Clearing an empty store is not an error.
    pub fn clear_tokens(&self) -> StorageResult<()> {
        self.store.delete(StorageKeys::ACCESS_TOKEN)?;
        self.store.delete(StorageKeys::REFRESH_TOKEN)?;
        tracing::debug!("token pair cleared");
        Ok(())
    }

    /// Persist a pending OAuth handshake record (JSON).
    pub fn put_handshake(&self, json: &str) -> StorageResult<()> {
        self.store.set(StorageKeys::OAUTH_HANDSHAKE, json)
    }

    /// Read and delete the pending OAuth handshake record, if present.
    /// The record can be taken exactly once.
    pub fn take_handshake(&self) -> StorageResult<Option<String>> {
        let value = self.store.get(StorageKeys::OAUTH_HANDSHAKE)?;
        if value.is_some() {
            self.store.delete(StorageKeys::OAUTH_HANDSHAKE)?;
        }
        Ok(value)
    }

    /// Discard any pending OAuth handshake record.
    pub fn clear_handshake(&self) -> StorageResult<()> {
        self.store.delete(StorageKeys::OAUTH_HANDSHAKE)?;
        Ok(())
    }
}
