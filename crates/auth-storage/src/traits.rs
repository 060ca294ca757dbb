//! Storage trait definitions.

use crate::StorageResult;

/// Trait for credential storage backends.
pub trait SecureStore: Send + Sync {
    /// Store a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns `false` if the key was absent.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists.
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
