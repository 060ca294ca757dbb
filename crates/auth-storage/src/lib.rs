//! Credential persistence for the Worklink client.
//!
//! This crate owns the two durable slots the rest of the client relies on:
//! - the token pair (access + refresh) issued by the identity service
//! - the single-use OAuth handshake record for the GitHub redirect flow
//!
//! Backends:
//! - **File**: a JSON credential file under `~/.worklink` (0600 on unix)
//! - **Memory**: a `HashMap` behind a mutex, for tests and ephemeral sessions
//!
//! No backend validates token contents and none performs network calls;
//! callers get exactly what was last written (last-write-wins).

mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use tokens::TokenStore;
pub use traits::SecureStore;

use thiserror::Error;

/// Directory under the user's home that holds the credential file.
pub const APP_DIR: &str = ".worklink";

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Path error (e.g., home directory not found)
    #[error("Path error: {0}")]
    Path(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a `TokenStore` backed by the default file store.
pub fn create_token_store() -> StorageResult<TokenStore> {
    let store = FileStore::new()?;
    Ok(TokenStore::new(Box::new(store)))
}
