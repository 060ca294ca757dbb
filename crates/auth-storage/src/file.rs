//! File-backed storage backend.

use crate::{SecureStore, StorageError, StorageResult, APP_DIR};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

const CREDENTIALS_FILE: &str = "credentials.json";

/// File-backed storage. Persists a flat JSON map under the user's home
/// directory so credentials survive client restarts.
///
/// Reads and writes go through a mutex so interleaved callers observe
/// last-write-wins rather than torn files.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at the default location (`~/.worklink/credentials.json`).
    pub fn new() -> StorageResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| StorageError::Path("Could not determine home directory".to_string()))?;
        Ok(Self::with_base_dir(home.join(APP_DIR)))
    }

    /// Create a store rooted at a custom directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            path: base_dir.join(CREDENTIALS_FILE),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, content)?;

        // Credential file must not be world-readable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl SecureStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.persist(&map)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.load()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.load()?;
        let removed = map.remove(key).is_some();
        if removed {
            self.persist(&map)?;
        }
        Ok(removed)
    }
}
