//! Key-value credential storage
//!
//! Authentication keeps its user list and the current session in a plain
//! string key-value store. Two backends are provided: an in-memory map for
//! session-scoped data and tests, and a JSON file for data that should
//! survive restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::AuthError;

/// String key-value store for credentials
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, key: &str, value: String) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// In-memory store, cleared when dropped
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), AuthError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk
///
/// Entries are loaded on open and the whole file is rewritten on every
/// change.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(storage_error)?;
            serde_json::from_str(&content).map_err(storage_error)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_to_disk(&self, entries: &HashMap<String, String>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let content = serde_json::to_string_pretty(entries).map_err(storage_error)?;
        std::fs::write(&self.path, content).map_err(storage_error)?;
        log::debug!("Saved credentials to {:?}", self.path);
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), AuthError> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.save_to_disk(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.save_to_disk(&entries)?;
        }
        Ok(())
    }
}

fn storage_error(e: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(e.to_string())
}
