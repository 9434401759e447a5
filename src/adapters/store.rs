//! Storage adapters.
//!
//! [`MemStore`] backs tests and diskless demo runs; [`FileStore`] persists
//! namespaced keys as individual files under a state directory, writing
//! through a temp file + rename so a blob is never half-written.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::app::ports::{ConfigPort, StoragePort};
use crate::config::SystemConfig;
use crate::error::StorageError;

/// Storage slot for the persisted system configuration.
const CFG_NAMESPACE: &str = "cfg";
const CFG_KEY: &str = "system";

/// Load a stored config, falling back to defaults on first boot. A blob
/// that deserializes but fails validation is rejected, not clamped.
fn load_config(store: &impl StoragePort) -> Result<SystemConfig, &'static str> {
    let bytes = match store.read(CFG_NAMESPACE, CFG_KEY) {
        Ok(b) => b,
        Err(StorageError::NotFound) => return Ok(SystemConfig::default()),
        Err(_) => return Err("config read failed"),
    };
    let config: SystemConfig =
        postcard::from_bytes(&bytes).map_err(|_| "stored config corrupted")?;
    config.validate()?;
    Ok(config)
}

/// Validate and persist a config as postcard bytes.
fn save_config(store: &mut impl StoragePort, config: &SystemConfig) -> Result<(), &'static str> {
    config.validate()?;
    let bytes = postcard::to_allocvec(config).map_err(|_| "config serialization failed")?;
    store
        .write(CFG_NAMESPACE, CFG_KEY, &bytes)
        .map_err(|_| "config write failed")
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

/// Volatile key-value store.
pub struct MemStore {
    store: HashMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    fn key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MemStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.store
            .get(&Self::key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store.insert(Self::key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&Self::key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&Self::key(namespace, key))
    }
}

impl ConfigPort for MemStore {
    fn load(&self) -> Result<SystemConfig, &'static str> {
        load_config(self)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), &'static str> {
        save_config(self, config)
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// File-per-key store rooted at a state directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|_| StorageError::IoError)?;
        Ok(Self { root })
    }

    fn path(&self, namespace: &str, key: &str) -> PathBuf {
        // Flat layout: <root>/<namespace>.<key>
        self.root.join(format!("{namespace}.{key}"))
    }
}

impl StoragePort for FileStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.path(namespace, key)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(_) => Err(StorageError::IoError),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path(namespace, key);
        let tmp = self.root.join(format!("{namespace}.{key}.tmp"));
        fs::write(&tmp, data).map_err(|_| StorageError::IoError)?;
        fs::rename(&tmp, &path).map_err(|_| StorageError::IoError)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(namespace, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(StorageError::IoError),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path(namespace, key).exists()
    }
}

impl ConfigPort for FileStore {
    fn load(&self) -> Result<SystemConfig, &'static str> {
        load_config(self)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), &'static str> {
        save_config(self, config)
    }
}
