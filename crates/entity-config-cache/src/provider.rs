//! Pluggable key/value cache providers

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use entity_config_fs::io;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Generic string key/value cache behind [`ConfigCache`](crate::ConfigCache).
///
/// `fetch` yields `None` on a miss. The boolean results report whether the
/// provider accepted the operation.
pub trait CacheProvider: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<bool>;
    fn delete(&self, key: &str) -> Result<bool>;
    fn delete_all(&self) -> Result<bool>;
}

impl<T: CacheProvider + ?Sized> CacheProvider for Arc<T> {
    fn fetch(&self, key: &str) -> Result<Option<String>> {
        (**self).fetch(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<bool> {
        (**self).save(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn delete_all(&self) -> Result<bool> {
        (**self).delete_all()
    }
}

/// Thread-safe in-memory provider.
///
/// Wrap it in an `Arc` to share one cache between several managers.
#[derive(Debug, Default)]
pub struct MemoryCacheProvider {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panicking writer cannot leave a half-written String behind
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheProvider for MemoryCacheProvider {
    fn fetch(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<bool> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.entries().remove(key);
        Ok(true)
    }

    fn delete_all(&self) -> Result<bool> {
        self.entries().clear();
        Ok(true)
    }
}

const ENTRY_EXTENSION: &str = "cache";

/// Provider keeping one file per key under a directory.
///
/// File names are the SHA-256 of the key, so any key is a valid name.
#[derive(Debug, Clone)]
pub struct FileCacheProvider {
    dir: PathBuf,
}

impl FileCacheProvider {
    /// Use an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::MissingDirectory { path: dir });
        }
        Ok(Self { dir })
    }

    /// Use `dir`, creating it when missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| entity_config_fs::Error::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir
            .join(format!("{:x}.{}", hasher.finalize(), ENTRY_EXTENSION))
    }
}

impl CacheProvider for FileCacheProvider {
    fn fetch(&self, key: &str) -> Result<Option<String>> {
        Ok(io::read_text_optional(&self.entry_path(key))?)
    }

    fn save(&self, key: &str, value: &str) -> Result<bool> {
        io::write_atomic(&self.entry_path(key), value.as_bytes())?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        io::remove_if_exists(&self.entry_path(key))?;
        Ok(true)
    }

    fn delete_all(&self) -> Result<bool> {
        let entries = fs::read_dir(&self.dir).map_err(|e| entity_config_fs::Error::io(&self.dir, e))?;
        let mut removed = 0usize;
        for entry in entries {
            let path = entry
                .map_err(|e| entity_config_fs::Error::io(&self.dir, e))?
                .path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) && io::remove_if_exists(&path)? {
                removed += 1;
            }
        }
        tracing::debug!(dir = %self.dir.display(), removed, "Cleared file cache");
        Ok(true)
    }
}
