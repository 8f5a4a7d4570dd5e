//! Key-value persistence backing the profile store

use crate::error::{FastCvError, Result};
use log::debug;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One JSON file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FastCvError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        // Readers never observe a half-written value.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&path)
            .map_err(|e| FastCvError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get("fastcv_history").unwrap(), None);
        storage.set("fastcv_history", "[]").unwrap();
        assert_eq!(storage.get("fastcv_history").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("fastcv_history.json").exists());

        storage.remove("fastcv_history").unwrap();
        assert_eq!(storage.get("fastcv_history").unwrap(), None);
        // Removing twice is fine
        storage.remove("fastcv_history").unwrap();
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        storage.set("key", "first").unwrap();
        storage.set("key", "second").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("").is_err());
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("a", "1").unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));

        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }
}
