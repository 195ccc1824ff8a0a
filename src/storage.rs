//! Key-value persistence used for favorites.
//!
//! `JsonFileStore` keeps every key in a single JSON object file, much like a
//! browser's local storage. `MemoryStore` backs tests.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ScoutError};

pub trait KeyValueStore: Send {
    /// Value stored under `key`, `None` if never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(ScoutError::PermissionDenied(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable store {}: {e}", self.path.display());
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
            .map_err(|e| ScoutError::Storage(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "a").unwrap();
        store.set("k", "b").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get("favorites").unwrap(), None);

        store.set("theme", "dark").unwrap();
        store.set("favorites", "[]").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("favorites").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_errors_on_read_but_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(store.get("favorites").is_err());
        store.set("favorites", "[]").unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));
    }
}
