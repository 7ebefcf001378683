// Key-value store backends for attribute records

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::components::{KeyValueStore, NotificationError, NotificationResult};

/// Volatile store; records vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> NotificationResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> NotificationResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> NotificationResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// Store persisted as a single JSON object file
///
/// The file is read once at open and rewritten on every change through a
/// temp file in the same directory, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> NotificationResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                NotificationError::store(format!("{} is not a record file: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(NotificationError::store(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            },
        };

        tracing::debug!(path = ?path, records = entries.len(), "Opened notification record file");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> NotificationResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| NotificationError::store(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = serde_json::to_vec_pretty(entries).map_err(NotificationError::store)?;

        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| NotificationError::store(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(&json)
            .and_then(|()| temp_file.as_file().sync_all())
            .map_err(|e| NotificationError::store(format!("Failed to write records: {}", e)))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| NotificationError::store(format!("Failed to replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }

    /// Apply a change and write it out; the in-memory view is rolled back on failure
    fn mutate(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> NotificationResult<()> {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        change(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> NotificationResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> NotificationResult<()> {
        if !self.entries.read().contains_key(key) {
            return Ok(());
        }
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> NotificationResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
