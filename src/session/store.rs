use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};

/// Durable key/value storage backing the session
///
/// A key that was never set reads as `None`, never as an empty string.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove the key entirely; removing an absent key is not an error
    fn remove(&self, key: &str) -> AppResult<()>;

    /// Apply several changes in one write; `None` removes the key
    ///
    /// Stores that can write atomically override this so the changes land together.
    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> AppResult<()> {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

fn apply_changes(entries: &mut HashMap<String, String>, changes: &[(&str, Option<&str>)]) {
    for (key, value) in changes {
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(*key);
            }
        }
    }
}

/// In-memory store for testing
///
/// Clones share the same map, so dropping a `Session` and loading a new one
/// from a clone behaves like a process restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key is present at all
    pub fn contains(&self, key: &str) -> bool {
        self.lock().map(|e| e.contains_key(key)).unwrap_or(false)
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> AppResult<()> {
        apply_changes(&mut *self.lock()?, changes);
        Ok(())
    }
}

/// JSON file store shared between processes
///
/// Every change is a read-modify-write under an exclusive lock on a sibling
/// `.lock` file. The new content goes to a synced temp file in the same
/// directory and is renamed over the store.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// An unreadable file loads as empty and is replaced by the next write
    fn read_all(&self) -> AppResult<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Ignoring unreadable session store"
                    );
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(raw.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| AppError::from(e.error))?;
        Ok(())
    }

    /// Held until the returned handle is dropped
    fn lock_exclusive(&self) -> AppResult<File> {
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            AppError::Storage(format!("failed to lock {}: {}", lock_path.display(), e))
        })?;
        Ok(file)
    }

    fn modify(&self, changes: &[(&str, Option<&str>)]) -> AppResult<()> {
        fs::create_dir_all(self.dir())?;
        let _lock = self.lock_exclusive()?;
        let mut entries = self.read_all()?;
        apply_changes(&mut entries, changes);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.modify(&[(key, Some(value))])
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.modify(&[(key, None)])
    }

    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> AppResult<()> {
        self.modify(changes)
    }
}
