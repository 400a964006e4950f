use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::kv::{KeyValueStore, StorageError};

/// Maximum store file size (4 MB). Larger files are treated as corrupt.
const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// JSON-file backed key-value store.
///
/// The whole map is held in memory and rewritten on every mutation using
/// write-to-temp-then-rename, so the file on disk is always either the old
/// or the new snapshot, never a partial write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// - Missing file → empty store, created on first write
    /// - Corrupt or oversized file → moved aside to `<path>.corrupt`, empty store
    /// - Other I/O errors → `Err(StorageError::Io)`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No store file yet, starting empty");
                BTreeMap::new()
            }
            Err(StorageError::Corrupt(e)) => {
                let aside = path.with_extension("json.corrupt");
                tracing::warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Store file is corrupt, starting empty"
                );
                if let Err(e) = std::fs::rename(&path, &aside) {
                    tracing::warn!(error = %e, "Failed to move corrupt store file aside");
                }
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_FILE_SIZE {
            return Err(StorageError::Corrupt(serde::de::Error::custom(format!(
                "store file is {} bytes (max {})",
                meta.len(),
                MAX_FILE_SIZE
            ))));
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Rewrite the backing file from `entries`.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension(format!("tmp.{}", std::process::id()));
        let result = (|| -> Result<(), std::io::Error> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            drop(file);

            // On Windows, rename fails if destination exists
            #[cfg(windows)]
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }

            std::fs::rename(&temp_path, &self.path)
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        Ok(result?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
