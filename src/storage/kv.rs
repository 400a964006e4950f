use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Failures surfaced by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file or a stored value is not valid JSON
    #[error("Store contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous holder of the store lock panicked
    #[error("Store lock poisoned")]
    Poisoned,
}

// ============================================================================
// Store Trait
// ============================================================================

/// Durable, synchronous, string-valued key-value storage.
///
/// Each key has exactly one owning component; the store itself does not
/// arbitrate between writers. Implementations use interior mutability so a
/// single instance can be shared behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by every component that persists state.
pub type SharedStore = Arc<dyn KeyValueStore>;

// ============================================================================
// In-Memory Store
// ============================================================================

/// Process-local store. Used in tests and as the fallback when the on-disk
/// store cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh store in an `Arc` ready for injection.
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
