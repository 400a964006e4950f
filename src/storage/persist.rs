//! Best-effort load/save helpers shared by every persisting component.
//!
//! Loads never fail: absent, unreadable or corrupt values come back as `None`
//! and the caller substitutes its empty default. Saves never fail either:
//! errors are logged and the in-memory state stays authoritative.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::KeyValueStore;

/// Load and deserialize the JSON value under `key`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = load_string(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Stored value is corrupt, using default");
            None
        }
    }
}

/// Serialize `value` as JSON and write it under `key`.
///
/// Returns whether the write reached the store.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save_string(store, key, &json),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to serialize value for store");
            false
        }
    }
}

/// Load the raw string under `key`.
pub fn load_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read from store, using default");
            None
        }
    }
}

/// Write the raw string `value` under `key`.
pub fn save_string(store: &dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to write to store");
            false
        }
    }
}

/// Remove `key`, logging failures.
pub fn remove_key(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to remove key from store");
            false
        }
    }
}
