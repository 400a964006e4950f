mod file_store;
mod kv;
pub mod persist;

pub use file_store::FileStore;
pub use kv::{KeyValueStore, MemoryStore, SharedStore, StorageError};

/// Key owned by the bookmark store: JSON array of articles.
pub const BOOKMARKS_KEY: &str = "bookmarks";
/// Key owned by the theme scheduler: `auto`, `light` or `dark`.
pub const THEME_MODE_KEY: &str = "theme.mode";
/// Key owned by the search engine: JSON array of past queries.
pub const SEARCH_HISTORY_KEY: &str = "search.history";
