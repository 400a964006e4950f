use crate::storage::{persist, SharedStore, SEARCH_HISTORY_KEY};

/// Recently opened queries, most recent first, unique by exact text.
pub struct SearchHistory {
    store: SharedStore,
    entries: Vec<String>,
    limit: usize,
}

impl SearchHistory {
    /// Load persisted history, keeping at most `limit` entries.
    pub fn load(store: SharedStore, limit: usize) -> Self {
        let mut entries: Vec<String> =
            persist::load_json(store.as_ref(), SEARCH_HISTORY_KEY).unwrap_or_default();

        let mut seen = std::collections::HashSet::new();
        entries.retain(|q| seen.insert(q.clone()));
        entries.truncate(limit);

        Self {
            store,
            entries,
            limit,
        }
    }

    /// Move `query` to the front, dropping any older copy and anything past
    /// the limit. Blank queries are not recorded.
    pub fn record(&mut self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.limit);
        persist::save_json(self.store.as_ref(), SEARCH_HISTORY_KEY, &self.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        persist::remove_key(self.store.as_ref(), SEARCH_HISTORY_KEY);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_record_front_inserts_and_dedupes() {
        let mut history = SearchHistory::load(MemoryStore::shared(), 5);
        history.record("rust");
        history.record("tokio");
        history.record("rust");
        assert_eq!(history.entries(), ["rust", "tokio"]);
    }

    #[test]
    fn test_record_caps_at_limit() {
        let mut history = SearchHistory::load(MemoryStore::shared(), 5);
        for q in ["a1", "a2", "a3", "a4", "a5", "a6"] {
            history.record(q);
        }
        assert_eq!(history.entries(), ["a6", "a5", "a4", "a3", "a2"]);
    }

    #[test]
    fn test_dedupe_is_exact_text() {
        let mut history = SearchHistory::load(MemoryStore::shared(), 5);
        history.record("Rust");
        history.record("rust");
        assert_eq!(history.entries(), ["rust", "Rust"]);
    }

    #[test]
    fn test_blank_query_not_recorded() {
        let mut history = SearchHistory::load(MemoryStore::shared(), 5);
        history.record("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn test_persists_and_reloads() {
        let backing = MemoryStore::shared();
        let mut history = SearchHistory::load(Arc::clone(&backing), 5);
        history.record("climate");
        history.record("markets");

        let reloaded = SearchHistory::load(backing, 5);
        assert_eq!(reloaded.entries(), ["markets", "climate"]);
    }

    #[test]
    fn test_clear_removes_key() {
        let backing = MemoryStore::shared();
        let mut history = SearchHistory::load(Arc::clone(&backing), 5);
        history.record("climate");
        history.clear();

        assert!(history.is_empty());
        assert_eq!(backing.get(SEARCH_HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_or_oversized_storage_is_sanitized() {
        let backing = MemoryStore::shared();
        backing.set(SEARCH_HISTORY_KEY, "{\"not\": \"a list\"}").unwrap();
        assert!(SearchHistory::load(Arc::clone(&backing), 5).is_empty());

        backing
            .set(
                SEARCH_HISTORY_KEY,
                r#"["a","b","a","c","d","e","f","g"]"#,
            )
            .unwrap();
        let history = SearchHistory::load(backing, 5);
        assert_eq!(history.entries(), ["a", "b", "c", "d", "e"]);
    }
}
