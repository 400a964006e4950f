//! Saved-article set with write-through persistence.
//!
//! Articles are kept most-recently-added first for display, with a `HashSet`
//! index on the id for O(1) membership. Every mutation writes the whole set
//! to the store before returning; a failed write is logged and the in-memory
//! set stays authoritative for the session.

use std::collections::HashSet;

use crate::api::Article;
use crate::storage::{persist, SharedStore, BOOKMARKS_KEY};

pub struct BookmarkStore {
    store: SharedStore,
    articles: Vec<Article>,
    ids: HashSet<i64>,
}

impl BookmarkStore {
    /// Load the persisted set from `store`.
    ///
    /// Absent or corrupt data yields an empty set. Duplicate ids in stored
    /// data are dropped, keeping the first (most recent) occurrence.
    pub fn load(store: SharedStore) -> Self {
        let stored: Vec<Article> =
            persist::load_json(store.as_ref(), BOOKMARKS_KEY).unwrap_or_default();

        let mut ids = HashSet::with_capacity(stored.len());
        let articles: Vec<Article> = stored
            .into_iter()
            .filter(|article| ids.insert(article.id))
            .collect();

        tracing::debug!(count = articles.len(), "Loaded bookmarks");
        Self {
            store,
            articles,
            ids,
        }
    }

    /// Insert `article` at the front. Already-bookmarked ids are left where
    /// they are. Returns whether the set changed.
    pub fn add(&mut self, article: Article) -> bool {
        if !self.ids.insert(article.id) {
            return false;
        }
        self.articles.insert(0, article);
        self.persist();
        true
    }

    /// Remove the article with `id`. Returns whether the set changed.
    pub fn remove(&mut self, id: i64) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        self.articles.retain(|a| a.id != id);
        self.persist();
        true
    }

    /// Remove if present, otherwise add. Returns the new membership.
    pub fn toggle(&mut self, article: &Article) -> bool {
        if self.is_bookmarked(article.id) {
            self.remove(article.id);
            false
        } else {
            self.add(article.clone());
            true
        }
    }

    pub fn is_bookmarked(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Saved articles, most recently added first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    fn persist(&self) {
        if !persist::save_json(self.store.as_ref(), BOOKMARKS_KEY, &self.articles) {
            tracing::warn!(
                count = self.articles.len(),
                "Bookmarks not persisted; changes kept for this session"
            );
        }
    }
}
