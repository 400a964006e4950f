use std::collections::HashSet;

use crate::api::{ApiError, Article, ArticlePage, ContentService, PageQuery};

/// A page request issued by [`FeedController`], tagged with the feed
/// generation it belongs to.
///
/// Every category switch or reset bumps the generation, so a response that
/// arrives for an earlier category can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub query: PageQuery,
}

/// Cumulative, deduplicated article list for one category filter.
///
/// Loads are split into `begin_*` (state transition + request to issue) and
/// `complete_*` (merge the response) so the fetch itself can run on a
/// background task. `load_more` composes the two for callers that can await.
#[derive(Debug)]
pub struct FeedController {
    category: Option<String>,
    page_size: usize,
    generation: u64,
    items: Vec<Article>,
    seen: HashSet<i64>,
    cursor: usize,
    has_more: bool,
    loading: bool,
    total_estimate: u64,
}

impl FeedController {
    /// Empty controller for `category`; nothing is loadable until the
    /// initial page arrives via [`reset`](Self::reset) or
    /// [`complete_initial`](Self::complete_initial).
    pub fn new(category: Option<String>, page_size: usize) -> Self {
        Self {
            category,
            page_size: page_size.max(1),
            generation: 0,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: 0,
            has_more: false,
            loading: false,
            total_estimate: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Discard all state and seed it from `initial`, a first page the caller
    /// already fetched for `category`.
    pub fn reset(&mut self, category: Option<String>, initial: ArticlePage) {
        self.clear(category);
        self.seed(initial);
    }

    /// Discard all state for a new category filter and return the request
    /// for its first page. The controller reports `loading` until
    /// [`complete_initial`](Self::complete_initial) runs.
    pub fn switch_category(&mut self, category: Option<String>) -> PageRequest {
        self.clear(category);
        self.loading = true;
        self.request_at(0)
    }

    /// Apply the response to a [`switch_category`](Self::switch_category)
    /// request. Stale responses are ignored.
    pub fn complete_initial(
        &mut self,
        request: &PageRequest,
        result: Result<ArticlePage, ApiError>,
    ) -> Result<usize, ApiError> {
        if self.is_stale(request) {
            return Ok(0);
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.seed(page);
                Ok(self.items.len())
            }
            Err(e) => {
                tracing::warn!(
                    category = ?self.category,
                    error = %e,
                    "Initial feed page failed"
                );
                Err(e)
            }
        }
    }

    fn clear(&mut self, category: Option<String>) {
        self.generation += 1;
        self.category = category;
        self.items.clear();
        self.seen.clear();
        self.cursor = 0;
        self.has_more = false;
        self.loading = false;
        self.total_estimate = 0;
    }

    fn seed(&mut self, initial: ArticlePage) {
        self.merge(initial.articles);
        self.cursor = self.page_size;
        self.has_more = self.items.len() >= self.page_size;
        // Advisory only: doubling the first page when the service is silent
        self.total_estimate = initial
            .total
            .unwrap_or(self.items.len() as u64 * 2);
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Start loading the next page, or `None` if a load is already
    /// outstanding or the feed is exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(self.request_at(self.cursor))
    }

    /// Merge the response to a [`begin_load`](Self::begin_load) request.
    ///
    /// Returns how many new articles were appended. A failure stops further
    /// loading for this feed and is handed back for logging; loaded items are
    /// kept either way.
    pub fn complete_load(
        &mut self,
        request: &PageRequest,
        result: Result<ArticlePage, ApiError>,
    ) -> Result<usize, ApiError> {
        if self.is_stale(request) {
            return Ok(0);
        }
        self.loading = false;
        match result {
            Ok(page) => {
                let received = page.articles.len();
                let added = self.merge(page.articles);
                self.cursor = request.query.offset + self.page_size;
                self.has_more = page.has_more;
                if let Some(total) = page.total {
                    self.total_estimate = total;
                }
                tracing::debug!(
                    offset = request.query.offset,
                    received,
                    added,
                    has_more = self.has_more,
                    "Merged feed page"
                );
                Ok(added)
            }
            Err(e) => {
                self.has_more = false;
                tracing::warn!(
                    offset = request.query.offset,
                    error = %e,
                    "Feed page failed, no further pages this session"
                );
                Err(e)
            }
        }
    }

    /// Fetch and merge the next page from `service`. No request is issued
    /// while loading or once exhausted.
    pub async fn load_more<S: ContentService>(&mut self, service: &S) -> Result<usize, ApiError> {
        let Some(request) = self.begin_load() else {
            return Ok(0);
        };
        let result = service.fetch_page(&request.query).await;
        self.complete_load(&request, result)
    }

    /// Give up on the outstanding request without a response (the task
    /// carrying it died). Treated like a failure: no further pages.
    pub fn abandon_load(&mut self) {
        if self.loading {
            tracing::warn!(category = ?self.category, "Abandoning outstanding feed page");
            self.loading = false;
            self.has_more = false;
        }
    }

    fn request_at(&self, offset: usize) -> PageRequest {
        PageRequest {
            generation: self.generation,
            query: PageQuery {
                category: self.category.clone(),
                limit: self.page_size,
                offset,
            },
        }
    }

    /// Whether `request` was issued for the category currently shown.
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.generation == self.generation
    }

    fn is_stale(&self, request: &PageRequest) -> bool {
        let stale = !self.is_current(request);
        if stale {
            tracing::debug!(
                generation = request.generation,
                current = self.generation,
                "Discarding feed page for a previous category"
            );
        }
        stale
    }

    /// Append articles whose id has not been seen. Returns the number added.
    fn merge(&mut self, incoming: Vec<Article>) -> usize {
        let before = self.items.len();
        for article in incoming {
            if self.seen.insert(article.id) {
                self.items.push(article);
            }
        }
        self.items.len() - before
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn items(&self) -> &[Article] {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Advisory total for display; never used to decide whether to load.
    pub fn total_estimate(&self) -> u64 {
        self.total_estimate
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Footer line under the list, or `None` when there is nothing to say
    /// (empty feed, or an initial page still pending).
    pub fn footer_text(&self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        if self.loading {
            return Some("Loading more articles...".to_string());
        }
        if self.has_more {
            Some(format!(
                "{} loaded of ~{}",
                self.items.len(),
                self.total_estimate.max(self.items.len() as u64)
            ))
        } else {
            Some(format!("All {} articles loaded", self.items.len()))
        }
    }
}
