use std::time::Duration;

use tokio::time::Instant;

use super::history::SearchHistory;
use crate::api::{ApiError, Article, ContentService, SearchPage};
use crate::config::Config;
use crate::timer::Debounce;

/// Tunables for [`SearchEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Quiet period after the last keystroke before a lookup is issued.
    pub debounce: Duration,
    /// Queries with fewer characters never reach the service.
    pub min_query_chars: usize,
    /// Maximum results requested per lookup.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
            limit: 10,
        }
    }
}

impl From<&Config> for SearchOptions {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.search_debounce(),
            min_query_chars: config.min_query_chars,
            limit: config.search_limit,
        }
    }
}

/// A lookup the engine wants issued.
///
/// The token is unique per request and increases monotonically; only the
/// most recent token is ever accepted back by
/// [`SearchEngine::apply_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: u64,
    pub query: String,
    pub limit: usize,
}

/// Search session state: query text, debounced remote lookup, results and
/// keyboard selection, plus the persisted query history.
pub struct SearchEngine {
    options: SearchOptions,
    query: String,
    results: Vec<Article>,
    total: u64,
    selected: Option<usize>,
    debounce: Debounce,
    last_token: u64,
    in_flight: Option<u64>,
    history: SearchHistory,
}

impl SearchEngine {
    pub fn new(history: SearchHistory, options: SearchOptions) -> Self {
        Self {
            debounce: Debounce::new(options.debounce),
            options,
            query: String::new(),
            results: Vec::new(),
            total: 0,
            selected: None,
            last_token: 0,
            in_flight: None,
            history,
        }
    }

    // ========================================================================
    // Query & lookup
    // ========================================================================

    /// Replace the query text and (re)start the quiet period.
    ///
    /// Results only ever describe the current text: a changed query drops
    /// them along with any in-flight lookup. Short queries also cancel the
    /// pending lookup.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        if text != self.query {
            self.results.clear();
            self.total = 0;
            self.in_flight = None;
        }
        self.query = text;
        self.selected = None;

        if self.query.chars().count() < self.options.min_query_chars {
            self.debounce.cancel();
            return;
        }
        self.debounce.schedule(now);
    }

    /// Emit the lookup for the settled query once its quiet period is over.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        if !self.debounce.fire(now) {
            return None;
        }
        self.last_token += 1;
        self.in_flight = Some(self.last_token);
        tracing::debug!(token = self.last_token, query = %self.query, "Issuing search");
        Some(SearchRequest {
            token: self.last_token,
            query: self.query.clone(),
            limit: self.options.limit,
        })
    }

    /// Apply the outcome of `request`. Returns false if it was stale.
    ///
    /// A failure leaves an empty result list rather than an error.
    pub fn apply_response(
        &mut self,
        request: &SearchRequest,
        result: Result<SearchPage, ApiError>,
    ) -> bool {
        if self.in_flight != Some(request.token) || request.query != self.query {
            tracing::debug!(
                token = request.token,
                query = %request.query,
                current = %self.query,
                "Discarding stale search response"
            );
            return false;
        }
        self.in_flight = None;
        self.selected = None;

        match result {
            Ok(page) => {
                self.total = page.total.max(page.results.len() as u64);
                self.results = page.results;
            }
            Err(e) => {
                tracing::warn!(query = %request.query, error = %e, "Search failed");
                self.results.clear();
                self.total = 0;
            }
        }
        true
    }

    /// Poll and, if a lookup is due, run it against `service` and apply the
    /// result. Returns whether results were updated.
    pub async fn poll_with<S: ContentService>(&mut self, service: &S, now: Instant) -> bool {
        let Some(request) = self.poll(now) else {
            return false;
        };
        let result = service.search(&request.query, request.limit).await;
        self.apply_response(&request, result)
    }

    /// Forget the in-flight lookup without a response (its task died).
    pub fn abandon_lookup(&mut self) {
        self.in_flight = None;
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() - 1;
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    pub fn select_previous(&mut self) {
        self.selected = match self.selected {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Record the query in history and return the selected article's URL,
    /// or `None` if nothing is selected.
    pub fn open_selected(&mut self) -> Option<String> {
        let url = self.selected_article()?.url.clone();
        self.history.record(&self.query);
        Some(url)
    }

    /// Reset the session. History is kept.
    pub fn close(&mut self) {
        self.query.clear();
        self.results.clear();
        self.total = 0;
        self.selected = None;
        self.debounce.cancel();
        self.in_flight = None;
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Run a remembered or suggested query: set it and record it at once.
    pub fn recall(&mut self, query: &str, now: Instant) {
        self.set_query(query, now);
        self.history.record(query);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Article] {
        &self.results
    }

    pub fn total_results(&self) -> u64 {
        self.total
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.selected.and_then(|i| self.results.get(i))
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// A lookup has been issued and its response not yet applied.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// A lookup is scheduled but its quiet period has not elapsed.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Whether the query is long enough to be searched.
    pub fn is_searchable(&self) -> bool {
        self.query.chars().count() >= self.options.min_query_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    fn engine() -> SearchEngine {
        SearchEngine::new(
            SearchHistory::load(MemoryStore::shared(), 5),
            SearchOptions::default(),
        )
    }

    fn article(id: i64) -> Article {
        Article {
            id,
            title: format!("Result {id}"),
            summary: String::new(),
            content: None,
            url: format!("https://example.com/{id}"),
            image_url: None,
            category: String::new(),
            source: String::new(),
            publish_date: None,
            quality_score: None,
            feed_score: None,
        }
    }

    fn results(ids: &[i64]) -> SearchPage {
        SearchPage {
            results: ids.iter().copied().map(article).collect(),
            total: ids.len() as u64,
        }
    }

    fn issued(engine: &mut SearchEngine, text: &str, now: Instant) -> SearchRequest {
        engine.set_query(text, now);
        engine.poll(now + 300 * MS).unwrap()
    }

    #[test]
    fn test_typing_inside_window_issues_one_request() {
        let t0 = Instant::now();
        let mut engine = engine();

        engine.set_query("a", t0);
        engine.set_query("ab", t0 + 100 * MS);

        assert_eq!(engine.poll(t0 + 300 * MS), None);
        let request = engine.poll(t0 + 400 * MS).unwrap();
        assert_eq!(request.query, "ab");
        assert_eq!(request.limit, 10);
        assert_eq!(engine.poll(t0 + 2000 * MS), None);
    }

    #[test]
    fn test_query_updates_immediately() {
        let mut engine = engine();
        engine.set_query("clim", Instant::now());
        assert_eq!(engine.query(), "clim");
        assert!(engine.is_pending());
        assert!(!engine.is_loading());
    }

    #[test]
    fn test_short_query_clears_without_request() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1, 2])));
        engine.select_next();

        engine.set_query("r", t0 + 500 * MS);
        assert!(engine.results().is_empty());
        assert_eq!(engine.selected_index(), None);
        assert_eq!(engine.poll(t0 + 5000 * MS), None);
    }

    #[test]
    fn test_short_query_cancels_pending_lookup() {
        let t0 = Instant::now();
        let mut engine = engine();
        engine.set_query("ru", t0);
        engine.set_query("r", t0 + 50 * MS);
        assert_eq!(engine.poll(t0 + 1000 * MS), None);
    }

    #[test]
    fn test_query_length_counts_characters() {
        let t0 = Instant::now();
        let mut engine = engine();
        // One char, multiple bytes
        engine.set_query("é", t0);
        assert_eq!(engine.poll(t0 + 300 * MS), None);
        engine.set_query("日本", t0);
        assert!(engine.poll(t0 + 300 * MS).is_some());
    }

    #[test]
    fn test_late_response_for_older_query_is_discarded() {
        let t0 = Instant::now();
        let mut engine = engine();

        let old = issued(&mut engine, "rust", t0);
        let new = issued(&mut engine, "rusty", t0 + 400 * MS);
        assert!(new.token > old.token);

        assert!(engine.apply_response(&new, Ok(results(&[7, 8]))));
        assert!(!engine.apply_response(&old, Ok(results(&[1, 2, 3]))));

        let ids: Vec<i64> = engine.results().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_response_after_query_edit_is_discarded() {
        let t0 = Instant::now();
        let mut engine = engine();

        let request = issued(&mut engine, "rust", t0);
        engine.set_query("rustc", t0 + 350 * MS);
        assert!(!engine.apply_response(&request, Ok(results(&[1]))));
        assert!(engine.results().is_empty());
    }

    #[test]
    fn test_same_text_retyped_still_rejects_old_token() {
        let t0 = Instant::now();
        let mut engine = engine();

        let first = issued(&mut engine, "rust", t0);
        engine.set_query("rusty", t0 + 350 * MS);
        let second = issued(&mut engine, "rust", t0 + 400 * MS);

        assert!(!engine.apply_response(&first, Ok(results(&[1]))));
        assert!(engine.apply_response(&second, Ok(results(&[2]))));
        assert_eq!(engine.results()[0].id, 2);
    }

    #[test]
    fn test_failure_clears_results() {
        let t0 = Instant::now();
        let mut engine = engine();

        let first = issued(&mut engine, "rust", t0);
        engine.apply_response(&first, Ok(results(&[1, 2])));

        let second = issued(&mut engine, "rust lang", t0 + 1000 * MS);
        assert!(engine.apply_response(&second, Err(ApiError::HttpStatus(502))));
        assert!(engine.results().is_empty());
        assert_eq!(engine.total_results(), 0);
        assert!(!engine.is_loading());
    }

    #[test]
    fn test_selection_clamps_without_wraparound() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1, 2, 3])));

        assert_eq!(engine.selected_index(), None);
        engine.select_previous();
        assert_eq!(engine.selected_index(), None);

        for _ in 0..5 {
            engine.select_next();
        }
        assert_eq!(engine.selected_index(), Some(2));

        engine.select_previous();
        engine.select_previous();
        engine.select_previous();
        assert_eq!(engine.selected_index(), None);
    }

    #[test]
    fn test_select_next_on_empty_results() {
        let mut engine = engine();
        engine.select_next();
        assert_eq!(engine.selected_index(), None);
    }

    #[test]
    fn test_query_change_resets_selection() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1, 2])));
        engine.select_next();

        engine.set_query("rust async", t0 + 500 * MS);
        assert_eq!(engine.selected_index(), None);
    }

    #[test]
    fn test_edited_query_drops_previous_results() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1, 2])));

        engine.set_query("python", t0 + 500 * MS);
        assert!(engine.results().is_empty());
        assert_eq!(engine.total_results(), 0);

        // Nothing from the "rust" lookup can be opened under "python"
        engine.select_next();
        assert_eq!(engine.open_selected(), None);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_edited_query_clears_in_flight_lookup() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        assert!(engine.is_loading());

        engine.set_query("rusty", t0 + 350 * MS);
        assert!(!engine.is_loading());
        assert!(engine.is_pending());
        assert!(!engine.apply_response(&request, Ok(results(&[1]))));
    }

    #[test]
    fn test_unchanged_query_keeps_results() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1, 2])));

        engine.set_query("rust", t0 + 500 * MS);
        assert_eq!(engine.results().len(), 2);
    }

    #[test]
    fn test_open_selected_records_history_and_returns_url() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[4, 5])));

        assert_eq!(engine.open_selected(), None);
        assert!(engine.history().is_empty());

        engine.select_next();
        engine.select_next();
        assert_eq!(
            engine.open_selected().as_deref(),
            Some("https://example.com/5")
        );
        assert_eq!(engine.history(), ["rust"]);
    }

    #[test]
    fn test_close_keeps_history() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(&request, Ok(results(&[1])));
        engine.select_next();
        engine.open_selected();

        let pending = issued(&mut engine, "tokio", t0 + 1000 * MS);
        engine.close();

        assert_eq!(engine.query(), "");
        assert!(engine.results().is_empty());
        assert_eq!(engine.selected_index(), None);
        assert!(!engine.is_loading());
        assert_eq!(engine.history(), ["rust"]);
        assert!(!engine.apply_response(&pending, Ok(results(&[9]))));
    }

    #[test]
    fn test_recall_sets_query_and_records() {
        let t0 = Instant::now();
        let mut engine = engine();
        engine.recall("Climate Change", t0);

        assert_eq!(engine.query(), "Climate Change");
        assert_eq!(engine.history(), ["Climate Change"]);
        assert_eq!(
            engine.poll(t0 + 300 * MS).map(|r| r.query).as_deref(),
            Some("Climate Change")
        );
    }

    #[test]
    fn test_clear_history() {
        let mut engine = engine();
        engine.recall("markets", Instant::now());
        engine.clear_history();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_total_falls_back_to_result_count() {
        let t0 = Instant::now();
        let mut engine = engine();
        let request = issued(&mut engine, "rust", t0);
        engine.apply_response(
            &request,
            Ok(SearchPage {
                results: vec![article(1), article(2)],
                total: 0,
            }),
        );
        assert_eq!(engine.total_results(), 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn selection_stays_in_bounds(
                count in 0usize..8,
                moves in proptest::collection::vec(any::<bool>(), 0..32),
            ) {
                let t0 = Instant::now();
                let mut engine = engine();
                let request = issued(&mut engine, "query", t0);
                let ids: Vec<i64> = (0..count as i64).collect();
                engine.apply_response(&request, Ok(results(&ids)));

                for forward in moves {
                    if forward { engine.select_next() } else { engine.select_previous() }
                    if let Some(i) = engine.selected_index() {
                        prop_assert!(i < count);
                    }
                }
            }

            #[test]
            fn short_queries_never_issue(text in "\\PC{0,1}") {
                let t0 = Instant::now();
                let mut engine = engine();
                engine.set_query(text, t0);
                prop_assert!(engine.poll(t0 + 10_000 * MS).is_none());
                prop_assert!(engine.results().is_empty());
            }
        }
    }
}
