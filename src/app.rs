//! Application state shared by the event loop, input handlers and renderers.

use std::borrow::Cow;
use std::sync::Arc;

use ratatui::style::Style;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ApiClient, ApiError, Article, ArticlePage, SearchPage, TrendingTopic};
use crate::bookmarks::BookmarkStore;
use crate::clock::WallClock;
use crate::config::Config;
use crate::feed::{FeedController, PageRequest, ScrollSentinel};
use crate::search::{SearchEngine, SearchHistory, SearchOptions, SearchRequest};
use crate::storage::SharedStore;
use crate::theme::{StyleMap, ThemeOptions, ThemeScheduler};
use crate::timer::RepeatingTimer;

/// Label of the unfiltered category.
pub const ALL_CATEGORIES: &str = "All";

/// How long a status message stays on screen.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Views & Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Category bar, article list and load-more footer.
    Feed,
    /// Bookmarked articles.
    Saved,
}

/// Completions reported by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// First page for a category switch.
    InitialPageLoaded {
        request: PageRequest,
        result: Result<ArticlePage, ApiError>,
    },
    /// A follow-up page requested by the scroll sentinel.
    PageLoaded {
        request: PageRequest,
        result: Result<ArticlePage, ApiError>,
    },
    SearchCompleted {
        request: SearchRequest,
        result: Result<SearchPage, ApiError>,
    },
    TrendingLoaded {
        result: Result<Vec<TrendingTopic>, ApiError>,
    },
    /// A background task panicked instead of reporting.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub config: Config,
    pub api: ApiClient,

    // Core components
    pub feed: FeedController,
    pub sentinel: ScrollSentinel,
    pub search: SearchEngine,
    pub theme: ThemeScheduler,
    pub bookmarks: BookmarkStore,

    /// Styles for the currently resolved theme.
    pub styles: StyleMap,

    // UI state
    pub view: View,
    pub search_open: bool,
    /// Highlighted entry of [`App::suggestions`] while the query is empty.
    pub suggestion_selected: Option<usize>,
    /// 0 is "All"; `n` is `config.categories[n - 1]`.
    pub category_index: usize,
    /// Trending topic shown instead of `category_index` when it names no
    /// configured category.
    pub topic_filter: Option<String>,
    /// Latest trending topics; empty until loaded or after a failure.
    pub trending: Vec<TrendingTopic>,
    pub trending_refresh: RepeatingTimer,
    pub selected_article: usize,
    pub selected_saved: usize,
    pub scroll_offset: usize,
    /// Rows the article list showed at the last render.
    pub visible_rows: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    /// Outstanding page fetch; at most one because of the feed's loading guard.
    pub feed_handle: Option<JoinHandle<()>>,
    /// Outstanding search; replaced (and aborted) when a newer one starts.
    pub search_handle: Option<JoinHandle<()>>,
    pub trending_handle: Option<JoinHandle<()>>,
}

impl App {
    /// Build the application around `store` and `clock`.
    ///
    /// `category` selects the initial filter by name; unknown names fall back
    /// to "All". No request is issued here; see [`App::start_category`].
    pub fn new(
        config: Config,
        api: ApiClient,
        store: SharedStore,
        clock: Arc<dyn WallClock>,
        category: Option<&str>,
    ) -> Self {
        let now = Instant::now();
        let theme = ThemeScheduler::load(
            Arc::clone(&store),
            clock,
            ThemeOptions::from(&config),
            now,
        );
        let search = SearchEngine::new(
            SearchHistory::load(Arc::clone(&store), config.history_limit),
            SearchOptions::from(&config),
        );
        let bookmarks = BookmarkStore::load(store);

        let category_index = category
            .and_then(|name| {
                config
                    .categories
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(name))
            })
            .map_or(0, |i| i + 1);
        if let (Some(name), 0) = (category, category_index) {
            tracing::warn!(category = %name, "Unknown category, showing all");
        }

        let feed = FeedController::new(None, config.page_size);
        let sentinel = ScrollSentinel::new(config.load_margin_rows);
        let styles = StyleMap::from(theme.resolved());
        let mut trending_refresh = RepeatingTimer::new(config.trending_refresh());
        trending_refresh.start(now);

        Self {
            config,
            api,
            feed,
            sentinel,
            search,
            theme,
            bookmarks,
            styles,
            view: View::Feed,
            search_open: false,
            suggestion_selected: None,
            category_index,
            topic_filter: None,
            trending: Vec::new(),
            trending_refresh,
            selected_article: 0,
            selected_saved: 0,
            scroll_offset: 0,
            visible_rows: 0,
            status_message: None,
            needs_redraw: true,
            feed_handle: None,
            search_handle: None,
            trending_handle: None,
        }
    }

    pub fn style(&self, role: &str) -> Style {
        self.styles.resolve(role)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// "All" followed by the configured categories.
    pub fn category_labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ALL_CATEGORIES).chain(self.config.categories.iter().map(String::as_str))
    }

    /// Filter value for the selected category (`None` for "All").
    pub fn current_category(&self) -> Option<String> {
        if let Some(topic) = &self.topic_filter {
            return Some(topic.clone());
        }
        self.category_index
            .checked_sub(1)
            .and_then(|i| self.config.categories.get(i))
            .cloned()
    }

    /// Reset the feed for the selected category and return the request for
    /// its first page.
    pub fn start_category(&mut self) -> PageRequest {
        if let Some(handle) = self.feed_handle.take() {
            handle.abort();
        }
        self.selected_article = 0;
        self.scroll_offset = 0;
        self.needs_redraw = true;
        let category = self.current_category();
        tracing::debug!(category = ?category, "Switching category");
        self.feed.switch_category(category)
    }

    pub fn next_category(&mut self) -> PageRequest {
        self.topic_filter = None;
        let count = self.config.categories.len() + 1;
        self.category_index = (self.category_index + 1) % count;
        self.start_category()
    }

    pub fn prev_category(&mut self) -> PageRequest {
        self.topic_filter = None;
        let count = self.config.categories.len() + 1;
        self.category_index = (self.category_index + count - 1) % count;
        self.start_category()
    }

    // ========================================================================
    // Trending
    // ========================================================================

    /// Switch the feed to the trending topic at `rank` (0-based).
    ///
    /// A topic naming a configured category selects that tab; any other topic
    /// becomes an ad-hoc filter. Returns the first-page request, or `None`
    /// when there is no topic at `rank`.
    pub fn select_trending(&mut self, rank: usize) -> Option<PageRequest> {
        let topic = self.trending.get(rank)?.topic.clone();
        match self
            .config
            .categories
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&topic))
        {
            Some(i) => {
                self.category_index = i + 1;
                self.topic_filter = None;
            }
            None => self.topic_filter = Some(topic),
        }
        Some(self.start_category())
    }

    /// Replace the trending list. A failure leaves it empty.
    pub fn set_trending(&mut self, result: Result<Vec<TrendingTopic>, ApiError>) {
        match result {
            Ok(topics) => {
                tracing::debug!(count = topics.len(), "Trending topics updated");
                self.trending = topics;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Trending topics unavailable");
                self.trending.clear();
            }
        }
        self.needs_redraw = true;
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Articles in the active view.
    pub fn visible_articles(&self) -> &[Article] {
        match self.view {
            View::Feed => self.feed.items(),
            View::Saved => self.bookmarks.articles(),
        }
    }

    pub fn selected_index(&self) -> usize {
        match self.view {
            View::Feed => self.selected_article,
            View::Saved => self.selected_saved,
        }
    }

    pub fn selected(&self) -> Option<&Article> {
        self.visible_articles().get(self.selected_index())
    }

    pub fn nav_down(&mut self) {
        let len = self.visible_articles().len();
        let selected = match self.view {
            View::Feed => &mut self.selected_article,
            View::Saved => &mut self.selected_saved,
        };
        if *selected + 1 < len {
            *selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        let selected = match self.view {
            View::Feed => &mut self.selected_article,
            View::Saved => &mut self.selected_saved,
        };
        *selected = selected.saturating_sub(1);
    }

    /// Keep selections inside their lists (the saved list can shrink).
    pub fn clamp_selections(&mut self) {
        let feed_len = self.feed.items().len();
        self.selected_article = self.selected_article.min(feed_len.saturating_sub(1));
        let saved_len = self.bookmarks.len();
        self.selected_saved = self.selected_saved.min(saved_len.saturating_sub(1));
    }

    /// Scroll so the selected row is visible in `rows` rows.
    pub fn follow_selection(&mut self, rows: usize) {
        self.visible_rows = rows;
        if rows == 0 {
            return;
        }
        let selected = self.selected_article;
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + rows {
            self.scroll_offset = selected + 1 - rows;
        }
    }

    /// Index one past the last feed row shown.
    pub fn visible_end(&self) -> usize {
        (self.scroll_offset + self.visible_rows).min(self.feed.items().len())
    }

    /// Whether the scroll sentinel wants the next page.
    pub fn wants_next_page(&self) -> bool {
        self.view == View::Feed && self.sentinel.should_load(self.visible_end(), &self.feed)
    }

    pub fn toggle_saved_view(&mut self) {
        self.view = match self.view {
            View::Feed => View::Saved,
            View::Saved => View::Feed,
        };
        // The sentinel only observes the feed list
        if self.view == View::Feed {
            self.sentinel.attach();
        } else {
            self.sentinel.detach();
        }
        self.clamp_selections();
        self.needs_redraw = true;
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Toggle the bookmark on the selected article. Returns the new
    /// membership, or `None` with nothing selected.
    pub fn toggle_bookmark(&mut self) -> Option<bool> {
        let article = self.selected()?.clone();
        let saved = self.bookmarks.toggle(&article);
        self.clamp_selections();
        self.set_status(if saved { "Saved" } else { "Removed from saved" });
        Some(saved)
    }

    // ========================================================================
    // Theme
    // ========================================================================

    /// Rebuild styles after the resolved theme changed.
    pub fn sync_theme(&mut self) {
        self.styles = StyleMap::from(self.theme.resolved());
        self.needs_redraw = true;
    }

    pub fn toggle_theme(&mut self, now: Instant) {
        let mode = self.theme.toggle(now);
        self.sync_theme();
        self.set_status(format!("Theme: {}", mode.as_str()));
    }

    pub fn cycle_theme_mode(&mut self, now: Instant) {
        let mode = self.theme.cycle_mode(now);
        self.sync_theme();
        self.set_status(format!(
            "Theme: {} ({})",
            mode.as_str(),
            self.theme.resolved().name()
        ));
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub fn open_search(&mut self) {
        self.search_open = true;
        self.needs_redraw = true;
    }

    pub fn close_search(&mut self) {
        self.search.close();
        self.suggestion_selected = None;
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
        }
        self.search_open = false;
        self.needs_redraw = true;
    }

    /// Recent searches followed by configured suggestions not already among
    /// them.
    pub fn suggestions(&self) -> Vec<&str> {
        let history = self.search.history();
        let mut items: Vec<&str> = history.iter().map(String::as_str).collect();
        items.extend(
            self.config
                .suggested_searches
                .iter()
                .filter(|s| !history.iter().any(|h| h.eq_ignore_ascii_case(s.as_str())))
                .map(String::as_str),
        );
        items
    }

    pub fn selected_suggestion(&self) -> Option<&str> {
        self.suggestion_selected
            .and_then(|i| self.suggestions().get(i).copied())
    }

    pub fn next_suggestion(&mut self) {
        let len = self.suggestions().len();
        if len == 0 {
            return;
        }
        self.suggestion_selected = Some(match self.suggestion_selected {
            None => 0,
            Some(i) => (i + 1).min(len - 1),
        });
    }

    pub fn prev_suggestion(&mut self) {
        self.suggestion_selected = match self.suggestion_selected {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message once it has expired. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Stop timers and observers before exit.
    pub fn teardown(&mut self) {
        self.sentinel.detach();
        self.trending_refresh.stop();
        self.theme.teardown();
        self.search.close();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.feed_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page load task on App drop");
        }
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
            tracing::debug!("Aborted search task on App drop");
        }
        if let Some(handle) = self.trending_handle.take() {
            handle.abort();
            tracing::debug!("Aborted trending task on App drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use crate::theme::{ThemeMode, ThemeVariant};
    use tokio::time::{self, Duration};

    fn article(id: i64) -> Article {
        Article {
            id,
            title: format!("Article {id}"),
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

    fn test_app_at(hour: u32) -> App {
        let config = Config::default();
        let api = ApiClient::new(&config.api_base_url).unwrap();
        App::new(
            config,
            api,
            MemoryStore::shared(),
            Arc::new(FixedClock::at(hour, 0)),
            None,
        )
    }

    fn test_app() -> App {
        test_app_at(10)
    }

    fn seeded(app: &mut App, count: i64, has_more: bool) {
        app.feed.reset(
            None,
            ArticlePage {
                articles: (1..=count).map(article).collect(),
                total: None,
                has_more,
            },
        );
    }

    #[tokio::test]
    async fn test_initial_category_by_name() {
        let config = Config::default();
        let api = ApiClient::new(&config.api_base_url).unwrap();
        let app = App::new(
            config,
            api,
            MemoryStore::shared(),
            Arc::new(FixedClock::at(10, 0)),
            Some("science"),
        );
        assert_eq!(app.current_category().as_deref(), Some("Science"));
    }

    #[tokio::test]
    async fn test_category_cycle_wraps_through_all() {
        let mut app = test_app();
        let count = app.config.categories.len() + 1;
        assert_eq!(app.current_category(), None);

        let request = app.next_category();
        assert_eq!(request.query.category.as_deref(), Some("World"));
        assert_eq!(request.query.offset, 0);

        for _ in 1..count {
            app.next_category();
        }
        assert_eq!(app.category_index, 0);

        let request = app.prev_category();
        assert_eq!(request.query.category.as_deref(), Some("Education"));
        assert_eq!(app.category_labels().count(), count);
    }

    fn topics(names: &[&str]) -> Vec<TrendingTopic> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| TrendingTopic {
                topic: name.to_string(),
                article_count: 20 - i as u64,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_trending_topic_matching_category_selects_tab() {
        let mut app = test_app();
        app.set_trending(Ok(topics(&["Markets", "science"])));

        let request = app.select_trending(1).unwrap();
        assert_eq!(request.query.category.as_deref(), Some("Science"));
        assert_eq!(request.query.offset, 0);
        assert_eq!(app.topic_filter, None);
        assert_eq!(app.current_category().as_deref(), Some("Science"));
    }

    #[tokio::test]
    async fn test_trending_topic_outside_categories_filters_by_topic() {
        let mut app = test_app();
        seeded(&mut app, 5, false);
        app.selected_article = 3;
        app.set_trending(Ok(topics(&["Markets"])));

        let request = app.select_trending(0).unwrap();
        assert_eq!(request.query.category.as_deref(), Some("Markets"));
        assert!(app.feed.items().is_empty());
        assert_eq!(app.selected_article, 0);

        // Tabbing away drops the ad-hoc filter
        let request = app.next_category();
        assert_eq!(app.topic_filter, None);
        assert_eq!(request.query.category.as_deref(), Some("World"));
    }

    #[tokio::test]
    async fn test_select_trending_out_of_range() {
        let mut app = test_app();
        assert!(app.select_trending(0).is_none());
        assert!(!app.feed.loading());
    }

    #[tokio::test]
    async fn test_failed_trending_load_empties_list() {
        let mut app = test_app();
        app.set_trending(Ok(topics(&["Markets", "Chips"])));
        assert_eq!(app.trending.len(), 2);

        app.set_trending(Err(ApiError::HttpStatus(503)));
        assert!(app.trending.is_empty());
    }

    #[tokio::test]
    async fn test_category_switch_resets_selection() {
        let mut app = test_app();
        seeded(&mut app, 20, true);
        app.selected_article = 12;
        app.scroll_offset = 5;

        app.next_category();
        assert_eq!(app.selected_article, 0);
        assert_eq!(app.scroll_offset, 0);
        assert!(app.feed.items().is_empty());
    }

    #[tokio::test]
    async fn test_nav_clamps_to_list() {
        let mut app = test_app();
        app.nav_up();
        assert_eq!(app.selected_article, 0);

        seeded(&mut app, 3, false);
        for _ in 0..10 {
            app.nav_down();
        }
        assert_eq!(app.selected_article, 2);
    }

    #[tokio::test]
    async fn test_follow_selection_scrolls_window() {
        let mut app = test_app();
        seeded(&mut app, 20, true);
        app.selected_article = 12;
        app.follow_selection(5);
        assert_eq!(app.scroll_offset, 8);
        assert_eq!(app.visible_end(), 13);

        app.selected_article = 3;
        app.follow_selection(5);
        assert_eq!(app.scroll_offset, 3);
    }

    #[tokio::test]
    async fn test_sentinel_triggers_near_end_only_in_feed_view() {
        let mut app = test_app();
        seeded(&mut app, 20, true);
        app.follow_selection(10);
        assert!(!app.wants_next_page());

        app.selected_article = 19;
        app.follow_selection(10);
        assert!(app.wants_next_page());

        app.toggle_saved_view();
        assert!(!app.wants_next_page());
        app.toggle_saved_view();
        assert!(app.wants_next_page());
    }

    #[tokio::test]
    async fn test_toggle_bookmark_on_selection() {
        let mut app = test_app();
        assert_eq!(app.toggle_bookmark(), None);

        seeded(&mut app, 3, false);
        app.nav_down();
        assert_eq!(app.toggle_bookmark(), Some(true));
        assert!(app.bookmarks.is_bookmarked(2));

        app.toggle_saved_view();
        assert_eq!(app.selected().map(|a| a.id), Some(2));
        assert_eq!(app.toggle_bookmark(), Some(false));
        assert!(app.selected().is_none());
    }

    #[tokio::test]
    async fn test_toggle_theme_rebuilds_styles() {
        let mut app = test_app_at(10);
        assert_eq!(app.theme.resolved(), ThemeVariant::Light);
        let light = app.style("status_bar");

        app.toggle_theme(Instant::now());
        assert_eq!(app.theme.mode(), ThemeMode::Dark);
        assert_ne!(app.style("status_bar"), light);
    }

    #[tokio::test]
    async fn test_close_search_keeps_history() {
        let mut app = test_app();
        app.open_search();
        app.search.recall("Politics", Instant::now());
        app.close_search();
        assert!(!app.search_open);
        assert_eq!(app.search.query(), "");
        assert_eq!(app.search.history(), ["Politics"]);
    }

    #[tokio::test]
    async fn test_suggestions_put_history_first_without_duplicates() {
        let mut app = test_app();
        app.search.recall("politics", Instant::now());
        app.search.recall("rust", Instant::now());

        let suggestions = app.suggestions();
        assert_eq!(&suggestions[..3], ["rust", "politics", "Climate Change"]);
        assert!(!suggestions.contains(&"Politics"));

        app.next_suggestion();
        app.next_suggestion();
        assert_eq!(app.selected_suggestion(), Some("politics"));
        app.prev_suggestion();
        app.prev_suggestion();
        assert_eq!(app.selected_suggestion(), None);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
