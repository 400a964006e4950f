//! Applies background task completions to application state.

use crate::app::{App, AppEvent};

/// Route a completed task result to the component that issued it.
///
/// Every component filters stale results itself (feed generation, search
/// token). Task handles are only released by the result they belong to.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::InitialPageLoaded { request, result } => {
            // A stale page must not release the handle of the current load
            if app.feed.is_current(&request) {
                app.feed_handle = None;
            }
            if let Err(e) = app.feed.complete_initial(&request, result) {
                app.set_status(format!("Could not load articles: {e}"));
            }
            app.clamp_selections();
        }

        AppEvent::PageLoaded { request, result } => {
            if app.feed.is_current(&request) {
                app.feed_handle = None;
            }
            match app.feed.complete_load(&request, result) {
                Ok(added) => tracing::debug!(added, "Feed extended"),
                Err(e) => app.set_status(format!("Stopped loading: {e}")),
            }
        }

        AppEvent::SearchCompleted { request, result } => {
            if app.search.apply_response(&request, result) {
                app.search_handle = None;
            }
        }

        AppEvent::TrendingLoaded { result } => {
            app.trending_handle = None;
            app.set_trending(result);
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            match task {
                // Unblock the loading guard; the feed stops paging like any failure
                "page_load" => {
                    app.feed_handle = None;
                    app.feed.abandon_load();
                }
                "search" => {
                    app.search_handle = None;
                    app.search.abandon_lookup();
                }
                "trending" => {
                    app.trending_handle = None;
                    app.trending.clear();
                }
                _ => {}
            }
            app.set_status(format!("Internal error in {task}"));
        }
    }
    app.needs_redraw = true;
}
