//! Background task spawning shared by the input handlers and the tick.

use crate::app::{App, AppEvent};
use crate::feed::PageRequest;
use crate::search::SearchRequest;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Run `future`, turning a panic into `Err(message)`.
///
/// Spawned tasks report panics through `AppEvent::TaskPanicked` instead of
/// disappearing silently, so the owning component can clear its loading
/// state.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

async fn send(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, "Failed to send task result (receiver dropped)");
    }
}

/// Fetch the page for `request` in the background.
///
/// `initial` marks the first page of a category switch, which seeds the feed
/// instead of extending it.
pub(super) fn spawn_page_load(
    app: &mut App,
    request: PageRequest,
    initial: bool,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let api = app.api.clone();
    let tx = event_tx.clone();

    tracing::debug!(
        offset = request.query.offset,
        category = ?request.query.category,
        initial,
        "Spawning page load"
    );

    app.feed_handle = Some(tokio::spawn(async move {
        let outcome = catch_task_panic(api.fetch_page(&request.query)).await;
        match outcome {
            Ok(result) => {
                let event = if initial {
                    AppEvent::InitialPageLoaded { request, result }
                } else {
                    AppEvent::PageLoaded { request, result }
                };
                send(&tx, event).await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Page load task panicked");
                send(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "page_load",
                        error,
                    },
                )
                .await;
            }
        }
    }));
}

/// Run `request` against the search endpoint in the background, aborting
/// any search still in flight.
pub(super) fn spawn_search(
    app: &mut App,
    request: SearchRequest,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if let Some(handle) = app.search_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous search task");
    }

    let api = app.api.clone();
    let tx = event_tx.clone();

    app.search_handle = Some(tokio::spawn(async move {
        let outcome = catch_task_panic(api.search(&request.query, request.limit)).await;
        match outcome {
            Ok(result) => send(&tx, AppEvent::SearchCompleted { request, result }).await,
            Err(error) => {
                tracing::error!(error = %error, "Search task panicked");
                send(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "search",
                        error,
                    },
                )
                .await;
            }
        }
    }));
}

/// Fetch the trending topics in the background unless a fetch is already
/// outstanding.
pub(super) fn spawn_trending(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.trending_handle.as_ref().is_some_and(|h| !h.is_finished()) {
        tracing::debug!("Trending fetch still running, skipping refresh");
        return;
    }

    let api = app.api.clone();
    let tx = event_tx.clone();

    app.trending_handle = Some(tokio::spawn(async move {
        match catch_task_panic(api.trending()).await {
            Ok(result) => send(&tx, AppEvent::TrendingLoaded { result }).await,
            Err(error) => {
                tracing::error!(error = %error, "Trending task panicked");
                send(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "trending",
                        error,
                    },
                )
                .await;
            }
        }
    }));
}

/// Ask the next page of the feed if the visible window is near its end.
pub(super) fn maybe_load_next_page(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if !app.wants_next_page() {
        return;
    }
    if let Some(request) = app.feed.begin_load() {
        app.needs_redraw = true;
        spawn_page_load(app, request, false, event_tx);
    }
}

/// Validate and open `url` in the system browser, reporting on the status bar.
pub(super) fn open_in_browser(app: &mut App, url: &str) {
    match validate_url_for_open(url) {
        Ok(valid) => match open::that(valid.as_str()) {
            Ok(()) => app.set_status("Opened in browser"),
            Err(e) => {
                tracing::warn!(url = %valid, error = %e, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {e}"));
            }
        },
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Refusing to open article URL");
            app.set_status(format!("Cannot open: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result: Result<i32, String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }
}
