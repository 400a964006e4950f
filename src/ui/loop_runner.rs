//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task completions and a periodic
//! tick that drives the search debounce, the theme refresh and the scroll
//! sentinel.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::{maybe_load_next_page, spawn_page_load, spawn_search, spawn_trending};
use super::input::handle_input;
use super::render::render;

/// Tick period; bounds the latency of debounced searches and status expiry.
const TICK_MILLIS: u64 = 250;

/// Result of handling a key press.
pub enum Action {
    /// Keep running.
    Continue,
    /// Restore the terminal and exit.
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Requests the first page of the selected category and the trending
/// topics before entering the loop. A panic hook restores the terminal before unwinding.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(TICK_MILLIS));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let request = app.start_category();
    spawn_page_load(app, request, true, &event_tx);
    spawn_trending(app, &event_tx);

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
            // Rendering updates the visible window the sentinel observes
            maybe_load_next_page(app, &event_tx);
        }

        // Apply finished tasks before more input so results are not starved
        // by fast typing
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(app, key.code, key.modifiers, &event_tx) {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal input error");
                        break;
                    }
                    None => break,
                }
            }

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
            }

            _ = tick_interval.tick() => {
                handle_tick(app, Instant::now(), &event_tx);
            }
        }
    }

    app.teardown();
    restore_terminal(terminal)?;
    Ok(())
}

/// Advance every timer-driven component to `now`.
fn handle_tick(app: &mut App, now: Instant, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.search.poll(now) {
        tracing::debug!(query = %request.query, token = request.token, "Debounce elapsed");
        app.needs_redraw = true;
        spawn_search(app, request, event_tx);
    }

    if app.theme.tick(now) {
        tracing::info!(theme = app.theme.resolved().name(), "Theme changed with time of day");
        app.sync_theme();
    }

    if app.trending_refresh.fire(now) {
        spawn_trending(app, event_tx);
    }

    maybe_load_next_page(app, event_tx);

    if app.clear_expired_status() {
        app.needs_redraw = true;
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
