//! Keyboard input dispatch.
//!
//! The search overlay captures all keys while open; otherwise keys go to the
//! feed or saved view.

use crate::app::{App, AppEvent, View};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::helpers::{open_in_browser, spawn_page_load};
use super::Action;

/// Longest query accepted from the keyboard.
const MAX_QUERY_CHARS: usize = 256;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.search_open {
        handle_search_input(app, code, modifiers);
        return Action::Continue;
    }
    handle_list_input(app, code, modifiers, event_tx)
}

/// Keys shared by the feed and saved views.
fn handle_list_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let now = Instant::now();
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,

        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => match app.view {
            View::Feed => app.selected_article = 0,
            View::Saved => app.selected_saved = 0,
        },

        KeyCode::Tab if app.view == View::Feed => {
            let request = app.next_category();
            spawn_page_load(app, request, true, event_tx);
        }
        KeyCode::BackTab if app.view == View::Feed => {
            let request = app.prev_category();
            spawn_page_load(app, request, true, event_tx);
        }
        // 1-9 pick the first nine trending topics, 0 the tenth
        KeyCode::Char(c @ '0'..='9') if app.view == View::Feed => {
            let rank = c.to_digit(10).map_or(0, |d| (d as usize + 9) % 10);
            if let Some(request) = app.select_trending(rank) {
                spawn_page_load(app, request, true, event_tx);
            }
        }

        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('s') => {
            app.toggle_bookmark();
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            if let Some(url) = app.selected().map(|a| a.url.clone()) {
                open_in_browser(app, &url);
            }
        }
        KeyCode::Char('b') => app.toggle_saved_view(),
        KeyCode::Esc if app.view == View::Saved => app.toggle_saved_view(),
        KeyCode::Char('t') => app.toggle_theme(now),
        KeyCode::Char('T') => app.cycle_theme_mode(now),
        _ => {}
    }
    Action::Continue
}

/// Keys while the search overlay is open.
fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let now = Instant::now();
    match code {
        KeyCode::Esc => app.close_search(),

        KeyCode::Char('x') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.search.clear_history();
            app.suggestion_selected = None;
            app.set_status("Search history cleared");
        }

        KeyCode::Down => {
            if app.search.query().is_empty() {
                app.next_suggestion();
            } else {
                app.search.select_next();
            }
        }
        KeyCode::Up => {
            if app.search.query().is_empty() {
                app.prev_suggestion();
            } else {
                app.search.select_previous();
            }
        }

        KeyCode::Enter => {
            if app.search.query().is_empty() {
                if let Some(query) = app.selected_suggestion().map(str::to_owned) {
                    app.suggestion_selected = None;
                    app.search.recall(&query, now);
                }
            } else if let Some(url) = app.search.open_selected() {
                open_in_browser(app, &url);
                app.close_search();
            }
        }

        KeyCode::Backspace => {
            let mut query = app.search.query().to_string();
            query.pop();
            app.search.set_query(query, now);
        }

        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.search.query().chars().count() < MAX_QUERY_CHARS {
                let mut query = app.search.query().to_string();
                query.push(c);
                app.suggestion_selected = None;
                app.search.set_query(query, now);
            }
        }
        _ => {}
    }
    app.needs_redraw = true;
}
