//! briefing: a terminal news client.
//!
//! The interesting state lives in four owned components, each constructed
//! with its collaborators injected:
//!
//! - [`feed::FeedController`] - incremental, deduplicated, category-filtered pagination
//! - [`search::SearchEngine`] - debounced lookup, keyboard selection, persisted history
//! - [`theme::ThemeScheduler`] - auto/light/dark mode with a time-of-day refresh
//! - [`bookmarks::BookmarkStore`] - write-through saved-article set
//!
//! [`storage`] provides the synchronous key-value store they persist into and
//! [`api`] the remote content service they read from. The [`ui`] module is a
//! thin ratatui driver around them.

pub mod api;
pub mod app;
pub mod bookmarks;
pub mod clock;
pub mod config;
pub mod feed;
pub mod search;
pub mod storage;
pub mod theme;
pub mod timer;
pub mod ui;
pub mod util;
