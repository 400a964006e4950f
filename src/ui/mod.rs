//! Terminal user interface.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task completions
//! - `helpers` - Task spawning and browser opening
//! - `render` - View dispatch
//! - `articles` - Article list with load-more footer
//! - `categories` - Category bar
//! - `search` - Search overlay
//! - `status` - Status bar
//! - `trending` - Trending topics pane

mod articles;
mod categories;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod search;
mod status;
mod trending;

pub use loop_runner::{run, Action};
