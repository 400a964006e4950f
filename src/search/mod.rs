//! Debounced article search with keyboard selection and persisted history.

mod engine;
mod history;

pub use engine::{SearchEngine, SearchOptions, SearchRequest};
pub use history::SearchHistory;
