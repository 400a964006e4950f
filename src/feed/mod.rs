//! Incremental article feed for one category filter.
//!
//! - [`FeedController`] owns the cumulative list, the pagination cursor and
//!   the single outstanding request
//! - [`ScrollSentinel`] decides when the visible window is close enough to
//!   the end to ask for the next page

mod controller;
mod sentinel;

pub use controller::{FeedController, PageRequest};
pub use sentinel::ScrollSentinel;
