//! Small helpers shared by the terminal views.
//!
//! - **Text**: width-aware truncation and control-character stripping for
//!   service-supplied strings
//! - **Time**: compact relative publish times
//! - **URLs**: validation before anything is opened in a browser

mod text;
mod time;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width};
pub use time::format_relative;
pub use url_validator::{is_local_host, validate_url_for_open, UrlValidationError};
