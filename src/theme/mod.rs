//! Light/dark theming.
//!
//! [`ThemeScheduler`] decides which [`ThemeVariant`] is shown: a manual
//! choice, or the time of day in auto mode. [`palette`] maps each variant to
//! concrete ratatui styles.

pub mod palette;
mod scheduler;

pub use palette::{ColorPalette, StyleMap, ThemeVariant};
pub use scheduler::{resolve, DayWindow, ThemeMode, ThemeOptions, ThemeScheduler};
