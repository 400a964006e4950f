use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use tokio::time::Instant;

use super::ThemeVariant;
use crate::clock::WallClock;
use crate::config::Config;
use crate::storage::{persist, SharedStore, THEME_MODE_KEY};
use crate::timer::RepeatingTimer;

// ============================================================================
// Mode
// ============================================================================

/// Reader-chosen theme mode. Persisted as its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored mode name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Auto → Light → Dark → Auto.
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::Auto,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Local hours `[start_hour, end_hour)` that auto mode treats as daytime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 18,
        }
    }
}

impl DayWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        (self.start_hour..self.end_hour).contains(&time.hour())
    }

    pub fn resolve(&self, mode: ThemeMode, now: NaiveTime) -> ThemeVariant {
        match mode {
            ThemeMode::Light => ThemeVariant::Light,
            ThemeMode::Dark => ThemeVariant::Dark,
            ThemeMode::Auto if self.contains(now) => ThemeVariant::Light,
            ThemeMode::Auto => ThemeVariant::Dark,
        }
    }
}

/// Resolve `mode` at local time `now` with the default 06:00–18:00 day.
pub fn resolve(mode: ThemeMode, now: NaiveTime) -> ThemeVariant {
    DayWindow::default().resolve(mode, now)
}

// ============================================================================
// Scheduler
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeOptions {
    pub day: DayWindow,
    /// Re-check interval while in auto mode.
    pub refresh: Duration,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            day: DayWindow::default(),
            refresh: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for ThemeOptions {
    fn from(config: &Config) -> Self {
        Self {
            day: DayWindow {
                start_hour: config.day_start_hour,
                end_hour: config.day_end_hour,
            },
            refresh: config.theme_refresh(),
        }
    }
}

/// Owns the persisted mode and the resolved shade derived from it.
///
/// While the mode is auto a repeating timer re-resolves against the wall
/// clock, so a day/night boundary is picked up without a restart.
pub struct ThemeScheduler {
    store: SharedStore,
    clock: Arc<dyn WallClock>,
    options: ThemeOptions,
    mode: ThemeMode,
    resolved: ThemeVariant,
    refresh: RepeatingTimer,
}

impl ThemeScheduler {
    /// Load the persisted mode (default auto) and resolve it immediately.
    pub fn load(
        store: SharedStore,
        clock: Arc<dyn WallClock>,
        options: ThemeOptions,
        now: Instant,
    ) -> Self {
        let mode = match persist::load_string(store.as_ref(), THEME_MODE_KEY) {
            Some(raw) => ThemeMode::from_str_name(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown stored theme mode, using auto");
                ThemeMode::Auto
            }),
            None => ThemeMode::Auto,
        };

        let resolved = options.day.resolve(mode, clock.local_time());
        let mut scheduler = Self {
            store,
            clock,
            options,
            mode,
            resolved,
            refresh: RepeatingTimer::new(options.refresh),
        };
        scheduler.arm(now);
        tracing::debug!(mode = mode.as_str(), resolved = resolved.name(), "Theme loaded");
        scheduler
    }

    /// Persist `mode` and re-resolve at once.
    pub fn set_mode(&mut self, mode: ThemeMode, now: Instant) -> ThemeVariant {
        self.mode = mode;
        persist::save_string(self.store.as_ref(), THEME_MODE_KEY, mode.as_str());
        self.resolved = self.options.day.resolve(mode, self.clock.local_time());
        self.arm(now);
        tracing::info!(mode = mode.as_str(), resolved = self.resolved.name(), "Theme mode set");
        self.resolved
    }

    /// Leave auto for the shade not currently shown, or flip a manual mode.
    pub fn toggle(&mut self, now: Instant) -> ThemeMode {
        let next = match self.mode {
            ThemeMode::Auto => match self.resolved.opposite() {
                ThemeVariant::Light => ThemeMode::Light,
                ThemeVariant::Dark => ThemeMode::Dark,
            },
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        };
        self.set_mode(next, now);
        next
    }

    /// Step through auto, light and dark in turn.
    pub fn cycle_mode(&mut self, now: Instant) -> ThemeMode {
        let next = self.mode.next();
        self.set_mode(next, now);
        next
    }

    /// Drive the auto refresh. Returns true only if the resolved shade
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.refresh.fire(now) || self.mode != ThemeMode::Auto {
            return false;
        }
        let resolved = self.options.day.resolve(self.mode, self.clock.local_time());
        if resolved == self.resolved {
            return false;
        }
        tracing::info!(
            from = self.resolved.name(),
            to = resolved.name(),
            "Auto theme crossed day boundary"
        );
        self.resolved = resolved;
        true
    }

    /// Stop the refresh timer.
    pub fn teardown(&mut self) {
        self.refresh.stop();
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn resolved(&self) -> ThemeVariant {
        self.resolved
    }

    /// Whether the auto refresh timer is armed.
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_running()
    }

    fn arm(&mut self, now: Instant) {
        if self.mode == ThemeMode::Auto {
            if !self.refresh.is_running() {
                self.refresh.start(now);
            }
        } else {
            self.refresh.stop();
        }
    }
}
