//! Cancelable timers driven by caller-supplied instants.
//!
//! Neither timer owns a task or sleeps. The event loop passes the current
//! `tokio::time::Instant` on every tick and the timer reports whether it
//! fired, which keeps timing logic testable with a simulated clock.

use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Debounce
// ============================================================================

/// One-shot trailing-edge timer.
///
/// Every `schedule` cancels the previous deadline and restarts the quiet
/// period, so `fire` returns true at most once per settled burst.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and start a new quiet period at `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Repeating Timer
// ============================================================================

/// Fixed-period timer that can be started and stopped.
///
/// After a stall longer than one period it fires once and re-arms one period
/// from `now` instead of replaying every missed tick.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm the timer; the first firing is one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.period;
                self.next_due = Some(if next > now { next } else { now + self.period });
                true
            }
            _ => false,
        }
    }
}
