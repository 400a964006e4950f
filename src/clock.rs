//! Wall-clock abstraction (local time of day).
use chrono::{Local, NaiveTime};
use std::sync::Mutex;

pub trait WallClock: Send + Sync {
    /// Current local time of day.
    fn local_time(&self) -> NaiveTime;
}

/// `WallClock` backed by the system clock and local timezone.
#[derive(Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Settable clock for tests and demos.
#[derive(Debug)]
pub struct FixedClock {
    time: Mutex<NaiveTime>,
}

impl FixedClock {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time: Mutex::new(time),
        }
    }

    /// Clock reading `hour:min:00`. Out-of-range values clamp to midnight.
    pub fn at(hour: u32, min: u32) -> Self {
        Self::new(NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn set(&self, time: NaiveTime) {
        if let Ok(mut guard) = self.time.lock() {
            *guard = time;
        }
    }
}

impl WallClock for FixedClock {
    fn local_time(&self) -> NaiveTime {
        self.time.lock().map(|t| *t).unwrap_or(NaiveTime::MIN)
    }
}
