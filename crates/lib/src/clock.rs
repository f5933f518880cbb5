//! Time provider abstraction
//!
//! Credential ids, asset ids, snapshot dates and the automatic theme all read
//! time through the [`Clock`] trait so tests can pin it.
//!
//! # Example
//!
//! ```
//! use kobllux::{Clock, FixedClock};
//!
//! let clock = FixedClock::new(1000);
//! assert_eq!(clock.now_millis(), 1000);
//! assert!(clock.local_hour() < 24);
//! ```

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone, Timelike};

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Hour of the day (0-23) in the host's local time zone.
    fn local_hour(&self) -> u32 {
        Local
            .timestamp_millis_opt(self.now_millis() as i64)
            .single()
            .map(|dt| dt.hour())
            .unwrap_or(0)
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Controllable clock for tests.
///
/// Auto-advances by one millisecond on each `now_millis()` call so ids derived
/// from time stay distinct. Use `hold()` to freeze it.
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

struct FixedClockState {
    millis: u64,
    held: bool,
    hour: Option<u32>,
}

/// RAII guard that freezes a [`FixedClock`] while held.
pub struct ClockHold<'a>(&'a FixedClock);

impl Drop for ClockHold<'_> {
    fn drop(&mut self) {
        self.0.lock().held = false;
    }
}

impl FixedClock {
    /// Create a new fixed clock with the given initial time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            state: Mutex::new(FixedClockState {
                millis,
                held: false,
                hour: None,
            }),
        }
    }

    /// Pin the value returned by [`Clock::local_hour`], independent of the
    /// host time zone.
    pub fn with_local_hour(self, hour: u32) -> Self {
        self.lock().hour = Some(hour % 24);
        self
    }

    /// Change the pinned local hour.
    pub fn set_local_hour(&self, hour: u32) {
        self.lock().hour = Some(hour % 24);
    }

    /// Hold the clock, preventing auto-advance until the guard is dropped.
    pub fn hold(&self) -> ClockHold<'_> {
        self.lock().held = true;
        ClockHold(self)
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.lock().millis += ms;
    }

    /// Get the current time without advancing.
    pub fn get(&self) -> u64 {
        self.lock().millis
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixedClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        let mut state = self.lock();
        let t = state.millis;
        if !state.held {
            state.millis += 1;
        }
        t
    }

    fn local_hour(&self) -> u32 {
        let pinned = self.lock().hour;
        match pinned {
            Some(hour) => hour,
            None => Local
                .timestamp_millis_opt(self.get() as i64)
                .single()
                .map(|dt| dt.hour())
                .unwrap_or(0),
        }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}

impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FixedClock")
            .field("millis", &state.millis)
            .field("held", &state.held)
            .field("hour", &state.hour)
            .finish()
    }
}
