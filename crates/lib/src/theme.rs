//! Solar theme mode.
//!
//! The mode lives in the shared [`SOLAR_MODE`] entry and the automatic flag in
//! [`SOLAR_AUTO`]. Surfaces apply whatever the entry says; [`Theme`] is the
//! writer behind the cycle and auto buttons.

use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_SOLAR_MODE, SOLAR_AUTO, SOLAR_MODE};
use crate::store::KeyValueStore;

/// Visual mode following the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarMode {
    Day,
    Sunset,
    Night,
}

impl SolarMode {
    /// Parse a stored mode, ignoring case. Anything unrecognized is night.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => SolarMode::Day,
            "sunset" => SolarMode::Sunset,
            _ => SolarMode::Night,
        }
    }

    /// The mode for a local hour: day from 06:00, sunset from 17:00, night
    /// from 19:00.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=16 => SolarMode::Day,
            17..=18 => SolarMode::Sunset,
            _ => SolarMode::Night,
        }
    }

    /// The next mode in the manual cycle.
    pub fn next(self) -> Self {
        match self {
            SolarMode::Day => SolarMode::Sunset,
            SolarMode::Sunset => SolarMode::Night,
            SolarMode::Night => SolarMode::Day,
        }
    }

    /// The stored token.
    pub fn as_str(self) -> &'static str {
        match self {
            SolarMode::Day => "day",
            SolarMode::Sunset => "sunset",
            SolarMode::Night => "night",
        }
    }
}

impl fmt::Display for SolarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writer of the theme entries.
#[derive(Debug, Clone)]
pub struct Theme {
    store: KeyValueStore,
    clock: Arc<dyn Clock>,
}

impl Theme {
    pub fn new(store: KeyValueStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: KeyValueStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The stored mode.
    pub fn mode(&self) -> SolarMode {
        SolarMode::parse(&self.store.get(SOLAR_MODE, DEFAULT_SOLAR_MODE))
    }

    /// Whether the mode follows the clock. Defaults to true.
    pub fn is_auto(&self) -> bool {
        self.store.get_bool(SOLAR_AUTO, true)
    }

    /// Store `mode`.
    pub fn set_mode(&self, mode: SolarMode) {
        self.store.set(SOLAR_MODE, mode.as_str());
    }

    /// Switch to manual and advance to the next mode.
    pub fn cycle(&self) -> SolarMode {
        let next = self.mode().next();
        self.store.set_bool(SOLAR_AUTO, false);
        self.set_mode(next);
        next
    }

    /// Switch to automatic and apply the mode for the current hour.
    pub fn enable_auto(&self) -> SolarMode {
        self.store.set_bool(SOLAR_AUTO, true);
        self.apply_by_time()
    }

    /// Startup: automatic mode writes the mode for the current hour, manual
    /// mode keeps the stored one.
    pub fn apply_startup(&self) -> SolarMode {
        if self.is_auto() {
            self.apply_by_time()
        } else {
            self.mode()
        }
    }

    fn apply_by_time(&self) -> SolarMode {
        let mode = SolarMode::for_hour(self.clock.local_hour());
        tracing::debug!(%mode, "applying solar mode for local time");
        self.set_mode(mode);
        mode
    }
}
