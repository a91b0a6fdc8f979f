//! Clock and timing utilities for intro scheduling.
//!
//! Every timer and frame callback in frameintro reads time from a single
//! [`Clock`], expressed as a [`Duration`] since the clock's epoch. This
//! module provides:
//! - A monotonic clock anchored at session mount
//! - A manually driven clock for tests and offline simulation
//! - A rate controller for pacing a host frame pump

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// Implementations must never go backwards between two calls.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now(&self) -> Duration;

    /// Time elapsed since the clock's epoch, in fractional milliseconds.
    fn now_ms(&self) -> f64 {
        as_millis_f64(self.now())
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// A clock backed by [`Instant`], anchored to the moment it was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    /// The instant the clock started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl MonotonicClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Local::now().to_rfc3339(),
        }
    }

    /// Wall-clock time at clock start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    /// Move the clock forward by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(millis(ms));
    }

    /// Jump to an absolute time. Earlier values are ignored to keep the
    /// clock monotonic.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }

    /// Jump to an absolute time in whole milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.set(millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Build a duration from whole milliseconds.
pub const fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convert a duration to fractional milliseconds.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Frame rate controller for a host frame pump.
#[derive(Debug)]
pub struct RateController {
    target_interval: Duration,
    last_tick: Option<Duration>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        let hz = target_hz.max(1) as u64;
        Self {
            target_interval: Duration::from_nanos(1_000_000_000 / hz),
            last_tick: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, now: Duration) -> bool {
        match self.last_tick {
            None => {
                self.last_tick = Some(now);
                true
            }
            Some(last) if now >= last + self.target_interval => {
                self.last_tick = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Target interval between ticks.
    pub fn interval(&self) -> Duration {
        self.target_interval
    }
}
