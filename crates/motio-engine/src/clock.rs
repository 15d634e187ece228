//! Monotonic time sources.
//!
//! The engine never reads wall-clock time directly; everything timing-related
//! goes through the [`Clock`] trait so tests (and the demo) can drive the
//! whole system with a hand-cranked [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source reporting milliseconds since an arbitrary origin.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real monotonic clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-cranked clock for deterministic tests and demos.
///
/// Clones share the same underlying time, so a clock handed to a trigger
/// helper and one held by the test advance together.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: f64) -> Self {
        let clock = Self::default();
        clock.now.set(now_ms);
        clock
    }

    /// Advance time by `delta_ms`.
    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
