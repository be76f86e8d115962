use std::cell::Cell;

use web_time::Instant;

/// Monotonic millisecond time source driving the scheduler.
///
/// Clocks are passed to whatever pumps frames; nothing in the core holds a
/// global one.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock measured from its creation.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock you can drive deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    t: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            t: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.t.set(ms);
    }

    /// Moves time forward and returns the new reading.
    pub fn advance(&self, ms: f64) -> f64 {
        let t = self.t.get() + ms;
        self.t.set(t);
        t
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.t.get()
    }
}
