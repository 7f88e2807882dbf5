//! Frame-time accumulator that converts host frames into fixed ticks.

use std::time::Duration;

/// Accumulates elapsed frame time and releases it one tick interval at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pacer {
    accumulator: Duration,
}

impl Pacer {
    /// Creates an empty pacer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accumulator: Duration::ZERO,
        }
    }

    /// Adds `dt` to the accumulator and reports how many whole intervals are
    /// now due, consuming them.
    ///
    /// A zero interval never fires.
    pub fn advance(&mut self, dt: Duration, interval: Duration) -> u32 {
        self.accumulate(dt);
        let mut due = 0;
        while self.consume(interval) {
            due += 1;
        }
        due
    }

    /// Adds elapsed frame time without releasing any tick.
    pub fn accumulate(&mut self, dt: Duration) {
        self.accumulator = self.accumulator.saturating_add(dt);
    }

    /// Releases one tick if a whole `interval` has accumulated.
    ///
    /// A zero interval never fires.
    pub fn consume(&mut self, interval: Duration) -> bool {
        if interval.is_zero() || self.accumulator < interval {
            return false;
        }
        self.accumulator -= interval;
        true
    }

    /// Time carried over toward the next tick.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Drops any carried-over time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
