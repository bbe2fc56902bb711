//! [`Clock`] – injectable monotonic time source.
//!
//! Cooldown timing must survive wall-clock adjustments (NTP sync, time-zone
//! and daylight-saving jumps), so all durations are measured between
//! [`Instant`]s obtained through this trait. Production code uses
//! [`MonotonicClock`]; tests drive a [`ManualClock`] forward explicitly.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A monotonic time source. Never runs backward.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test can hold one handle,
/// give a boxed clone away, and advance time from outside.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the clock by `step` for every handle.
    pub fn advance(&self, step: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += step;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_moves_forward() {
        let clock = MonotonicClock;
        let earlier = clock.now();
        assert!(clock.now() >= earlier);
    }

    #[test]
    fn manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now() - start, Duration::from_secs(5));
    }

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new();
        let handle: Box<dyn Clock> = Box::new(clock.clone());

        clock.advance(Duration::from_secs(30));
        assert_eq!(handle.now(), clock.now());
    }
}
