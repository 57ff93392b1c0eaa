//! Monotonic clock abstraction.
//!
//! The polling loop reads the clock exactly once per iteration and threads
//! the resulting `Instant` through every gate and the capture machine, so
//! all timing decisions within one tick agree. The trait exists to allow
//! mock time in tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Mock clock that only moves when advanced manually.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the controller owns another.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Creates a new mock clock starting at the current instant.
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advances the mock clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_clock_stands_still_until_advanced() {
        let clock = MockClock::new();
        let a = clock.now();
        assert_eq!(clock.now(), a);

        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), a + Duration::from_millis(250));
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), other.now());
    }
}
