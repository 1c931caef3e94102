//! # Clock Abstraction for Test Determinism
//!
//! Capture windows are pure timestamp arithmetic, so a virtual clock makes
//! every window scenario reproducible without sleeping in tests.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Clock trait for time abstraction
pub trait Clock: Send + Sync {
    /// Get the current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// Real-time clock implementation
pub struct RealClock;

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Virtual clock for deterministic testing
pub struct TestClock {
    current_time: Mutex<DateTime<Utc>>,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            current_time: Mutex::new(Utc::now()),
        }
    }

    pub fn new_with_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(start_time),
        }
    }

    /// Advance the virtual clock by the specified duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock();
        *time += duration;
    }

    /// Set the virtual clock to a specific time
    pub fn set_time(&self, time: DateTime<Utc>) {
        let mut current = self.current_time.lock();
        *current = time;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock()
    }
}

/// Thread-safe clock that can be shared across threads
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Create a real-time clock
pub fn real_clock() -> SharedClock {
    Arc::new(RealClock::new())
}

/// Create a test clock with a specific start time
pub fn test_clock_with_start(start_time: DateTime<Utc>) -> SharedClock {
    Arc::new(TestClock::new_with_start_time(start_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let start = Utc::now();
        let clock = TestClock::new_with_start_time(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), start + Duration::seconds(5));
    }

    #[test]
    fn test_clock_set_time() {
        let clock = TestClock::new();
        let target = Utc::now() + Duration::minutes(10);
        clock.set_time(target);
        assert_eq!(clock.now(), target);
    }
}
