//! Time sources for the growth driver.

use chrono::Utc;

use crate::node::Millis;

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time.
    fn now_ms(&self) -> Millis;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> Millis {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Millis,
}

impl ManualClock {
    /// Start at `now`.
    #[must_use]
    pub fn starting_at(now: Millis) -> Self {
        Self { now }
    }

    /// Move forward by `ms`.
    pub fn advance(&mut self, ms: Millis) {
        self.now += ms;
    }

    /// Jump to an absolute time.
    pub fn set(&mut self, now: Millis) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> Millis {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::starting_at(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
