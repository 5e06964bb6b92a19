// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backoff Schedules and Clock Injection
//!
//! Pure delay arithmetic, separated from the timers that consume it so
//! retry behavior is testable without sleeping. Two schedules are used:
//! a short one for in-session send retries and a longer one for full
//! reconnect-after-close flows.

use std::time::{Duration, Instant};

/// Exponential backoff with a ceiling: attempt `n` waits
/// `min(base * 2^n, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    base: Duration,
    cap: Duration,
}

impl BackoffSchedule {
    /// Creates a schedule from a base delay and a ceiling.
    pub fn new(base: Duration, cap: Duration) -> Self {
        BackoffSchedule { base, cap }
    }

    /// Schedule for in-session send retries: 1s, 2s, 4s, then 4s.
    pub fn send() -> Self {
        BackoffSchedule::new(Duration::from_secs(1), Duration::from_secs(4))
    }

    /// Schedule for reconnect-after-close: 2s, 4s, 8s, then 8s.
    pub fn reconnect() -> Self {
        BackoffSchedule::new(Duration::from_secs(2), Duration::from_secs(8))
    }

    /// Creates a schedule from millisecond knobs (see `TransportConfig`).
    pub fn from_millis(base_ms: u64, cap_ms: u64) -> Self {
        BackoffSchedule::new(Duration::from_millis(base_ms), Duration::from_millis(cap_ms))
    }

    /// Delay before retry `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // 2^attempt saturates well before the cap can matter.
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

/// Time source for retry loops. Injected so tests never sleep.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Blocks for `duration` (or records it, in tests).
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Test clock that records requested sleeps instead of blocking.
#[derive(Debug, Default)]
pub struct ManualClock {
    slept: std::cell::RefCell<Vec<Duration>>,
}

impl ManualClock {
    /// Creates a manual clock with no recorded sleeps.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sleeps requested so far, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_schedule_values() {
        let schedule = BackoffSchedule::reconnect();
        assert_eq!(schedule.delay_for(0), Duration::from_secs(2));
        assert_eq!(schedule.delay_for(1), Duration::from_secs(4));
        assert_eq!(schedule.delay_for(2), Duration::from_secs(8));
        assert_eq!(schedule.delay_for(3), Duration::from_secs(8));
        assert_eq!(schedule.delay_for(30), Duration::from_secs(8));
    }

    #[test]
    fn test_send_schedule_values() {
        let schedule = BackoffSchedule::send();
        assert_eq!(schedule.delay_for(0), Duration::from_secs(1));
        assert_eq!(schedule.delay_for(1), Duration::from_secs(2));
        assert_eq!(schedule.delay_for(2), Duration::from_secs(4));
        assert_eq!(schedule.delay_for(10), Duration::from_secs(4));
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let schedule = BackoffSchedule::reconnect();
        assert_eq!(schedule.delay_for(u32::MAX), Duration::from_secs(8));
    }

    #[test]
    fn test_manual_clock_records_sleeps() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(2));
        clock.sleep(Duration::from_secs(4));
        assert_eq!(
            clock.slept(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }
}
