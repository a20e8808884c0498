//! Time source abstraction
//!
//! Every delay the engine inserts goes through a [`Clock`], so the fatigue,
//! break and timing models can run against virtual time in tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest single sleep taken while a cancellable wait is in progress
const CANCEL_SLICE: Duration = Duration::from_secs(1);

/// Convert seconds to a [`Duration`], saturating instead of panicking
///
/// Negative and NaN inputs map to zero, values past `Duration::MAX` to the maximum.
pub fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Monotonic time source with blocking sleep
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's epoch
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);

    /// Current time in fractional seconds
    fn now_secs(&self) -> f64 {
        self.now().as_secs_f64()
    }

    /// Sleep for a number of seconds; negative or NaN values are ignored
    fn sleep_secs(&self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.sleep(duration_from_secs(secs));
        }
    }
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock: `sleep` advances time instantly
///
/// Used by tests so multi-minute breaks and fatigue curves run in microseconds.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    slept_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without counting it as sleep
    pub fn advance(&self, duration: Duration) {
        saturating_add(&self.nanos, duration);
    }

    /// Advance by whole minutes
    pub fn advance_minutes(&self, minutes: f64) {
        self.advance(duration_from_secs(minutes * 60.0));
    }

    /// Total time spent inside `sleep`
    pub fn total_slept(&self) -> Duration {
        Duration::from_nanos(self.slept_nanos.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        saturating_add(&self.nanos, duration);
        saturating_add(&self.slept_nanos, duration);
    }
}

fn saturating_add(counter: &AtomicU64, duration: Duration) {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    // The closure always returns Some, so the update cannot fail
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(nanos)));
}

/// Cooperative cancellation token shared with the caller
///
/// The engine checks it between pointer steps and between characters; it is
/// never checked inside a single device call.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the action in progress
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a previous request
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sleep in short slices so a long wait can be cut short
///
/// Returns `false` if the flag was raised before the full duration elapsed.
pub fn sleep_cancellable(clock: &dyn Clock, secs: f64, cancel: &CancelFlag) -> bool {
    if !(secs.is_finite() && secs > 0.0) {
        return !cancel.is_cancelled();
    }

    let mut remaining = duration_from_secs(secs);
    while remaining > Duration::ZERO {
        if cancel.is_cancelled() {
            return false;
        }
        let slice = remaining.min(CANCEL_SLICE);
        clock.sleep(slice);
        remaining -= slice;
    }

    !cancel.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_sleep_advances_time() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_millis(250));
        clock.advance(Duration::from_secs(1));

        assert_eq!(clock.now(), Duration::from_millis(1250));
        assert_eq!(clock.total_slept(), Duration::from_millis(250));
    }

    #[test]
    fn test_sleep_secs_ignores_negative() {
        let clock = ManualClock::new();
        clock.sleep_secs(-1.0);
        clock.sleep_secs(f64::NAN);

        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_oversized_seconds_saturate() {
        assert_eq!(duration_from_secs(1e30), Duration::MAX);
        assert_eq!(duration_from_secs(f64::INFINITY), Duration::MAX);
        assert_eq!(duration_from_secs(-5.0), Duration::ZERO);
        assert_eq!(duration_from_secs(1.5), Duration::from_millis(1500));

        let clock = ManualClock::new();
        clock.sleep_secs(1e30);
        clock.sleep(Duration::MAX);
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn test_cancellable_sleep_completes() {
        let clock = ManualClock::new();
        let cancel = CancelFlag::new();

        assert!(sleep_cancellable(&clock, 3.5, &cancel));
        assert!((clock.now_secs() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_sleep_stops_early() {
        let clock = ManualClock::new();
        let cancel = CancelFlag::new();
        cancel.cancel();

        assert!(!sleep_cancellable(&clock, 600.0, &cancel));
        assert_eq!(clock.now(), Duration::ZERO);
    }
}
