//! Time management for monitored variables
//!
//! Firmware tick counters are 32-bit millisecond counters that wrap every
//! ~49.7 days. Every duration in this crate is therefore computed with
//! wrapping subtraction, and "is this before that" is answered by looking
//! at the signed half-range of the difference. Nothing compares raw
//! timestamps with `<` across the wrap boundary.
//!
//! Sources provided here:
//! - `MockTimeSource`: controllable, shareable between threads (tests, replay)
//! - `FixedTime`: frozen clock for single-threaded tests
//! - `MonotonicClock`: `std::time::Instant` based (requires `std`)

use core::sync::atomic::{AtomicU32, Ordering};

use crate::constants::CLOCK_HALF_RANGE_MS;

/// Timestamp in milliseconds since boot, wrapping at `u32::MAX`
pub type Timestamp = u32;

/// Source of monotonic time for the monitor
///
/// ## Implementation Requirements
///
/// - `now()` must never go backwards except by wrapping past `u32::MAX`
/// - `now()` must be callable from every context that touches the monitor
///   (for a shared monitor that means `Sync` as well)
///
/// ## Example Implementation
///
/// ```rust
/// use driftguard_core::time::{TimeSource, Timestamp};
///
/// struct SysTick;
///
/// impl TimeSource for SysTick {
///     fn now(&self) -> Timestamp {
///         // Read the RTOS tick counter here
///         0
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current time in milliseconds
    fn now(&self) -> Timestamp;

    /// Smallest time difference this source can resolve
    fn precision_ms(&self) -> u32 {
        1
    }
}

impl<C: TimeSource + ?Sized> TimeSource for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn precision_ms(&self) -> u32 {
        (**self).precision_ms()
    }
}

/// Milliseconds from `older` to `newer`, tolerating counter wraparound
#[inline]
pub fn elapsed_ms(newer: Timestamp, older: Timestamp) -> u32 {
    newer.wrapping_sub(older)
}

/// True when `earlier` is at or before `later` on the wrapping clock
///
/// Valid while the two instants are less than half the counter range apart.
#[inline]
pub fn is_at_or_before(earlier: Timestamp, later: Timestamp) -> bool {
    elapsed_ms(later, earlier) < CLOCK_HALF_RANGE_MS
}

/// Controllable time source for tests and offline replay
///
/// Backed by an atomic so a single instance can drive a `SharedMonitor`
/// used from several threads.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    timestamp: AtomicU32,
}

impl MockTimeSource {
    /// Create a mock clock reading `start`
    pub const fn new(start: Timestamp) -> Self {
        Self {
            timestamp: AtomicU32::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::Release);
    }

    /// Move forward, wrapping like a hardware counter
    pub fn advance(&self, ms: u32) {
        // fetch_add wraps on overflow
        self.timestamp.fetch_add(ms, Ordering::AcqRel);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::Acquire)
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone, Copy)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the frozen instant
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the frozen instant
    pub fn advance(&mut self, ms: u32) {
        self.timestamp = self.timestamp.wrapping_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Monotonic clock measured from construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        // Truncation reproduces the wrap of a 32-bit tick counter
        self.start.elapsed().as_millis() as Timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_advances() {
        let time = MockTimeSource::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn mock_time_wraps() {
        let time = MockTimeSource::new(u32::MAX - 5);
        time.advance(10);
        assert_eq!(time.now(), 4);
    }

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        time.advance(250);
        assert_eq!(time.now(), 1250);
    }

    #[test]
    fn elapsed_across_wrap() {
        assert_eq!(elapsed_ms(5, u32::MAX - 4), 10);
        assert_eq!(elapsed_ms(100, 40), 60);
    }

    #[test]
    fn ordering_across_wrap() {
        assert!(is_at_or_before(u32::MAX - 4, 5));
        assert!(!is_at_or_before(5, u32::MAX - 4));
        assert!(is_at_or_before(7, 7));
        assert!(is_at_or_before(0, 100));
        assert!(!is_at_or_before(100, 0));
    }

    #[test]
    fn reference_forwards_to_source() {
        let time = MockTimeSource::new(42);
        let by_ref: &MockTimeSource = &time;
        assert_eq!(TimeSource::now(&by_ref), 42);
    }
}
