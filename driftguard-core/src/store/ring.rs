//! Fixed-Capacity Ring Storage
//!
//! ## Overview
//!
//! The bounded backend for monitors on targets without a heap. Capacity is a
//! const generic, so the whole history lives inline in the monitor and the
//! memory cost is known at link time.
//!
//! ### Why Overwrite Instead of Reject?
//!
//! A monitor cares about the most recent window. When the ring is full the
//! oldest sample is the least valuable one, so it is sacrificed silently
//! rather than refusing the newest reading.
//!
//! ### Sizing
//!
//! With a minimum spacing `S` between stored samples, a window of `W`
//! milliseconds holds at most `W / S + 1` samples (both ends inclusive).
//! [`ring_capacity`] computes that at compile time:
//!
//! ```rust
//! use driftguard_core::store::{ring_capacity, RingStore};
//! use driftguard_core::Sample;
//!
//! // 2 s window, one sample every 50 ms at most -> 41 slots
//! const SLOTS: usize = ring_capacity(2_000, 50);
//! let store: RingStore<Sample<f32>, SLOTS> = RingStore::new();
//! # assert_eq!(SLOTS, 41);
//! # let _ = store;
//! ```
//!
//! ### Memory Layout
//!
//! ```text
//! RingStore<Sample<f32>, 5> after 7 pushes:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!          ↑     ↑
//!          │     └── oldest = (write_pos + N - len) % N
//!          └──────── newest, write_pos = 2
//! ```
//!
//! `pop_front` only shrinks `len`; the slot is taken out so the value is
//! dropped immediately.

use super::TimeSeries;
use crate::constants::MIN_SAMPLE_SPACING_MS;
use crate::sample::Timestamped;

/// Slots needed to keep a `window_ms` history at `min_spacing_ms` spacing
///
/// A zero spacing is treated as one millisecond, the smallest spacing the
/// monitor accepts.
pub const fn ring_capacity(window_ms: u32, min_spacing_ms: u32) -> usize {
    let spacing = if min_spacing_ms == 0 { MIN_SAMPLE_SPACING_MS } else { min_spacing_ms };
    (window_ms / spacing) as usize + 1
}

/// Fixed-size ring of timestamped entries
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - logical order (oldest to newest) starts at `(write_pos + N - len) % N`
///
/// ## Thread Safety
///
/// Not synchronised. Share through [`crate::SharedMonitor`] or an external
/// lock.
#[derive(Clone)]
pub struct RingStore<E, const N: usize> {
    /// Storage array, `None` for never-written or evicted slots
    data: [Option<E>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid entries
    len: usize,
}

impl<E: Timestamped + Copy, const N: usize> RingStore<E, N> {
    const NON_ZERO_CAPACITY: () = assert!(N > 0, "RingStore capacity must be at least 1");

    /// Creates a new empty ring
    ///
    /// Usable in static contexts:
    /// ```rust
    /// use driftguard_core::store::RingStore;
    /// static ANOMALY_TIMES: RingStore<u32, 16> = RingStore::new();
    /// ```
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO_CAPACITY;
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Check if the ring is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Physical slot of the oldest entry
    fn head(&self) -> usize {
        (self.write_pos + N - self.len) % N
    }
}

impl<E: Timestamped + Copy, const N: usize> TimeSeries for RingStore<E, N> {
    type Entry = E;

    fn len(&self) -> usize {
        self.len
    }

    /// Translates a logical index into a physical slot
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2, len = 5)
    /// Logical view:    [A, B, C, D, E]
    /// logical[0] = physical[(2 + 5 - 5 + 0) % 5] = physical[2] = A
    /// ```
    fn get(&self, index: usize) -> Option<&E> {
        if index >= self.len {
            return None;
        }
        self.data[(self.head() + index) % N].as_ref()
    }

    fn back_mut(&mut self) -> Option<&mut E> {
        if self.len == 0 {
            return None;
        }
        let newest = (self.write_pos + N - 1) % N;
        self.data[newest].as_mut()
    }

    fn push_back(&mut self, entry: E) {
        self.data[self.write_pos] = Some(entry);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    fn pop_front(&mut self) -> Option<E> {
        if self.len == 0 {
            return None;
        }
        let head = self.head();
        self.len -= 1;
        self.data[head].take()
    }

    fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    fn capacity(&self) -> Option<usize> {
        Some(N)
    }
}

impl<E: Timestamped + Copy, const N: usize> Default for RingStore<E, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Timestamped + Copy + core::fmt::Debug, const N: usize> core::fmt::Debug for RingStore<E, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;
    use crate::store::PushOutcome;

    #[test]
    fn capacity_formula() {
        assert_eq!(ring_capacity(1000, 100), 11);
        assert_eq!(ring_capacity(1000, 0), 1001);
        assert_eq!(ring_capacity(0, 10), 1);
    }

    #[test]
    fn empty_ring() {
        let ring: RingStore<Sample<f32>, 5> = RingStore::new();
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert!(ring.back().is_none());
        assert_eq!(ring.capacity(), Some(5));
    }

    #[test]
    fn circular_overwrite() {
        let mut ring = RingStore::<Sample<f32>, 3>::new();

        for i in 0..5u32 {
            ring.append(Sample::new(i as f32, i * 1000)).unwrap();
        }

        assert_eq!(ring.len(), 3);
        assert!(ring.is_full());

        // Oldest 0 and 1 were overwritten
        let values: Vec<f32> = ring.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn pop_front_after_wrap() {
        let mut ring = RingStore::<u32, 4>::new();
        for t in [10, 20, 30, 40, 50, 60] {
            ring.push_back(t);
        }
        assert_eq!(ring.pop_front(), Some(30));
        assert_eq!(ring.pop_front(), Some(40));
        ring.push_back(70);

        let times: Vec<u32> = ring.iter().copied().collect();
        assert_eq!(times, vec![50, 60, 70]);
        assert_eq!(ring.front(), Some(&50));
        assert_eq!(ring.back(), Some(&70));
    }

    #[test]
    fn back_mut_tracks_newest_slot() {
        let mut ring = RingStore::<Sample<i32>, 2>::new();
        ring.append(Sample::new(1, 1)).unwrap();
        ring.append(Sample::new(2, 2)).unwrap();
        ring.append(Sample::new(3, 3)).unwrap();
        assert_eq!(ring.append(Sample::new(30, 3)), Ok(PushOutcome::Replaced));

        let values: Vec<i32> = ring.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2, 30]);
    }

    #[test]
    fn clear_resets() {
        let mut ring = RingStore::<u32, 3>::new();
        ring.push_back(1);
        ring.push_back(2);
        ring.clear();
        assert!(ring.is_empty());
        ring.push_back(3);
        assert_eq!(ring.front(), Some(&3));
    }
}
