//! Heap-backed storage that grows with the window
//!
//! Suited to hosts and larger MCUs where the sampling rate is not known at
//! compile time. The monitor keeps it short by evicting entries older than
//! the retention window after every update.

use alloc::collections::VecDeque;

use super::TimeSeries;
use crate::sample::Timestamped;

/// Unbounded, `VecDeque` backed time series
#[derive(Debug, Clone)]
pub struct GrowableStore<E> {
    entries: VecDeque<E>,
}

impl<E: Timestamped> GrowableStore<E> {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Creates an empty store with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }
}

impl<E: Timestamped> Default for GrowableStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Timestamped> TimeSeries for GrowableStore<E> {
    type Entry = E;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    fn back_mut(&mut self) -> Option<&mut E> {
        self.entries.back_mut()
    }

    fn push_back(&mut self, entry: E) {
        self.entries.push_back(entry);
    }

    fn pop_front(&mut self) -> Option<E> {
        self.entries.pop_front()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn capacity(&self) -> Option<usize> {
        None
    }
}
