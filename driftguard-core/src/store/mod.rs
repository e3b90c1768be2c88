//! Time-Ordered Sample Storage
//!
//! ## Overview
//!
//! Every windowed query asks "what happened in the last D milliseconds".
//! Answering it only needs an ordered history that can be appended at the
//! back, trimmed at the front and scanned from either end. `TimeSeries`
//! captures exactly that, and two backends implement it:
//!
//! - [`RingStore`]: fixed capacity, overwrites the oldest entry when full.
//!   Zero heap, sized at compile time.
//! - [`GrowableStore`]: `VecDeque` backed, grows on insert and is trimmed by
//!   age after every update.
//!
//! ## Ordering Invariant
//!
//! Timestamps never decrease from front to back and no two entries share a
//! timestamp. [`TimeSeries::append`] enforces both: an entry stamped with the
//! same millisecond as the newest one replaces it, an entry from the past is
//! rejected.
//!
//! ```text
//! index:      0      1      2      3      (len = 4)
//!           ┌──────┬──────┬──────┬──────┐
//! timestamp │ 100  │ 110  │ 130  │ 140  │
//!           └──────┴──────┴──────┴──────┘
//!             ↑ front (oldest)      ↑ back (newest)
//!
//! oldest_at_or_after(105)  -> Some(1)
//! newest_at_or_before(135) -> Some(2)
//! ```
//!
//! All timestamp comparisons go through [`crate::time::is_at_or_before`], so
//! the ordering survives the 32-bit counter wrapping.

use core::iter::FusedIterator;
use core::ops::RangeInclusive;

use crate::errors::{MonitorError, MonitorResult};
use crate::sample::Timestamped;
use crate::time::{is_at_or_before, Timestamp};

mod growable;
mod ring;

pub use growable::GrowableStore;
pub use ring::{ring_capacity, RingStore};

/// How an appended entry was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PushOutcome {
    /// Entry added after the previous newest one
    Appended,
    /// Entry shared the newest timestamp and overwrote it
    Replaced,
}

/// Ordered, oldest-first sequence of timestamped entries
///
/// Implementors provide raw positional access; ordering rules, eviction and
/// the directional scans are provided methods shared by every backend.
pub trait TimeSeries {
    /// Stored entry type
    type Entry: Timestamped;

    /// Number of stored entries
    fn len(&self) -> usize;

    /// Entry by logical index (0 = oldest, len - 1 = newest)
    fn get(&self, index: usize) -> Option<&Self::Entry>;

    /// Mutable access to the newest entry
    fn back_mut(&mut self) -> Option<&mut Self::Entry>;

    /// Add at the back without ordering checks
    ///
    /// Bounded backends drop the oldest entry first when full.
    fn push_back(&mut self, entry: Self::Entry);

    /// Remove the oldest entry
    fn pop_front(&mut self) -> Option<Self::Entry>;

    /// Remove everything
    fn clear(&mut self);

    /// Maximum number of entries, `None` when unbounded
    fn capacity(&self) -> Option<usize>;

    /// Check if the series is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Oldest entry
    fn front(&self) -> Option<&Self::Entry> {
        self.get(0)
    }

    /// Newest entry
    fn back(&self) -> Option<&Self::Entry> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Append while keeping timestamps strictly increasing
    ///
    /// Same millisecond as the newest entry: the newest entry is replaced,
    /// so no zero-length interval ever separates two stored entries.
    /// Earlier than the newest entry: rejected with `OutOfOrder`.
    fn append(&mut self, entry: Self::Entry) -> MonitorResult<PushOutcome> {
        let received = entry.timestamp();

        if let Some(newest) = self.back_mut() {
            let last = newest.timestamp();
            if last == received {
                *newest = entry;
                return Ok(PushOutcome::Replaced);
            }
            if !is_at_or_before(last, received) {
                return Err(MonitorError::OutOfOrder { last, received });
            }
        }

        self.push_back(entry);
        Ok(PushOutcome::Appended)
    }

    /// Drop entries stamped strictly before `cutoff`, returning how many
    fn evict_older_than(&mut self, cutoff: Timestamp) -> usize {
        let mut evicted = 0;
        while let Some(oldest) = self.front() {
            if is_at_or_before(cutoff, oldest.timestamp()) {
                break;
            }
            self.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Index of the oldest entry stamped at or after `timestamp`
    ///
    /// Scans backward from the newest entry and stops at the first entry
    /// older than the bound.
    fn oldest_at_or_after(&self, timestamp: Timestamp) -> Option<usize> {
        let mut found = None;
        for index in (0..self.len()).rev() {
            match self.get(index) {
                Some(entry) if is_at_or_before(timestamp, entry.timestamp()) => found = Some(index),
                _ => break,
            }
        }
        found
    }

    /// Index of the newest entry stamped at or before `timestamp`
    fn newest_at_or_before(&self, timestamp: Timestamp) -> Option<usize> {
        (0..self.len()).rev().find(|&index| {
            self.get(index)
                .map_or(false, |entry| is_at_or_before(entry.timestamp(), timestamp))
        })
    }

    /// Indices of entries stamped within `[start, end]`
    ///
    /// `None` when nothing falls inside the interval.
    fn window_indices(&self, start: Timestamp, end: Timestamp) -> Option<RangeInclusive<usize>> {
        let newest = self.newest_at_or_before(end)?;
        let oldest = self.oldest_at_or_after(start)?;
        (oldest <= newest).then(|| oldest..=newest)
    }

    /// Iterate oldest to newest (reverse with `.rev()`)
    fn iter(&self) -> SeriesIter<'_, Self>
    where
        Self: Sized,
    {
        SeriesIter::new(self, 0, self.len())
    }

    /// Iterate over an inclusive index range
    fn iter_range(&self, range: RangeInclusive<usize>) -> SeriesIter<'_, Self>
    where
        Self: Sized,
    {
        let (start, end) = range.into_inner();
        let end = end.saturating_add(1).min(self.len());
        SeriesIter::new(self, start.min(end), end)
    }
}

/// Double-ended iterator over a [`TimeSeries`]
pub struct SeriesIter<'a, S: TimeSeries> {
    series: &'a S,
    front: usize,
    back: usize,
}

impl<'a, S: TimeSeries> SeriesIter<'a, S> {
    fn new(series: &'a S, front: usize, back: usize) -> Self {
        Self { series, front, back }
    }
}

impl<'a, S: TimeSeries> Iterator for SeriesIter<'a, S> {
    type Item = &'a S::Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.series.get(self.front)?;
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, S: TimeSeries> DoubleEndedIterator for SeriesIter<'a, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.series.get(self.back - 1)?;
        self.back -= 1;
        Some(item)
    }
}

impl<'a, S: TimeSeries> ExactSizeIterator for SeriesIter<'a, S> {}

impl<'a, S: TimeSeries> FusedIterator for SeriesIter<'a, S> {}
