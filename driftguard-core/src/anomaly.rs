//! Anomaly Streak Tracking
//!
//! Each rule (threshold, slope) owns one [`AnomalyLog`]: the timestamps of an
//! unbroken run of violating samples.
//!
//! ```text
//!           violation                     violation
//!   Clear ─────────────▶ Violating ◀─────────────┐
//!     ▲                     │   └────────────────┘
//!     │    good sample      │
//!     └─────────────────────┘   (records cleared wholesale)
//! ```
//!
//! A single good sample wipes the whole streak; anomalies only matter as a
//! recent, uninterrupted run. `fire_if_persisted` is edge triggered: once a
//! streak has lasted long enough it reports `true` once and starts over.

use crate::sample::Timestamped;
use crate::store::TimeSeries;
use crate::time::{elapsed_ms, is_at_or_before, Timestamp};

/// Streak state of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakState {
    /// No violation in the current run
    Clear,
    /// Violating since `since`, with `records` violations kept
    Violating {
        /// Oldest kept violation of the streak
        since: Timestamp,
        /// Violations currently recorded
        records: usize,
    },
}

/// Timestamps of the current violation streak for one rule
#[derive(Debug, Clone, Default)]
pub struct AnomalyLog<A> {
    records: A,
    last_anomaly: Option<Timestamp>,
}

impl<A: TimeSeries<Entry = Timestamp>> AnomalyLog<A> {
    /// Wrap an empty record store
    pub fn new(records: A) -> Self {
        Self {
            records,
            last_anomaly: None,
        }
    }

    /// Record a violating sample, returning `true` when it starts a streak
    pub fn record(&mut self, at: Timestamp) -> bool {
        let started = self.records.is_empty();
        // Record times follow the sample store, which already rejected
        // out-of-order samples
        if self.records.append(at).is_ok() {
            self.last_anomaly = Some(at);
        }
        started
    }

    /// End the streak, returning `true` if one was in progress
    pub fn clear_streak(&mut self) -> bool {
        let was_violating = !self.records.is_empty();
        self.records.clear();
        was_violating
    }

    /// Forget the streak and the last anomaly time
    pub fn reset(&mut self) {
        self.records.clear();
        self.last_anomaly = None;
    }

    /// Drop records stamped before `cutoff`
    pub fn evict_older_than(&mut self, cutoff: Timestamp) -> usize {
        self.records.evict_older_than(cutoff)
    }

    /// Current streak state
    pub fn state(&self) -> StreakState {
        match self.records.front() {
            Some(&since) => StreakState::Violating {
                since,
                records: self.records.len(),
            },
            None => StreakState::Clear,
        }
    }

    /// Check whether a streak is in progress
    pub fn is_violating(&self) -> bool {
        !self.records.is_empty()
    }

    /// Number of recorded violations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether no violations are recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest recorded violation of the streak
    pub fn streak_start(&self) -> Option<Timestamp> {
        self.records.front().copied()
    }

    /// Most recent violation ever recorded, surviving streak clears
    pub fn last_anomaly(&self) -> Option<Timestamp> {
        self.last_anomaly
    }

    /// Violations stamped at or after `cutoff`, counted from the newest
    pub fn count_since(&self, cutoff: Timestamp) -> usize {
        self.records
            .iter()
            .rev()
            .take_while(|record| is_at_or_before(cutoff, record.timestamp()))
            .count()
    }

    /// Fire once when the streak has lasted at least `duration_ms`
    ///
    /// A fired streak is cleared, so the next `true` needs a fresh run of
    /// the same length.
    pub fn fire_if_persisted(&mut self, now: Timestamp, duration_ms: u32) -> bool {
        match self.records.front() {
            Some(&since) if elapsed_ms(now, since) >= duration_ms => {
                self.records.clear();
                true
            }
            _ => false,
        }
    }
}
