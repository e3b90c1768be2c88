//! Timestamped samples

use crate::time::Timestamp;
use crate::value::MonitorValue;

/// Anything stored in a time-ordered series
pub trait Timestamped {
    /// Instant the entry was recorded
    fn timestamp(&self) -> Timestamp;
}

/// Bare timestamps form the anomaly records
impl Timestamped for Timestamp {
    fn timestamp(&self) -> Timestamp {
        *self
    }
}

/// Single observation of a monitored variable
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample<T> {
    /// Observed value
    pub value: T,
    /// When it was observed (milliseconds, wrapping)
    pub timestamp: Timestamp,
}

impl<T: MonitorValue> Sample<T> {
    /// Pair a value with its observation time
    pub const fn new(value: T, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }
}

impl<T> Timestamped for Sample<T> {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
