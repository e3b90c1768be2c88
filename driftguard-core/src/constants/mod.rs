//! Constants for DriftGuard Core
//!
//! Centralised numeric defaults used by the monitor. Every value is named
//! with its unit so call sites never carry magic numbers.
//!
//! ## Organization
//!
//! - **Time**: clock arithmetic limits and lock waits
//! - **Monitor**: query defaults and storage sizing

/// Clock arithmetic limits and bounded-wait durations.
pub mod time;

/// Query defaults and storage sizing for monitors.
pub mod monitor;

pub use time::{
    CLOCK_HALF_RANGE_MS, DEFAULT_LOCK_TIMEOUT_MS, MAX_STALLED_LOCK_SPINS, MIN_SAMPLE_SPACING_MS,
};

pub use monitor::{
    DEFAULT_MIN_DATA_POINTS, LABEL_CAPACITY,
    MIN_SMOOTHING_WINDOW,
};
