//! Error Types for Monitor Queries and Sample Ingestion
//!
//! ## Design Philosophy
//!
//! The monitor runs inside sampling loops and interrupt-adjacent code, so its
//! error type follows the same rules as the rest of the crate:
//!
//! 1. **Small Size**: every variant carries at most two integers or a
//!    `&'static str`, so a `MonitorResult` stays register-sized on Cortex-M.
//!
//! 2. **No Heap Allocation**: messages are static strings only.
//!
//! 3. **Copy Semantics**: errors are returned by value and may be stored.
//!
//! 4. **Never Fatal**: nothing in this crate panics on a data condition. The
//!    worst outcome of a failed read is "no answer this cycle", the worst
//!    outcome of a failed write is "one sample was dropped".
//!
//! ## Error Categories
//!
//! ### Insufficient Data (the common case)
//! - `InsufficientData`: fewer samples in the window than requested
//! - `InsufficientSpan`: the stored history does not cover the window yet
//!
//! ### Routine Ingestion Outcomes
//! - `RateLimited`: sample arrived closer than the configured spacing
//! - `OutOfOrder`: sample timestamp is older than the newest stored sample
//!
//! ### Caller Mistakes
//! - `InvalidWindow`, `InvalidConfig`, `UnsupportedScheme`
//!
//! ### Contention
//! - `LockTimeout`: a shared monitor lock was not granted in time
//!
//! ## Handling Strategy
//!
//! ```rust
//! use driftguard_core::{GrowableMonitor, MonitorConfig, MonitorError, VariableTracker, Window};
//! use driftguard_core::time::MockTimeSource;
//!
//! let clock = MockTimeSource::new(0);
//! let mut monitor: GrowableMonitor<f32, _> =
//!     GrowableMonitor::new(MonitorConfig::new(10), &clock).unwrap();
//!
//! match monitor.average_value(Window::last(500)) {
//!     Ok(mean) => { let _ = mean; }
//!     Err(MonitorError::InsufficientData { .. }) |
//!     Err(MonitorError::InsufficientSpan { .. }) => {
//!         // Not enough history yet - try again next cycle
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Monitor errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// Fewer samples fall inside the window than the query requires
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of samples the query asked for
        required: usize,
        /// Samples actually found in the window
        available: usize,
    },

    /// Stored history is shorter than the requested window
    #[error("Insufficient span: need {required_ms}ms, have {available_ms}ms")]
    InsufficientSpan {
        /// Requested window length
        required_ms: u32,
        /// Time between oldest and newest stored sample
        available_ms: u32,
    },

    /// Sample arrived sooner than the minimum spacing allows
    #[error("Rate limited: {elapsed_ms}ms since last sample, need {min_spacing_ms}ms")]
    RateLimited {
        /// Time since the newest stored sample
        elapsed_ms: u32,
        /// Configured minimum spacing
        min_spacing_ms: u32,
    },

    /// Sample timestamp precedes the newest stored sample
    #[error("Out of order sample: last {last}, received {received}")]
    OutOfOrder {
        /// Timestamp of the newest stored sample
        last: u32,
        /// Timestamp of the rejected sample
        received: u32,
    },

    /// Two samples share a timestamp where a slope was required
    #[error("Degenerate time delta: samples share a timestamp")]
    DegenerateTimeDelta,

    /// Query window parameters cannot be satisfied
    #[error("Invalid window: {reason}")]
    InvalidWindow {
        /// What was wrong with the window
        reason: &'static str,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which rule the configuration broke
        reason: &'static str,
    },

    /// Averaging scheme declared but not supported
    #[error("Averaging scheme not supported: {scheme}")]
    UnsupportedScheme {
        /// Name of the requested scheme
        scheme: &'static str,
    },

    /// Lock was not acquired within the bounded wait
    #[error("Lock not acquired within {timeout_ms}ms")]
    LockTimeout {
        /// Bounded wait that expired
        timeout_ms: u32,
    },
}

impl MonitorError {
    /// True for the "not enough history yet" family of errors
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::InsufficientSpan { .. }
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InsufficientData { required, available } =>
                defmt::write!(fmt, "Need {} samples, have {}", required, available),
            Self::InsufficientSpan { required_ms, available_ms } =>
                defmt::write!(fmt, "Need {}ms span, have {}ms", required_ms, available_ms),
            Self::RateLimited { elapsed_ms, min_spacing_ms } =>
                defmt::write!(fmt, "Rate limited: {}ms < {}ms", elapsed_ms, min_spacing_ms),
            Self::OutOfOrder { last, received } =>
                defmt::write!(fmt, "Out of order: {} after {}", received, last),
            Self::DegenerateTimeDelta =>
                defmt::write!(fmt, "Degenerate time delta"),
            Self::InvalidWindow { reason } =>
                defmt::write!(fmt, "Invalid window: {}", reason),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid config: {}", reason),
            Self::UnsupportedScheme { scheme } =>
                defmt::write!(fmt, "Unsupported scheme: {}", scheme),
            Self::LockTimeout { timeout_ms } =>
                defmt::write!(fmt, "Lock timeout after {}ms", timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_family() {
        assert!(MonitorError::InsufficientData { required: 2, available: 1 }.is_insufficient_data());
        assert!(MonitorError::InsufficientSpan { required_ms: 500, available_ms: 400 }.is_insufficient_data());
        assert!(!MonitorError::DegenerateTimeDelta.is_insufficient_data());
    }

    #[test]
    fn errors_stay_small() {
        assert!(core::mem::size_of::<MonitorError>() <= 24);
    }
}
