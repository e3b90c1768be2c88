//! Windowed Query Parameters
//!
//! ## Windows
//!
//! Every windowed query looks at the trailing interval
//!
//! ```text
//!   [end - duration_ms, end]      end = now           (WindowEnd::Now)
//!                                 end = newest sample (WindowEnd::LatestSample)
//! ```
//!
//! and needs at least `min_points` samples inside it. Aggregating queries
//! (consistency checks, averages, smoothed slopes) additionally require the
//! stored history to span `duration_ms`, so a monitor that has only been
//! running for 400 ms never claims something held "for 500 ms".
//!
//! ```rust
//! use driftguard_core::{Window, WindowEnd};
//!
//! let window = Window::last(500).from_latest_sample().min_points(3);
//! assert_eq!(window.duration_ms, 500);
//! assert_eq!(window.end, WindowEnd::LatestSample);
//! ```
//!
//! ## Smoothed Slope Reduction
//!
//! The smoothed slope query produces one slope per step of a moving
//! average; [`SlopeCalculation`] picks how that series collapses into a
//! single number. The reduction is streaming, so no slope series is ever
//! buffered.

use crate::constants::{CLOCK_HALF_RANGE_MS, DEFAULT_MIN_DATA_POINTS};
use crate::errors::{MonitorError, MonitorResult};

/// Where a query window ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowEnd {
    /// Window ends at the current clock reading
    Now,
    /// Window ends at the newest stored sample
    LatestSample,
}

/// Trailing time window for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    /// Window length (milliseconds)
    pub duration_ms: u32,
    /// Anchor of the window's newer edge
    pub end: WindowEnd,
    /// Fewest samples the window must contain
    pub min_points: usize,
}

impl Window {
    /// Window covering the last `duration_ms`, ending now
    pub const fn last(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            end: WindowEnd::Now,
            min_points: DEFAULT_MIN_DATA_POINTS,
        }
    }

    /// End the window at the newest stored sample
    pub const fn from_latest_sample(mut self) -> Self {
        self.end = WindowEnd::LatestSample;
        self
    }

    /// End the window at the current time
    pub const fn from_now(mut self) -> Self {
        self.end = WindowEnd::Now;
        self
    }

    /// Pick the anchor with the classic `use_current_time` flag
    pub const fn use_current_time(self, use_current_time: bool) -> Self {
        if use_current_time {
            self.from_now()
        } else {
            self.from_latest_sample()
        }
    }

    /// Require at least `min_points` samples
    pub const fn min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub(crate) fn validate(&self) -> MonitorResult<()> {
        if self.duration_ms >= CLOCK_HALF_RANGE_MS {
            return Err(MonitorError::InvalidWindow {
                reason: "duration exceeds clock half-range",
            });
        }
        Ok(())
    }
}

/// How samples in a window are averaged
///
/// Only `Mean` is supported. The other schemes are recognised so callers
/// get `UnsupportedScheme` instead of a silently wrong number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AveragingScheme {
    /// Arithmetic mean
    Mean,
    /// Middle value (not supported yet)
    Median,
    /// Most frequent value (not supported yet)
    Mode,
    /// Geometric mean (not supported yet)
    Geometric,
    /// Harmonic mean (not supported yet)
    Harmonic,
}

impl AveragingScheme {
    /// Short name used in errors and logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Geometric => "geometric",
            Self::Harmonic => "harmonic",
        }
    }

    /// Check whether the scheme can be computed
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Mean)
    }

    pub(crate) fn ensure_supported(self) -> MonitorResult<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(MonitorError::UnsupportedScheme { scheme: self.name() })
        }
    }
}

/// How a series of smoothed slopes is reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlopeCalculation {
    /// Mean of all slopes
    Average,
    /// Largest slope
    Maximum,
    /// Smallest slope
    Minimum,
    /// Largest absolute difference between consecutive slopes
    Change,
    /// Most recent slope
    Last,
}

/// Streaming reducer for a slope series
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlopeReducer {
    calculation: SlopeCalculation,
    count: usize,
    sum: f64,
    max: f64,
    min: f64,
    max_change: f64,
    last: f64,
}

impl SlopeReducer {
    pub(crate) fn new(calculation: SlopeCalculation) -> Self {
        Self {
            calculation,
            count: 0,
            sum: 0.0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
            max_change: 0.0,
            last: 0.0,
        }
    }

    pub(crate) fn push(&mut self, slope: f64) {
        if self.count > 0 {
            let change = libm::fabs(slope - self.last);
            if change > self.max_change {
                self.max_change = change;
            }
        }
        self.count += 1;
        self.sum += slope;
        if slope > self.max {
            self.max = slope;
        }
        if slope < self.min {
            self.min = slope;
        }
        self.last = slope;
    }

    /// Reduced value, `None` when no slope was pushed
    pub(crate) fn finish(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(match self.calculation {
            SlopeCalculation::Average => self.sum / self.count as f64,
            SlopeCalculation::Maximum => self.max,
            SlopeCalculation::Minimum => self.min,
            SlopeCalculation::Change => self.max_change,
            SlopeCalculation::Last => self.last,
        })
    }
}
