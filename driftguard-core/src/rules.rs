//! Anomaly Rules
//!
//! ## Overview
//!
//! A monitor classifies every stored sample against two independent rules:
//!
//! ### Threshold Rule
//! The sample itself is compared with a limit. `AboveLimit` flags values
//! strictly greater than the limit, `BelowLimit` flags values strictly less.
//!
//! ### Slope Rule
//! The rate of change (value units per millisecond) between a reference
//! sample and the new sample is compared with a limit:
//!
//! ```text
//! slope = (new.value - reference.value) / (new.timestamp - reference.timestamp)
//!
//! Absolute:    |slope| vs |limit|
//! Directional:  slope  vs  limit   (sign matters)
//! ```
//!
//! The reference is either the oldest sample inside the slope window, or the
//! oldest sample in the whole history (the cheap incremental form).
//!
//! A zero time delta never reaches the division: the store collapses equal
//! timestamps and [`is_slope_anomaly`] refuses to classify a zero interval.

use crate::errors::{MonitorError, MonitorResult};
use crate::constants::CLOCK_HALF_RANGE_MS;
use crate::value::MonitorValue;

/// Which side of a limit counts as an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnomalyDirection {
    /// Values below the limit are anomalies
    BelowLimit,
    /// Values above the limit are anomalies
    AboveLimit,
}

impl AnomalyDirection {
    /// Map the classic `check_below` flag onto a direction
    pub fn from_check_below(check_below: bool) -> Self {
        if check_below { Self::BelowLimit } else { Self::AboveLimit }
    }

    /// Strict comparison of `value` against `limit` in this direction
    #[inline]
    pub fn violates<V: PartialOrd>(self, value: V, limit: V) -> bool {
        match self {
            Self::AboveLimit => value > limit,
            Self::BelowLimit => value < limit,
        }
    }
}

/// How slopes are compared with their limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlopeMode {
    /// Compare magnitudes only
    Absolute,
    /// Compare signed values
    Directional,
}

/// Which stored sample anchors the slope of a new sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlopeReference {
    /// Oldest sample within the slope window before the new sample
    OldestInWindow,
    /// Oldest sample kept in the history
    OldestStored,
}

/// Threshold rule for a monitored variable
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdRule<T> {
    /// Limit compared with each sample
    pub limit: T,
    /// Side of the limit that is anomalous
    pub direction: AnomalyDirection,
    /// How long anomaly records are kept (milliseconds)
    pub window_ms: u32,
    /// How long a streak must last before `check_threshold` fires
    pub anomaly_duration_ms: u32,
}

impl<T: MonitorValue> ThresholdRule<T> {
    /// Rule flagging values above `limit`
    pub fn above(limit: T, window_ms: u32) -> Self {
        Self {
            limit,
            direction: AnomalyDirection::AboveLimit,
            window_ms,
            anomaly_duration_ms: 0,
        }
    }

    /// Rule flagging values below `limit`
    pub fn below(limit: T, window_ms: u32) -> Self {
        Self {
            direction: AnomalyDirection::BelowLimit,
            ..Self::above(limit, window_ms)
        }
    }

    /// Require a streak of `duration_ms` before firing
    pub fn with_anomaly_duration(mut self, duration_ms: u32) -> Self {
        self.anomaly_duration_ms = duration_ms;
        self
    }

    /// Classify one sample
    #[inline]
    pub fn is_anomaly(&self, value: T) -> bool {
        self.direction.violates(value, self.limit)
    }

    pub(crate) fn validate(&self) -> MonitorResult<()> {
        validate_windows(self.window_ms, self.anomaly_duration_ms)
    }
}

/// Slope rule for a monitored variable
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlopeRule {
    /// Slope limit in value units per millisecond
    pub limit: f64,
    /// Side of the limit that is anomalous
    pub direction: AnomalyDirection,
    /// Magnitude or signed comparison
    pub mode: SlopeMode,
    /// Anchor sample for each new slope
    pub reference: SlopeReference,
    /// Slope window and anomaly record retention (milliseconds)
    pub window_ms: u32,
    /// How long a streak must last before `check_slope` fires
    pub anomaly_duration_ms: u32,
}

impl SlopeRule {
    /// Flag slopes whose magnitude exceeds `limit` over `window_ms`
    pub fn absolute(limit: f64, window_ms: u32) -> Self {
        Self {
            limit,
            direction: AnomalyDirection::AboveLimit,
            mode: SlopeMode::Absolute,
            reference: SlopeReference::OldestInWindow,
            window_ms,
            anomaly_duration_ms: 0,
        }
    }

    /// Flag signed slopes beyond `limit` in `direction`
    pub fn directional(limit: f64, direction: AnomalyDirection, window_ms: u32) -> Self {
        Self {
            direction,
            mode: SlopeMode::Directional,
            ..Self::absolute(limit, window_ms)
        }
    }

    /// Override the anomalous side
    pub fn with_direction(mut self, direction: AnomalyDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Anchor slopes at the oldest stored sample
    pub fn with_reference(mut self, reference: SlopeReference) -> Self {
        self.reference = reference;
        self
    }

    /// Require a streak of `duration_ms` before firing
    pub fn with_anomaly_duration(mut self, duration_ms: u32) -> Self {
        self.anomaly_duration_ms = duration_ms;
        self
    }

    /// Classify a change of `delta_value` over `delta_ms`
    #[inline]
    pub fn is_anomaly(&self, delta_value: f64, delta_ms: u32) -> bool {
        is_slope_anomaly(delta_value, delta_ms, self.limit, self.mode, self.direction)
    }

    pub(crate) fn validate(&self) -> MonitorResult<()> {
        if !self.limit.is_finite() {
            return Err(MonitorError::InvalidConfig {
                reason: "slope limit must be finite",
            });
        }
        validate_windows(self.window_ms, self.anomaly_duration_ms)
    }
}

/// Classify a change of `delta_value` over `delta_ms` against a slope limit
///
/// Returns `false` for a zero interval: no slope exists, so nothing can be
/// anomalous about it.
pub fn is_slope_anomaly(
    delta_value: f64,
    delta_ms: u32,
    limit: f64,
    mode: SlopeMode,
    direction: AnomalyDirection,
) -> bool {
    if delta_ms == 0 {
        return false;
    }

    let slope = delta_value / delta_ms as f64;
    match mode {
        SlopeMode::Absolute => direction.violates(libm::fabs(slope), libm::fabs(limit)),
        SlopeMode::Directional => direction.violates(slope, limit),
    }
}

fn validate_windows(window_ms: u32, anomaly_duration_ms: u32) -> MonitorResult<()> {
    if window_ms >= CLOCK_HALF_RANGE_MS {
        return Err(MonitorError::InvalidConfig {
            reason: "window exceeds clock half-range",
        });
    }
    if anomaly_duration_ms > window_ms {
        return Err(MonitorError::InvalidConfig {
            reason: "anomaly duration longer than its window",
        });
    }
    Ok(())
}
