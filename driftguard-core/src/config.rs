//! Monitor configuration
//!
//! Built with chained `with_*` calls and adjusted at runtime with the
//! `set_*` methods, usually through `Monitor::configure` so a rejected
//! change leaves the previous configuration in effect.
//!
//! ```rust
//! use driftguard_core::{MonitorConfig, ThresholdRule, SlopeRule};
//!
//! // Motor winding temperature: sample at most every 100 ms, flag
//! // > 120.0 lasting 2 s, flag swings faster than 0.01 units/ms over 5 s
//! let config = MonitorConfig::new(100)
//!     .with_threshold(ThresholdRule::above(120.0f32, 5_000).with_anomaly_duration(2_000))
//!     .with_slope(SlopeRule::absolute(0.01, 5_000).with_anomaly_duration(1_000));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.retention_ms(), 5_000);
//! ```

use crate::constants::CLOCK_HALF_RANGE_MS;
use crate::errors::{MonitorError, MonitorResult};
use crate::rules::{AnomalyDirection, SlopeMode, SlopeRule, ThresholdRule};
use crate::value::MonitorValue;

/// Everything a monitor needs to classify and retain samples
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorConfig<T> {
    /// Minimum spacing between stored samples (milliseconds)
    ///
    /// Zero disables throttling; samples landing in the same millisecond
    /// then replace each other.
    pub min_spacing_ms: u32,
    /// Samples are kept at least this long even without rules
    pub history_ms: u32,
    /// Threshold rule, `None` disables threshold tracking
    pub threshold: Option<ThresholdRule<T>>,
    /// Slope rule, `None` disables slope tracking
    pub slope: Option<SlopeRule>,
}

impl<T: MonitorValue> MonitorConfig<T> {
    /// Configuration with no rules and the given sample spacing
    pub fn new(min_spacing_ms: u32) -> Self {
        Self {
            min_spacing_ms,
            history_ms: 0,
            threshold: None,
            slope: None,
        }
    }

    /// Keep at least `history_ms` of samples for the windowed queries
    pub fn with_history(mut self, history_ms: u32) -> Self {
        self.history_ms = history_ms;
        self
    }

    /// Enable threshold tracking
    pub fn with_threshold(mut self, rule: ThresholdRule<T>) -> Self {
        self.threshold = Some(rule);
        self
    }

    /// Enable slope tracking
    pub fn with_slope(mut self, rule: SlopeRule) -> Self {
        self.slope = Some(rule);
        self
    }

    /// Check every rule and the spacing
    pub fn validate(&self) -> MonitorResult<()> {
        if self.min_spacing_ms >= CLOCK_HALF_RANGE_MS {
            return Err(MonitorError::InvalidConfig {
                reason: "sample spacing exceeds clock half-range",
            });
        }
        if self.history_ms >= CLOCK_HALF_RANGE_MS {
            return Err(MonitorError::InvalidConfig {
                reason: "history exceeds clock half-range",
            });
        }
        if let Some(rule) = &self.threshold {
            rule.validate()?;
        }
        if let Some(rule) = &self.slope {
            rule.validate()?;
        }
        Ok(())
    }

    /// How long samples are kept: the history or the longest rule window
    pub fn retention_ms(&self) -> u32 {
        let threshold = self.threshold.map_or(0, |rule| rule.window_ms);
        let slope = self.slope.map_or(0, |rule| rule.window_ms);
        self.history_ms.max(threshold).max(slope)
    }

    /// Change the minimum spacing between stored samples
    pub fn set_min_spacing(&mut self, min_spacing_ms: u32) {
        self.min_spacing_ms = min_spacing_ms;
    }

    /// Change the threshold limit, enabling an above-limit rule if none exists
    pub fn set_threshold(&mut self, limit: T) {
        match &mut self.threshold {
            Some(rule) => rule.limit = limit,
            None => self.threshold = Some(ThresholdRule::above(limit, self.retention_ms())),
        }
    }

    /// Change the threshold limit together with its window and duration
    pub fn set_threshold_with_window(&mut self, limit: T, window_ms: u32, anomaly_duration_ms: u32) {
        let direction = self
            .threshold
            .map_or(AnomalyDirection::AboveLimit, |rule| rule.direction);
        self.threshold = Some(ThresholdRule {
            limit,
            direction,
            window_ms,
            anomaly_duration_ms,
        });
    }

    /// Change how long a threshold streak must last before firing
    pub fn set_threshold_anomaly_duration(&mut self, anomaly_duration_ms: u32) {
        if let Some(rule) = &mut self.threshold {
            rule.anomaly_duration_ms = anomaly_duration_ms;
        }
    }

    /// Flag values below (`true`) or above (`false`) the threshold
    pub fn set_check_below_threshold(&mut self, check_below: bool) {
        if let Some(rule) = &mut self.threshold {
            rule.direction = AnomalyDirection::from_check_below(check_below);
        }
    }

    /// Change the slope limit together with its window and duration
    pub fn set_slope_limit(&mut self, limit: f64, window_ms: u32, anomaly_duration_ms: u32) {
        let mut rule = self
            .slope
            .unwrap_or_else(|| SlopeRule::absolute(limit, window_ms));
        rule.limit = limit;
        rule.window_ms = window_ms;
        rule.anomaly_duration_ms = anomaly_duration_ms;
        self.slope = Some(rule);
    }

    /// Compare slope magnitudes (`true`) or signed slopes (`false`)
    pub fn use_absolute_slope(&mut self, absolute: bool) {
        if let Some(rule) = &mut self.slope {
            rule.mode = if absolute { SlopeMode::Absolute } else { SlopeMode::Directional };
        }
    }
}
