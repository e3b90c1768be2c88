//! Query Interface for Tracked Variables
//!
//! `VariableTracker` is the read surface shared by [`crate::Monitor`] and
//! [`crate::SharedMonitor`], so application code can analyse a variable
//! without knowing how it is stored or locked.
//!
//! ## Result Conventions
//!
//! - Predicates return `bool`. Any condition that prevents an answer
//!   (too few samples, history too short, lock timeout) yields `false`.
//! - Value queries return [`MonitorResult`]; the error says why no value
//!   was produced.
//!
//! ## Example
//!
//! ```rust
//! use driftguard_core::{
//!     AnomalyDirection, GrowableMonitor, MonitorConfig, VariableTracker, Window,
//! };
//! use driftguard_core::time::MockTimeSource;
//!
//! fn too_cold<V: VariableTracker<f32>>(tracker: &V) -> bool {
//!     tracker.check_if_value_consistently(AnomalyDirection::BelowLimit, 5.0, Window::last(300))
//! }
//!
//! let clock = MockTimeSource::new(0);
//! let mut monitor: GrowableMonitor<f32, _> =
//!     GrowableMonitor::new(MonitorConfig::new(100).with_history(1_000), &clock).unwrap();
//!
//! for reading in [4.0, 3.5, 4.2, 3.9] {
//!     monitor.update_value(reading).unwrap();
//!     clock.advance(100);
//! }
//! clock.set(300);
//! assert!(too_cold(&monitor));
//! ```

use crate::errors::MonitorResult;
use crate::query::{AveragingScheme, SlopeCalculation, Window};
use crate::rules::{AnomalyDirection, SlopeMode};
use crate::sample::Sample;
use crate::value::MonitorValue;

/// Windowed analytics over a monitored variable
pub trait VariableTracker<T: MonitorValue> {
    /// Every sample in `window` is strictly on `side` of `threshold`
    ///
    /// `BelowLimit` asks "consistently below", `AboveLimit` "consistently
    /// above". Also requires `window.min_points` samples and a history
    /// spanning the whole window.
    fn check_if_value_consistently(&self, side: AnomalyDirection, threshold: T, window: Window) -> bool;

    /// Every sample in `window` satisfies `lower < value < upper`
    fn check_if_value_between_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool;

    /// No sample in `window` satisfies `lower < value < upper`
    fn check_if_value_out_of_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool;

    /// Average of the samples in `window` by `scheme`
    ///
    /// Only [`AveragingScheme::Mean`] is supported; other schemes return
    /// `UnsupportedScheme`.
    fn average_scheme_value(&self, window: Window, scheme: AveragingScheme) -> MonitorResult<T>;

    /// Two-point slope across `window`, value units per millisecond
    ///
    /// Ignores `window.min_points`; two distinct samples are enough.
    fn simple_slope(&self, window: Window) -> MonitorResult<f64>;

    /// Slope of a `smoothing`-sample moving average, reduced by `calculation`
    ///
    /// Each step divides by the distance between the averages' mean
    /// timestamps, so a steady ramp reads its true rate for any `smoothing`.
    fn advanced_slope(
        &self,
        window: Window,
        calculation: SlopeCalculation,
        smoothing: usize,
    ) -> MonitorResult<f64>;

    /// Classify the two-point slope across `window` against a limit
    fn check_if_slope(
        &self,
        direction: AnomalyDirection,
        limit: f64,
        mode: SlopeMode,
        window: Window,
    ) -> bool;

    /// Largest value within the retention window
    fn max_value(&self) -> MonitorResult<T>;

    /// Smallest value within the retention window
    fn min_value(&self) -> MonitorResult<T>;

    /// Newest sample within the retention window
    fn last_value(&self) -> MonitorResult<Sample<T>>;

    /// Arithmetic mean of the samples in `window`
    fn average_value(&self, window: Window) -> MonitorResult<T> {
        self.average_scheme_value(window, AveragingScheme::Mean)
    }

    /// Samples in `window` stay within `error_bound` centred on their mean
    fn is_value_stabilized(&self, error_bound: T, window: Window) -> bool {
        let mean = match self.average_value(window) {
            Ok(mean) => mean.to_f64(),
            Err(_) => return false,
        };
        let half = error_bound.to_f64() / 2.0;
        self.check_if_value_between_bound_consistently(
            T::from_f64(mean - half),
            T::from_f64(mean + half),
            window,
        )
    }
}
