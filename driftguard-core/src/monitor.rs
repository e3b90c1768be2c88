//! Single-Context Variable Monitor
//!
//! ## Overview
//!
//! `Monitor` tracks one streamed scalar: it throttles and stores samples,
//! keeps threshold and slope anomaly streaks, and answers the windowed
//! queries of [`VariableTracker`]. Writes take `&mut self`, so the borrow
//! checker already keeps queries from racing updates; use
//! [`crate::SharedMonitor`] when several contexts must update the same
//! variable.
//!
//! ## Storage Policy
//!
//! | Alias             | Samples                 | Cleanup              |
//! |-------------------|-------------------------|----------------------|
//! | `BoundedMonitor`  | `RingStore`, const size | capacity overwrite   |
//! | `GrowableMonitor` | `GrowableStore` (heap)  | age eviction per update |
//!
//! ## Usage
//!
//! ```rust
//! use driftguard_core::{BoundedMonitor, MonitorConfig, ThresholdRule, ring_capacity};
//! use driftguard_core::time::MockTimeSource;
//!
//! const SLOTS: usize = ring_capacity(1_000, 10);
//!
//! let clock = MockTimeSource::new(0);
//! let config = MonitorConfig::new(10)
//!     .with_threshold(ThresholdRule::above(80.0f32, 1_000).with_anomaly_duration(50));
//! let mut monitor: BoundedMonitor<f32, _, SLOTS> =
//!     BoundedMonitor::new(config, &clock).unwrap().with_label("coolant");
//!
//! for _ in 0..10 {
//!     monitor.update_value(85.0).unwrap();
//!     clock.advance(10);
//! }
//! assert!(monitor.check_threshold());
//! assert!(!monitor.check_threshold()); // edge triggered
//! ```

use crate::anomaly::StreakState;
use crate::config::MonitorConfig;
use crate::errors::MonitorResult;
use crate::history::{check_capacity, History};
use crate::query::{AveragingScheme, SlopeCalculation, Window};
use crate::rules::{AnomalyDirection, SlopeMode};
use crate::sample::Sample;
use crate::store::{GrowableStore, PushOutcome, RingStore, TimeSeries};
use crate::time::{TimeSource, Timestamp};
use crate::tracker::VariableTracker;
use crate::value::MonitorValue;

/// How an accepted sample was stored
pub type UpdateOutcome = PushOutcome;

/// Monitor with compile-time sized ring storage (no heap)
pub type BoundedMonitor<T, C, const N: usize> =
    Monitor<T, RingStore<Sample<T>, N>, RingStore<Timestamp, N>, C>;

/// Monitor with heap storage trimmed by age
pub type GrowableMonitor<T, C> =
    Monitor<T, GrowableStore<Sample<T>>, GrowableStore<Timestamp>, C>;

/// Time-windowed anomaly monitor for one variable
#[derive(Debug)]
pub struct Monitor<T, S, A, C> {
    config: MonitorConfig<T>,
    history: History<T, S, A>,
    clock: C,
}

impl<T, S, A, C> Monitor<T, S, A, C>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>> + Default,
    A: TimeSeries<Entry = Timestamp> + Default,
    C: TimeSource,
{
    /// Create a monitor with empty default stores
    pub fn new(config: MonitorConfig<T>, clock: C) -> MonitorResult<Self> {
        Self::with_stores(config, clock, S::default(), A::default(), A::default())
    }
}

impl<T, S, A, C> Monitor<T, S, A, C>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
    C: TimeSource,
{
    /// Create a monitor over caller-supplied stores
    ///
    /// Fails when the configuration is invalid or a bounded sample store
    /// cannot hold the retention window at the configured spacing.
    pub fn with_stores(
        config: MonitorConfig<T>,
        clock: C,
        samples: S,
        threshold_records: A,
        slope_records: A,
    ) -> MonitorResult<Self> {
        config.validate()?;
        check_capacity(samples.capacity(), &config)?;
        Ok(Self {
            config,
            history: History::new(samples, threshold_records, slope_records),
            clock,
        })
    }

    /// Name the monitor in log lines (truncated to 16 bytes)
    pub fn with_label(mut self, label: &str) -> Self {
        self.history.set_label(label);
        self
    }

    /// Label used in log lines
    pub fn label(&self) -> &str {
        self.history.label()
    }

    /// Current configuration
    pub fn config(&self) -> &MonitorConfig<T> {
        &self.config
    }

    /// Change the configuration, keeping the old one if the result is invalid
    ///
    /// ```rust
    /// # use driftguard_core::{GrowableMonitor, MonitorConfig, ThresholdRule};
    /// # use driftguard_core::time::FixedTime;
    /// let mut monitor: GrowableMonitor<i32, _> = GrowableMonitor::new(
    ///     MonitorConfig::new(5).with_threshold(ThresholdRule::above(100, 500)),
    ///     FixedTime::new(0),
    /// ).unwrap();
    ///
    /// monitor.configure(|config| config.set_check_below_threshold(true)).unwrap();
    /// assert!(monitor.configure(|config| config.set_threshold_anomaly_duration(900)).is_err());
    /// assert_eq!(monitor.config().threshold.unwrap().anomaly_duration_ms, 0);
    /// ```
    pub fn configure(&mut self, change: impl FnOnce(&mut MonitorConfig<T>)) -> MonitorResult<()> {
        let mut candidate = self.config;
        change(&mut candidate);
        candidate.validate()?;
        check_capacity(self.history.samples().capacity(), &candidate)?;
        self.config = candidate;
        Ok(())
    }

    /// Store a new sample stamped with the current time
    ///
    /// `Err(RateLimited)` is the routine outcome when samples arrive faster
    /// than the configured spacing; nothing changes in that case.
    pub fn update_value(&mut self, value: T) -> MonitorResult<UpdateOutcome> {
        let now = self.clock.now();
        self.history.ingest(&self.config, value, now)
    }

    /// Threshold streak has lasted the anomaly duration (fires once)
    pub fn check_threshold(&mut self) -> bool {
        let now = self.clock.now();
        self.history.check_threshold(&self.config, now)
    }

    /// Slope streak has lasted the anomaly duration (fires once)
    pub fn check_slope(&mut self) -> bool {
        let now = self.clock.now();
        self.history.check_slope(&self.config, now)
    }

    /// Evict samples and anomaly records older than their windows now
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        self.history.cleanup(&self.config, now)
    }

    /// Discard every sample and anomaly record
    pub fn erase(&mut self) {
        self.history.erase();
    }

    /// Stored samples, oldest first
    pub fn samples(&self) -> &S {
        self.history.samples()
    }

    /// Current threshold streak
    pub fn threshold_streak(&self) -> StreakState {
        self.history.threshold_state()
    }

    /// Current slope streak
    pub fn slope_streak(&self) -> StreakState {
        self.history.slope_state()
    }

    /// Samples within the retention window
    pub fn value_count(&self) -> usize {
        self.history.value_count(&self.config, self.clock.now())
    }

    /// Threshold violations within the threshold window
    pub fn threshold_anomaly_count(&self) -> usize {
        self.history.threshold_anomaly_count(&self.config, self.clock.now())
    }

    /// Slope violations within the slope window
    pub fn slope_anomaly_count(&self) -> usize {
        self.history.slope_anomaly_count(&self.config, self.clock.now())
    }

    /// Most recent threshold violation, kept across streak clears
    pub fn last_threshold_anomaly(&self) -> Option<Timestamp> {
        self.history.threshold_log().last_anomaly()
    }

    /// Most recent slope violation, kept across streak clears
    pub fn last_slope_anomaly(&self) -> Option<Timestamp> {
        self.history.slope_log().last_anomaly()
    }
}

impl<T, S, A, C> VariableTracker<T> for Monitor<T, S, A, C>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
    C: TimeSource,
{
    fn check_if_value_consistently(&self, side: AnomalyDirection, threshold: T, window: Window) -> bool {
        self.history
            .check_if_value_consistently(side, threshold, &window, self.clock.now())
    }

    fn check_if_value_between_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool {
        self.history
            .check_if_value_between_bound_consistently(lower, upper, &window, self.clock.now())
    }

    fn check_if_value_out_of_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool {
        self.history
            .check_if_value_out_of_bound_consistently(lower, upper, &window, self.clock.now())
    }

    fn average_scheme_value(&self, window: Window, scheme: AveragingScheme) -> MonitorResult<T> {
        self.history.average(&window, scheme, self.clock.now())
    }

    fn simple_slope(&self, window: Window) -> MonitorResult<f64> {
        self.history.simple_slope(&window, self.clock.now())
    }

    fn advanced_slope(
        &self,
        window: Window,
        calculation: SlopeCalculation,
        smoothing: usize,
    ) -> MonitorResult<f64> {
        self.history
            .advanced_slope(&window, calculation, smoothing, self.clock.now())
    }

    fn check_if_slope(
        &self,
        direction: AnomalyDirection,
        limit: f64,
        mode: SlopeMode,
        window: Window,
    ) -> bool {
        self.history
            .check_if_slope(direction, limit, mode, &window, self.clock.now())
    }

    fn max_value(&self) -> MonitorResult<T> {
        self.history.max_value(&self.config, self.clock.now())
    }

    fn min_value(&self) -> MonitorResult<T> {
        self.history.min_value(&self.config, self.clock.now())
    }

    fn last_value(&self) -> MonitorResult<Sample<T>> {
        self.history.last_sample(&self.config, self.clock.now())
    }
}
