//! Sample History and Query Engine
//!
//! ## Overview
//!
//! `History` owns everything a monitor mutates: the sample store and one
//! anomaly log per rule. It does not own the configuration or the clock;
//! both are passed in per call so a shared monitor can guard configuration
//! and data with separate locks.
//!
//! ## Update Path
//!
//! ```text
//! ingest(value, now)
//!   │
//!   ├─ closer than min_spacing to newest sample? ── yes ─▶ Err(RateLimited)
//!   │
//!   ├─ append (same millisecond replaces the newest sample)
//!   ├─ threshold rule ── violation ─▶ record   │ good sample ─▶ clear streak
//!   ├─ slope rule     ── violation ─▶ record   │ good sample ─▶ clear streak
//!   └─ unbounded store? ─▶ evict by age (samples and anomaly records)
//! ```
//!
//! ## Query Path
//!
//! Queries pick the samples stamped inside `[end - duration, end]` with the
//! store's directional scans, then fold over that index range. Nothing is
//! copied out of the store and nothing allocates.

use core::marker::PhantomData;
use core::ops::RangeInclusive;

use crate::anomaly::{AnomalyLog, StreakState};
use crate::config::MonitorConfig;
use crate::constants::{LABEL_CAPACITY, MIN_SMOOTHING_WINDOW};
use crate::errors::{MonitorError, MonitorResult};
use crate::query::{AveragingScheme, SlopeCalculation, SlopeReducer, Window, WindowEnd};
use crate::rules::{is_slope_anomaly, AnomalyDirection, SlopeMode, SlopeReference};
use crate::sample::Sample;
use crate::store::{ring_capacity, PushOutcome, TimeSeries};
use crate::time::{elapsed_ms, is_at_or_before, Timestamp};
use crate::value::MonitorValue;

/// Monitor identifier shown in log lines
pub type Label = heapless::String<LABEL_CAPACITY>;

/// Build a label, truncating at a character boundary when too long
pub fn make_label(name: &str) -> Label {
    let mut label = Label::new();
    for ch in name.chars() {
        if label.push(ch).is_err() {
            break;
        }
    }
    label
}

/// Reject a bounded store that cannot hold the retention window
pub(crate) fn check_capacity<T: MonitorValue>(
    capacity: Option<usize>,
    config: &MonitorConfig<T>,
) -> MonitorResult<()> {
    match capacity {
        Some(slots) if slots < ring_capacity(config.retention_ms(), config.min_spacing_ms) => {
            Err(MonitorError::InvalidConfig {
                reason: "store capacity cannot hold the retention window",
            })
        }
        _ => Ok(()),
    }
}

/// Samples and anomaly streaks of one monitored variable
#[derive(Debug, Clone)]
pub struct History<T, S, A> {
    label: Label,
    samples: S,
    threshold: AnomalyLog<A>,
    slope: AnomalyLog<A>,
    _value: PhantomData<T>,
}

impl<T, S, A> History<T, S, A>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
{
    /// Wrap empty stores
    pub fn new(samples: S, threshold_records: A, slope_records: A) -> Self {
        Self {
            label: Label::new(),
            samples,
            threshold: AnomalyLog::new(threshold_records),
            slope: AnomalyLog::new(slope_records),
            _value: PhantomData,
        }
    }

    /// Replace the label used in log lines
    pub fn set_label(&mut self, name: &str) {
        self.label = make_label(name);
    }

    /// Label used in log lines
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Stored samples, oldest first
    pub fn samples(&self) -> &S {
        &self.samples
    }

    /// Threshold streak log
    pub fn threshold_log(&self) -> &AnomalyLog<A> {
        &self.threshold
    }

    /// Slope streak log
    pub fn slope_log(&self) -> &AnomalyLog<A> {
        &self.slope
    }

    // ===== UPDATE PATH =====

    /// Store a sample taken at `now` and classify it
    pub fn ingest(
        &mut self,
        config: &MonitorConfig<T>,
        value: T,
        now: Timestamp,
    ) -> MonitorResult<PushOutcome> {
        if let Some(newest) = self.samples.back() {
            let elapsed = elapsed_ms(now, newest.timestamp);
            if elapsed < config.min_spacing_ms {
                log_trace!(
                    "{}: sample dropped, {}ms since last (min {}ms)",
                    self.label.as_str(),
                    elapsed,
                    config.min_spacing_ms
                );
                return Err(MonitorError::RateLimited {
                    elapsed_ms: elapsed,
                    min_spacing_ms: config.min_spacing_ms,
                });
            }
        }

        let outcome = match self.samples.append(Sample::new(value, now)) {
            Ok(outcome) => outcome,
            Err(error) => {
                log_warn!("{}: sample rejected: {}", self.label.as_str(), error);
                return Err(error);
            }
        };

        self.evaluate_threshold(config, value, now);
        self.evaluate_slope(config, value, now);

        if self.samples.capacity().is_none() {
            self.cleanup(config, now);
        }

        Ok(outcome)
    }

    fn evaluate_threshold(&mut self, config: &MonitorConfig<T>, value: T, now: Timestamp) {
        let Some(rule) = config.threshold else {
            return;
        };
        let violating = rule.is_anomaly(value);
        track_streak(&mut self.threshold, violating, now, self.label.as_str(), "threshold");
    }

    fn evaluate_slope(&mut self, config: &MonitorConfig<T>, value: T, now: Timestamp) {
        let Some(rule) = config.slope else {
            return;
        };

        let reference = match rule.reference {
            SlopeReference::OldestInWindow => self
                .samples
                .oldest_at_or_after(now.wrapping_sub(rule.window_ms))
                .and_then(|index| self.samples.get(index)),
            SlopeReference::OldestStored => self.samples.front(),
        };

        // A lone sample has no slope and therefore cannot violate
        let violating = match reference {
            Some(reference) if reference.timestamp != now => rule.is_anomaly(
                value.to_f64() - reference.value.to_f64(),
                elapsed_ms(now, reference.timestamp),
            ),
            _ => false,
        };
        track_streak(&mut self.slope, violating, now, self.label.as_str(), "slope");
    }

    /// Evict samples and anomaly records older than their retention windows
    ///
    /// Returns the number of samples evicted.
    pub fn cleanup(&mut self, config: &MonitorConfig<T>, now: Timestamp) -> usize {
        let evicted = self
            .samples
            .evict_older_than(now.wrapping_sub(config.retention_ms()));
        if let Some(rule) = config.threshold {
            self.threshold.evict_older_than(now.wrapping_sub(rule.window_ms));
        }
        if let Some(rule) = config.slope {
            self.slope.evict_older_than(now.wrapping_sub(rule.window_ms));
        }
        evicted
    }

    /// Discard all samples, streaks and last anomaly times
    pub fn erase(&mut self) {
        self.samples.clear();
        self.threshold.reset();
        self.slope.reset();
        log_debug!("{}: history erased", self.label.as_str());
    }

    // ===== ANOMALY CHECKS =====

    /// Fire once when the threshold streak has persisted long enough
    pub fn check_threshold(&mut self, config: &MonitorConfig<T>, now: Timestamp) -> bool {
        let Some(rule) = config.threshold else {
            return false;
        };
        let fired = self.threshold.fire_if_persisted(now, rule.anomaly_duration_ms);
        if fired {
            log_warn!(
                "{}: threshold anomaly persisted {}ms",
                self.label.as_str(),
                rule.anomaly_duration_ms
            );
        }
        fired
    }

    /// Fire once when the slope streak has persisted long enough
    pub fn check_slope(&mut self, config: &MonitorConfig<T>, now: Timestamp) -> bool {
        let Some(rule) = config.slope else {
            return false;
        };
        let fired = self.slope.fire_if_persisted(now, rule.anomaly_duration_ms);
        if fired {
            log_warn!(
                "{}: slope anomaly persisted {}ms",
                self.label.as_str(),
                rule.anomaly_duration_ms
            );
        }
        fired
    }

    /// Current threshold streak
    pub fn threshold_state(&self) -> StreakState {
        self.threshold.state()
    }

    /// Current slope streak
    pub fn slope_state(&self) -> StreakState {
        self.slope.state()
    }

    /// Threshold violations within the threshold window
    pub fn threshold_anomaly_count(&self, config: &MonitorConfig<T>, now: Timestamp) -> usize {
        config.threshold.map_or(0, |rule| {
            self.threshold.count_since(now.wrapping_sub(rule.window_ms))
        })
    }

    /// Slope violations within the slope window
    pub fn slope_anomaly_count(&self, config: &MonitorConfig<T>, now: Timestamp) -> usize {
        config
            .slope
            .map_or(0, |rule| self.slope.count_since(now.wrapping_sub(rule.window_ms)))
    }

    // ===== RETENTION QUERIES =====

    /// Samples within the retention window, newest first
    fn retained(
        &self,
        config: &MonitorConfig<T>,
        now: Timestamp,
    ) -> impl Iterator<Item = &Sample<T>> + '_ {
        let cutoff = now.wrapping_sub(config.retention_ms());
        self.samples
            .iter()
            .rev()
            .take_while(move |sample| is_at_or_before(cutoff, sample.timestamp))
    }

    /// Samples within the retention window
    pub fn value_count(&self, config: &MonitorConfig<T>, now: Timestamp) -> usize {
        self.retained(config, now).count()
    }

    /// Largest retained value
    pub fn max_value(&self, config: &MonitorConfig<T>, now: Timestamp) -> MonitorResult<T> {
        self.retained(config, now)
            .map(|sample| sample.value)
            .reduce(T::max_of)
            .ok_or(MonitorError::InsufficientData { required: 1, available: 0 })
    }

    /// Smallest retained value
    pub fn min_value(&self, config: &MonitorConfig<T>, now: Timestamp) -> MonitorResult<T> {
        self.retained(config, now)
            .map(|sample| sample.value)
            .reduce(T::min_of)
            .ok_or(MonitorError::InsufficientData { required: 1, available: 0 })
    }

    /// Newest retained sample
    pub fn last_sample(&self, config: &MonitorConfig<T>, now: Timestamp) -> MonitorResult<Sample<T>> {
        self.retained(config, now)
            .next()
            .copied()
            .ok_or(MonitorError::InsufficientData { required: 1, available: 0 })
    }

    // ===== WINDOWED QUERIES =====

    fn window_end(&self, end: WindowEnd, now: Timestamp) -> Option<Timestamp> {
        match end {
            WindowEnd::Now => Some(now),
            WindowEnd::LatestSample => self.samples.back().map(|sample| sample.timestamp),
        }
    }

    /// Time between the oldest and newest stored sample
    pub fn span_ms(&self) -> u32 {
        match (self.samples.front(), self.samples.back()) {
            (Some(oldest), Some(newest)) => elapsed_ms(newest.timestamp, oldest.timestamp),
            _ => 0,
        }
    }

    fn require_span(&self, duration_ms: u32) -> MonitorResult<()> {
        let available_ms = self.span_ms();
        if available_ms < duration_ms {
            return Err(MonitorError::InsufficientSpan {
                required_ms: duration_ms,
                available_ms,
            });
        }
        Ok(())
    }

    /// Index range of the samples inside `window`, honouring `min_points`
    fn select(&self, window: &Window, now: Timestamp) -> MonitorResult<RangeInclusive<usize>> {
        window.validate()?;
        let required = window.min_points;
        let none_found = MonitorError::InsufficientData { required, available: 0 };

        let end = self.window_end(window.end, now).ok_or(none_found)?;
        let start = end.wrapping_sub(window.duration_ms);
        let range = self.samples.window_indices(start, end).ok_or(none_found)?;

        let available = range.end() - range.start() + 1;
        if available < required {
            return Err(MonitorError::InsufficientData { required, available });
        }
        Ok(range)
    }

    /// Check that every sample in a spanned window satisfies `accepts`
    fn all_in_window(&self, window: &Window, now: Timestamp, accepts: impl Fn(T) -> bool) -> bool {
        let range = match self.select(window, now) {
            Ok(range) => range,
            Err(_) => return false,
        };
        if self.require_span(window.duration_ms).is_err() {
            return false;
        }
        // Newest first, stopping at the first rejected sample
        self.samples.iter_range(range).rev().all(|sample| accepts(sample.value))
    }

    /// Every windowed sample is strictly on `side` of `threshold`
    pub fn check_if_value_consistently(
        &self,
        side: AnomalyDirection,
        threshold: T,
        window: &Window,
        now: Timestamp,
    ) -> bool {
        self.all_in_window(window, now, |value| side.violates(value, threshold))
    }

    /// Every windowed sample satisfies `lower < value < upper`
    pub fn check_if_value_between_bound_consistently(
        &self,
        lower: T,
        upper: T,
        window: &Window,
        now: Timestamp,
    ) -> bool {
        self.all_in_window(window, now, |value| lower < value && value < upper)
    }

    /// No windowed sample satisfies `lower < value < upper`
    pub fn check_if_value_out_of_bound_consistently(
        &self,
        lower: T,
        upper: T,
        window: &Window,
        now: Timestamp,
    ) -> bool {
        self.all_in_window(window, now, |value| !(lower < value && value < upper))
    }

    /// Average of the windowed samples
    pub fn average(
        &self,
        window: &Window,
        scheme: AveragingScheme,
        now: Timestamp,
    ) -> MonitorResult<T> {
        scheme.ensure_supported()?;
        let range = self.select(window, now)?;
        self.require_span(window.duration_ms)?;

        let (sum, count) = self
            .samples
            .iter_range(range)
            .fold((0.0f64, 0usize), |(sum, count), sample| {
                (sum + sample.value.to_f64(), count + 1)
            });
        if count == 0 {
            return Err(MonitorError::InsufficientData {
                required: window.min_points.max(1),
                available: 0,
            });
        }
        Ok(T::from_f64(sum / count as f64))
    }

    /// Value change and elapsed time between the window's outermost samples
    fn slope_endpoints(&self, window: &Window, now: Timestamp) -> MonitorResult<(f64, u32)> {
        window.validate()?;
        let insufficient = |available| MonitorError::InsufficientData { required: 2, available };

        let end = self.window_end(window.end, now).ok_or(insufficient(0))?;
        let start = end.wrapping_sub(window.duration_ms);
        let newest = self.samples.newest_at_or_before(end).ok_or(insufficient(0))?;
        let oldest = self.samples.oldest_at_or_after(start).ok_or(insufficient(0))?;
        if oldest >= newest {
            return Err(insufficient(usize::from(oldest == newest)));
        }

        let (first, last) = match (self.samples.get(oldest), self.samples.get(newest)) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(insufficient(0)),
        };
        let delta_ms = elapsed_ms(last.timestamp, first.timestamp);
        if delta_ms == 0 {
            return Err(MonitorError::DegenerateTimeDelta);
        }
        Ok((last.value.to_f64() - first.value.to_f64(), delta_ms))
    }

    /// Two-point slope across the window (value units per millisecond)
    pub fn simple_slope(&self, window: &Window, now: Timestamp) -> MonitorResult<f64> {
        let (delta_value, delta_ms) = self.slope_endpoints(window, now)?;
        Ok(delta_value / delta_ms as f64)
    }

    /// Classify the window's two-point slope against an ad-hoc limit
    pub fn check_if_slope(
        &self,
        direction: AnomalyDirection,
        limit: f64,
        mode: SlopeMode,
        window: &Window,
        now: Timestamp,
    ) -> bool {
        match self.slope_endpoints(window, now) {
            Ok((delta_value, delta_ms)) => {
                is_slope_anomaly(delta_value, delta_ms, limit, mode, direction)
            }
            Err(_) => false,
        }
    }

    /// Slope of a moving average of `smoothing` samples, reduced per `calculation`
    ///
    /// Consecutive averages differ by one sample entering and one leaving,
    /// so each slope of the averaged series is
    ///
    /// ```text
    /// (v[i] - v[i - smoothing]) / (t[i] - t[i - smoothing])
    /// ```
    ///
    /// with the average's time taken as the mean timestamp of its samples.
    ///
    /// The divisor is the distance between the two averages' mean
    /// timestamps, not the span of one `smoothing`-sample window. On evenly
    /// spaced samples, dividing the change of averages by that span instead
    /// gives a result `smoothing - 1` times smaller. Limits tuned that way
    /// need scaling.
    pub fn advanced_slope(
        &self,
        window: &Window,
        calculation: SlopeCalculation,
        smoothing: usize,
        now: Timestamp,
    ) -> MonitorResult<f64> {
        if smoothing < MIN_SMOOTHING_WINDOW {
            return Err(MonitorError::InvalidWindow {
                reason: "moving average needs at least two samples",
            });
        }

        let needed = smoothing.saturating_add(1);
        let window = window.min_points(window.min_points.max(needed));
        let range = self.select(&window, now)?;
        self.require_span(window.duration_ms)?;

        let (first, last) = range.into_inner();
        let mut reducer = SlopeReducer::new(calculation);
        for newest in (first + smoothing)..=last {
            let (older, newer) = match (self.samples.get(newest - smoothing), self.samples.get(newest)) {
                (Some(older), Some(newer)) => (older, newer),
                _ => continue,
            };
            let delta_ms = elapsed_ms(newer.timestamp, older.timestamp);
            if delta_ms == 0 {
                return Err(MonitorError::DegenerateTimeDelta);
            }
            reducer.push((newer.value.to_f64() - older.value.to_f64()) / delta_ms as f64);
        }

        reducer.finish().ok_or(MonitorError::InsufficientData {
            required: needed,
            available: last - first + 1,
        })
    }
}

/// Extend or clear one streak, logging transitions
fn track_streak<A: TimeSeries<Entry = Timestamp>>(
    log: &mut AnomalyLog<A>,
    violating: bool,
    now: Timestamp,
    label: &str,
    rule: &str,
) {
    if violating {
        if log.record(now) {
            log_debug!("{}: {} streak started at {}", label, rule, now);
        }
    } else if log.clear_streak() {
        log_debug!("{}: {} streak cleared at {}", label, rule, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{SlopeRule, ThresholdRule};
    use crate::store::{GrowableStore, RingStore};

    type Growable = History<f64, GrowableStore<Sample<f64>>, GrowableStore<Timestamp>>;

    fn growable() -> Growable {
        History::new(GrowableStore::new(), GrowableStore::new(), GrowableStore::new())
    }

    fn feed(history: &mut Growable, config: &MonitorConfig<f64>, samples: &[(f64, Timestamp)]) {
        for &(value, at) in samples {
            history.ingest(config, value, at).unwrap();
        }
    }

    #[test]
    fn throttle_drops_close_samples() {
        let config = MonitorConfig::new(100).with_history(1_000);
        let mut history = growable();

        assert_eq!(history.ingest(&config, 1.0, 0), Ok(PushOutcome::Appended));
        assert_eq!(
            history.ingest(&config, 2.0, 50),
            Err(MonitorError::RateLimited { elapsed_ms: 50, min_spacing_ms: 100 })
        );
        assert_eq!(history.samples().len(), 1);
        assert_eq!(history.ingest(&config, 3.0, 150), Ok(PushOutcome::Appended));
    }

    #[test]
    fn unthrottled_same_millisecond_replaces() {
        let config = MonitorConfig::new(0).with_history(1_000);
        let mut history = growable();

        history.ingest(&config, 1.0, 10).unwrap();
        assert_eq!(history.ingest(&config, 4.0, 10), Ok(PushOutcome::Replaced));
        assert_eq!(history.samples().len(), 1);
        assert_eq!(history.last_sample(&config, 10), Ok(Sample::new(4.0, 10)));
    }

    #[test]
    fn threshold_streak_cleared_by_good_sample() {
        let config = MonitorConfig::new(1).with_threshold(ThresholdRule::above(50.0, 1_000));
        let mut history = growable();

        feed(&mut history, &config, &[(60.0, 0), (70.0, 10)]);
        assert_eq!(history.threshold_log().len(), 2);

        feed(&mut history, &config, &[(40.0, 20)]);
        assert!(history.threshold_log().is_empty());
        assert_eq!(history.threshold_log().last_anomaly(), Some(10));
    }

    #[test]
    fn slope_rule_uses_window_reference() {
        // 1 unit per 100ms is fine, 10 units per 100ms is not
        let config = MonitorConfig::new(1).with_slope(SlopeRule::absolute(0.05, 200));
        let mut history = growable();

        feed(&mut history, &config, &[(0.0, 0), (1.0, 100), (2.0, 200)]);
        assert!(!history.slope_log().is_violating());

        feed(&mut history, &config, &[(12.0, 300)]);
        assert!(history.slope_log().is_violating());

        // Flat against the sample at 300
        feed(&mut history, &config, &[(12.0, 500)]);
        assert!(!history.slope_log().is_violating());
    }

    #[test]
    fn slope_rule_with_stored_reference() {
        let rule = SlopeRule::absolute(0.05, 1_000).with_reference(SlopeReference::OldestStored);
        let config = MonitorConfig::new(1).with_slope(rule);
        let mut history = growable();

        // Lone sample has no slope
        feed(&mut history, &config, &[(0.0, 0)]);
        assert!(!history.slope_log().is_violating());

        feed(&mut history, &config, &[(10.0, 100)]);
        assert!(history.slope_log().is_violating());
    }

    #[test]
    fn check_threshold_fires_after_duration() {
        let config = MonitorConfig::new(1)
            .with_threshold(ThresholdRule::below(10.0, 1_000).with_anomaly_duration(100));
        let mut history = growable();

        feed(&mut history, &config, &[(5.0, 0), (5.0, 50)]);
        assert!(!history.check_threshold(&config, 50));
        assert!(history.check_threshold(&config, 100));
        assert!(!history.check_threshold(&config, 100));
    }

    #[test]
    fn cleanup_evicts_by_retention() {
        let config = MonitorConfig::new(1).with_history(100);
        let mut history = growable();

        feed(&mut history, &config, &[(1.0, 0), (2.0, 50), (3.0, 100)]);
        assert_eq!(history.samples().len(), 3);
        feed(&mut history, &config, &[(4.0, 160)]);
        assert_eq!(history.samples().len(), 2);
        assert_eq!(history.samples().front().map(|s| s.timestamp), Some(100));
    }

    #[test]
    fn bounded_store_skips_cleanup() {
        let config = MonitorConfig::new(10).with_history(20);
        let mut history: History<i32, RingStore<Sample<i32>, 3>, RingStore<Timestamp, 3>> =
            History::new(RingStore::new(), RingStore::new(), RingStore::new());
        assert!(check_capacity(history.samples().capacity(), &config).is_ok());

        for (value, at) in [(1, 0), (2, 10), (3, 20), (4, 30)] {
            history.ingest(&config, value, at).unwrap();
        }
        let kept: Vec<i32> = history.samples().iter().map(|s| s.value).collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn undersized_ring_rejected() {
        let config = MonitorConfig::<f32>::new(10).with_history(100);
        assert!(check_capacity(Some(5), &config).is_err());
        assert!(check_capacity(Some(11), &config).is_ok());
        assert!(check_capacity(None, &config).is_ok());
    }

    #[test]
    fn consistency_requires_span() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        feed(&mut history, &config, &[(90.0, 0), (95.0, 200), (80.0, 400)]);

        let window = Window::last(500).min_points(3);
        assert!(!history.check_if_value_consistently(AnomalyDirection::BelowLimit, 100.0, &window, 400));

        feed(&mut history, &config, &[(85.0, 500)]);
        assert!(history.check_if_value_consistently(AnomalyDirection::BelowLimit, 100.0, &window, 500));
        assert!(!history.check_if_value_consistently(AnomalyDirection::BelowLimit, 90.0, &window, 500));
    }

    #[test]
    fn bound_checks() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        feed(&mut history, &config, &[(5.0, 0), (6.0, 100), (7.0, 200)]);

        let window = Window::last(200);
        assert!(history.check_if_value_between_bound_consistently(4.0, 8.0, &window, 200));
        assert!(!history.check_if_value_between_bound_consistently(5.0, 8.0, &window, 200));
        assert!(history.check_if_value_out_of_bound_consistently(8.0, 10.0, &window, 200));
        assert!(!history.check_if_value_out_of_bound_consistently(6.5, 10.0, &window, 200));
    }

    #[test]
    fn average_over_window() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        feed(&mut history, &config, &[(1.0, 0), (2.0, 100), (3.0, 200), (7.0, 300)]);

        // Window [100, 300] holds 2, 3, 7
        let mean = history.average(&Window::last(200), AveragingScheme::Mean, 300);
        assert_eq!(mean, Ok(4.0));
        assert_eq!(
            history.average(&Window::last(200), AveragingScheme::Median, 300),
            Err(MonitorError::UnsupportedScheme { scheme: "median" })
        );
        assert!(matches!(
            history.average(&Window::last(500), AveragingScheme::Mean, 300),
            Err(MonitorError::InsufficientSpan { required_ms: 500, available_ms: 300 })
        ));
    }

    #[test]
    fn simple_slope_from_latest_sample() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        assert!(history.simple_slope(&Window::last(1_000), 0).is_err());

        feed(&mut history, &config, &[(10.0, 0), (20.0, 100)]);
        let slope = history.simple_slope(&Window::last(100).from_latest_sample(), 5_000);
        assert_eq!(slope, Ok(0.1));

        // Ending now, long after the samples, leaves nothing in the window
        assert!(history.simple_slope(&Window::last(100), 5_000).is_err());
    }

    #[test]
    fn check_if_slope_classifies_window() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        feed(&mut history, &config, &[(10.0, 0), (0.0, 100)]);

        let window = Window::last(100);
        assert!(history.check_if_slope(AnomalyDirection::AboveLimit, 0.05, SlopeMode::Absolute, &window, 100));
        assert!(!history.check_if_slope(AnomalyDirection::AboveLimit, 0.05, SlopeMode::Directional, &window, 100));
        assert!(history.check_if_slope(AnomalyDirection::BelowLimit, -0.05, SlopeMode::Directional, &window, 100));
    }

    #[test]
    fn advanced_slope_of_linear_ramp() {
        let config = MonitorConfig::new(1).with_history(10_000);
        let mut history = growable();
        for step in 0..10u32 {
            history.ingest(&config, f64::from(step) * 2.0, step * 100).unwrap();
        }

        let window = Window::last(900);
        for calculation in [SlopeCalculation::Average, SlopeCalculation::Maximum, SlopeCalculation::Last] {
            let slope = history.advanced_slope(&window, calculation, 3, 900).unwrap();
            assert!((slope - 0.02).abs() < 1e-12);
        }
        let change = history.advanced_slope(&window, SlopeCalculation::Change, 3, 900).unwrap();
        assert!(change.abs() < 1e-12);
    }

    #[test]
    fn advanced_slope_needs_full_window() {
        let config = MonitorConfig::new(1).with_history(1_000);
        let mut history = growable();
        feed(&mut history, &config, &[(1.0, 0), (2.0, 100), (3.0, 200)]);

        let window = Window::last(200);
        assert!(matches!(
            history.advanced_slope(&window, SlopeCalculation::Average, 1, 200),
            Err(MonitorError::InvalidWindow { .. })
        ));
        assert_eq!(
            history.advanced_slope(&window, SlopeCalculation::Average, 3, 200),
            Err(MonitorError::InsufficientData { required: 4, available: 3 })
        );
        assert_eq!(history.advanced_slope(&window, SlopeCalculation::Average, 2, 200), Ok(0.01));
    }

    #[test]
    fn retention_reductions() {
        let config = MonitorConfig::new(1).with_history(200);
        let mut history = growable();
        assert!(history.max_value(&config, 0).is_err());

        feed(&mut history, &config, &[(3.0, 0), (9.0, 100), (-2.0, 200), (4.0, 300)]);
        assert_eq!(history.max_value(&config, 300), Ok(9.0));
        assert_eq!(history.min_value(&config, 300), Ok(-2.0));
        assert_eq!(history.last_sample(&config, 300), Ok(Sample::new(4.0, 300)));
        assert_eq!(history.value_count(&config, 300), 3);
        assert_eq!(history.value_count(&config, 450), 1);
    }

    #[test]
    fn anomaly_counts_and_erase() {
        let config = MonitorConfig::new(1)
            .with_threshold(ThresholdRule::above(0.0, 100))
            .with_slope(SlopeRule::absolute(0.5, 100));
        let mut history = growable();
        feed(&mut history, &config, &[(1.0, 0), (200.0, 50), (300.0, 100)]);

        assert_eq!(history.threshold_anomaly_count(&config, 100), 3);
        assert_eq!(history.threshold_anomaly_count(&config, 160), 1);
        assert_eq!(history.slope_anomaly_count(&config, 100), 2);
        assert_eq!(history.slope_log().last_anomaly(), Some(100));

        history.erase();
        assert!(history.samples().is_empty());
        assert_eq!(history.threshold_state(), StreakState::Clear);
        assert_eq!(history.slope_log().last_anomaly(), None);
    }

    #[test]
    fn labels_truncate() {
        let mut history = growable();
        history.set_label("winding-temperature-sensor");
        assert_eq!(history.label(), "winding-temperat");
        assert_eq!(make_label("pump").as_str(), "pump");
    }
}
