//! Monitor Shared Between Execution Contexts
//!
//! ## Locking Discipline
//!
//! Configuration and data sit behind two separate locks:
//!
//! ```text
//!           ┌───────────────┐        ┌──────────────────────────────┐
//!  setters ─▶  config lock  │        │  state lock                  │
//!           │ MonitorConfig │──copy─▶│ samples + anomaly streaks     │◀─ update_value
//!           └───────────────┘        └──────────────────────────────┘◀─ queries
//! ```
//!
//! Every operation, queries included, first copies the configuration under
//! the config lock, releases it, then works under the state lock. Locks are
//! always taken in that order and never held together, so contexts cannot
//! deadlock, and a setter never waits behind a long query.
//!
//! Each acquisition is a bounded wait (`lock_timeout_ms`, measured on the
//! monitor's clock). On timeout the operation fails without touching any
//! state: writes return `Err(LockTimeout)`, predicates return `false`.
//!
//! ## Example
//!
//! ```rust
//! use driftguard_core::{MonitorConfig, Sample, SharedMonitor, ThresholdRule};
//! use driftguard_core::store::GrowableStore;
//! use driftguard_core::time::{MockTimeSource, Timestamp};
//!
//! static CLOCK: MockTimeSource = MockTimeSource::new(0);
//!
//! type Samples = GrowableStore<Sample<f32>>;
//! type Records = GrowableStore<Timestamp>;
//!
//! let monitor: SharedMonitor<f32, Samples, Records, _> = SharedMonitor::new(
//!     MonitorConfig::new(10).with_threshold(ThresholdRule::above(3.3, 500)),
//!     &CLOCK,
//! )
//! .unwrap();
//!
//! std::thread::scope(|scope| {
//!     scope.spawn(|| monitor.update_value(3.4));
//! });
//! assert_eq!(monitor.threshold_anomaly_count(), Ok(1));
//! ```

use crate::anomaly::StreakState;
use crate::config::MonitorConfig;
use crate::constants::DEFAULT_LOCK_TIMEOUT_MS;
use crate::errors::MonitorResult;
use crate::history::{check_capacity, History};
use crate::monitor::UpdateOutcome;
use crate::query::{AveragingScheme, SlopeCalculation, Window};
use crate::rules::{AnomalyDirection, SlopeMode};
use crate::sample::Sample;
use crate::store::TimeSeries;
use crate::sync::{lock_within, LockKind, MonitorLock, SpinLock};
use crate::time::{TimeSource, Timestamp};
use crate::tracker::VariableTracker;
use crate::value::MonitorValue;

/// Monitor usable through `&self` from several threads or interrupt contexts
pub struct SharedMonitor<T, S, A, C, L: LockKind = SpinLock> {
    config: L::Mutex<MonitorConfig<T>>,
    state: L::Mutex<History<T, S, A>>,
    clock: C,
    capacity: Option<usize>,
    lock_timeout_ms: u32,
}

impl<T, S, A, C, L> SharedMonitor<T, S, A, C, L>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>> + Default,
    A: TimeSeries<Entry = Timestamp> + Default,
    C: TimeSource,
    L: LockKind,
{
    /// Create a shared monitor with empty default stores
    pub fn new(config: MonitorConfig<T>, clock: C) -> MonitorResult<Self> {
        Self::with_stores(config, clock, S::default(), A::default(), A::default())
    }
}

impl<T, S, A, C, L> SharedMonitor<T, S, A, C, L>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
    C: TimeSource,
    L: LockKind,
{
    /// Create a shared monitor over caller-supplied stores
    pub fn with_stores(
        config: MonitorConfig<T>,
        clock: C,
        samples: S,
        threshold_records: A,
        slope_records: A,
    ) -> MonitorResult<Self> {
        config.validate()?;
        let capacity = samples.capacity();
        check_capacity(capacity, &config)?;
        Ok(Self {
            config: MonitorLock::new(config),
            state: MonitorLock::new(History::new(samples, threshold_records, slope_records)),
            clock,
            capacity,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        })
    }

    /// Name the monitor in log lines (truncated to 16 bytes)
    pub fn with_label(mut self, label: &str) -> Self {
        self.state.get_mut().set_label(label);
        self
    }

    /// Bound every lock acquisition to `timeout_ms`
    pub fn with_lock_timeout(mut self, timeout_ms: u32) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Bounded wait applied to each lock
    pub fn lock_timeout_ms(&self) -> u32 {
        self.lock_timeout_ms
    }

    /// Copy of the current configuration
    pub fn config(&self) -> MonitorResult<MonitorConfig<T>> {
        let guard = lock_within::<MonitorConfig<T>, _, _>(&self.config, &self.clock, self.lock_timeout_ms)
            .map_err(|error| {
                log_warn!("config lock: {}", error);
                error
            })?;
        Ok(*guard)
    }

    /// Change the configuration under the config lock
    ///
    /// An invalid result, or a lock timeout, leaves the previous
    /// configuration in effect.
    pub fn configure(&self, change: impl FnOnce(&mut MonitorConfig<T>)) -> MonitorResult<()> {
        let mut guard = lock_within::<MonitorConfig<T>, _, _>(&self.config, &self.clock, self.lock_timeout_ms)
            .map_err(|error| {
                log_warn!("config lock: {}", error);
                error
            })?;
        let mut candidate = *guard;
        change(&mut candidate);
        candidate.validate()?;
        check_capacity(self.capacity, &candidate)?;
        *guard = candidate;
        Ok(())
    }

    /// Run `operation` on the history with a configuration snapshot
    fn with_history<R>(
        &self,
        operation: impl FnOnce(&MonitorConfig<T>, &mut History<T, S, A>, Timestamp) -> R,
    ) -> MonitorResult<R> {
        let config = self.config()?;
        let mut history = lock_within::<History<T, S, A>, _, _>(&self.state, &self.clock, self.lock_timeout_ms)
            .map_err(|error| {
                log_warn!("state lock: {}", error);
                error
            })?;
        let now = self.clock.now();
        Ok(operation(&config, &mut *history, now))
    }

    /// Store a new sample stamped with the current time
    pub fn update_value(&self, value: T) -> MonitorResult<UpdateOutcome> {
        self.with_history(|config, history, now| history.ingest(config, value, now))?
    }

    /// Threshold streak has lasted the anomaly duration (fires once)
    pub fn check_threshold(&self) -> bool {
        self.with_history(|config, history, now| history.check_threshold(config, now))
            .unwrap_or(false)
    }

    /// Slope streak has lasted the anomaly duration (fires once)
    pub fn check_slope(&self) -> bool {
        self.with_history(|config, history, now| history.check_slope(config, now))
            .unwrap_or(false)
    }

    /// Evict samples and anomaly records older than their windows now
    pub fn cleanup(&self) -> MonitorResult<usize> {
        self.with_history(|config, history, now| history.cleanup(config, now))
    }

    /// Discard every sample and anomaly record
    pub fn erase(&self) -> MonitorResult<()> {
        self.with_history(|_, history, _| history.erase())
    }

    /// Read the stored samples under the state lock
    pub fn inspect<R>(&self, read: impl FnOnce(&S) -> R) -> MonitorResult<R> {
        self.with_history(|_, history, _| read(history.samples()))
    }

    /// Number of stored samples
    pub fn len(&self) -> MonitorResult<usize> {
        self.with_history(|_, history, _| history.samples().len())
    }

    /// Check whether no samples are stored
    pub fn is_empty(&self) -> MonitorResult<bool> {
        self.with_history(|_, history, _| history.samples().is_empty())
    }

    /// Current threshold streak
    pub fn threshold_streak(&self) -> MonitorResult<StreakState> {
        self.with_history(|_, history, _| history.threshold_state())
    }

    /// Current slope streak
    pub fn slope_streak(&self) -> MonitorResult<StreakState> {
        self.with_history(|_, history, _| history.slope_state())
    }

    /// Samples within the retention window
    pub fn value_count(&self) -> MonitorResult<usize> {
        self.with_history(|config, history, now| history.value_count(config, now))
    }

    /// Threshold violations within the threshold window
    pub fn threshold_anomaly_count(&self) -> MonitorResult<usize> {
        self.with_history(|config, history, now| history.threshold_anomaly_count(config, now))
    }

    /// Slope violations within the slope window
    pub fn slope_anomaly_count(&self) -> MonitorResult<usize> {
        self.with_history(|config, history, now| history.slope_anomaly_count(config, now))
    }

    /// Most recent threshold violation, kept across streak clears
    pub fn last_threshold_anomaly(&self) -> MonitorResult<Option<Timestamp>> {
        self.with_history(|_, history, _| history.threshold_log().last_anomaly())
    }

    /// Most recent slope violation, kept across streak clears
    pub fn last_slope_anomaly(&self) -> MonitorResult<Option<Timestamp>> {
        self.with_history(|_, history, _| history.slope_log().last_anomaly())
    }
}

impl<T, S, A, C, L> VariableTracker<T> for SharedMonitor<T, S, A, C, L>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
    C: TimeSource,
    L: LockKind,
{
    fn check_if_value_consistently(&self, side: AnomalyDirection, threshold: T, window: Window) -> bool {
        self.with_history(|_, history, now| {
            history.check_if_value_consistently(side, threshold, &window, now)
        })
        .unwrap_or(false)
    }

    fn check_if_value_between_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool {
        self.with_history(|_, history, now| {
            history.check_if_value_between_bound_consistently(lower, upper, &window, now)
        })
        .unwrap_or(false)
    }

    fn check_if_value_out_of_bound_consistently(&self, lower: T, upper: T, window: Window) -> bool {
        self.with_history(|_, history, now| {
            history.check_if_value_out_of_bound_consistently(lower, upper, &window, now)
        })
        .unwrap_or(false)
    }

    fn average_scheme_value(&self, window: Window, scheme: AveragingScheme) -> MonitorResult<T> {
        self.with_history(|_, history, now| history.average(&window, scheme, now))?
    }

    fn simple_slope(&self, window: Window) -> MonitorResult<f64> {
        self.with_history(|_, history, now| history.simple_slope(&window, now))?
    }

    fn advanced_slope(
        &self,
        window: Window,
        calculation: SlopeCalculation,
        smoothing: usize,
    ) -> MonitorResult<f64> {
        self.with_history(|_, history, now| {
            history.advanced_slope(&window, calculation, smoothing, now)
        })?
    }

    fn check_if_slope(
        &self,
        direction: AnomalyDirection,
        limit: f64,
        mode: SlopeMode,
        window: Window,
    ) -> bool {
        self.with_history(|_, history, now| {
            history.check_if_slope(direction, limit, mode, &window, now)
        })
        .unwrap_or(false)
    }

    fn max_value(&self) -> MonitorResult<T> {
        self.with_history(|config, history, now| history.max_value(config, now))?
    }

    fn min_value(&self) -> MonitorResult<T> {
        self.with_history(|config, history, now| history.min_value(config, now))?
    }

    fn last_value(&self) -> MonitorResult<Sample<T>> {
        self.with_history(|config, history, now| history.last_sample(config, now))?
    }
}
