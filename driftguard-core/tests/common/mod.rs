//! Common test utilities for integration tests
//!
//! This module provides:
//! - Monitor fixtures driven by a shared mock clock
//! - `feed`, which replays `(value, timestamp)` pairs through a monitor
//! - Signal generators (see [`generators`])

#![allow(dead_code)]

use driftguard_core::{
    sample::Timestamped,
    store::TimeSeries,
    time::{is_at_or_before, MockTimeSource, Timestamp},
    GrowableMonitor, Monitor, MonitorConfig, MonitorResult, MonitorValue, Sample, UpdateOutcome,
};

pub mod generators;

/// Heap-backed monitor reading `clock`
pub type TestMonitor<'c, T = f64> = GrowableMonitor<T, &'c MockTimeSource>;

/// Build a growable monitor, panicking on an invalid configuration
pub fn growable<T: MonitorValue>(config: MonitorConfig<T>, clock: &MockTimeSource) -> TestMonitor<'_, T> {
    GrowableMonitor::new(config, clock).expect("valid test configuration")
}

/// Replay samples, moving the clock to each timestamp before updating
pub fn feed<'c, T, S, A>(
    monitor: &mut Monitor<T, S, A, &'c MockTimeSource>,
    clock: &MockTimeSource,
    samples: &[(T, Timestamp)],
) -> Vec<MonitorResult<UpdateOutcome>>
where
    T: MonitorValue,
    S: TimeSeries<Entry = Sample<T>>,
    A: TimeSeries<Entry = Timestamp>,
{
    samples
        .iter()
        .map(|&(value, at)| {
            clock.set(at);
            monitor.update_value(value)
        })
        .collect()
}

/// Timestamps of a store, oldest first
pub fn timestamps<S: TimeSeries>(store: &S) -> Vec<Timestamp> {
    store.iter().map(|entry| entry.timestamp()).collect()
}

/// Check the store ordering invariant: strictly increasing timestamps
pub fn strictly_increasing(timestamps: &[Timestamp]) -> bool {
    timestamps
        .windows(2)
        .all(|pair| pair[0] != pair[1] && is_at_or_before(pair[0], pair[1]))
}
