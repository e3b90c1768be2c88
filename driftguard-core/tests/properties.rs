//! Property tests for monitor invariants
//!
//! Random arrival patterns, starting anywhere on the wrapping clock, against:
//! - Store ordering, spacing and retention
//! - Window selection growing with its duration
//! - Streak bookkeeping
//! - Query consistency

#![cfg(test)]

mod common;

use driftguard_core::{
    sample::Timestamped,
    store::{GrowableStore, TimeSeries},
    time::{elapsed_ms, is_at_or_before, MockTimeSource, Timestamp},
    AnomalyDirection, BoundedMonitor, MonitorConfig, Sample, SlopeRule, StreakState, ThresholdRule,
    VariableTracker, Window,
};
use proptest::prelude::*;

use common::{feed, growable, strictly_increasing, timestamps};

const HISTORY_MS: u32 = 200;
const SLOTS: usize = 256;

/// `(value, gap since the previous sample)` steps
fn arb_steps() -> impl Strategy<Value = Vec<(f64, u32)>> {
    prop::collection::vec((-1_000.0f64..1_000.0, 0u32..50), 1..200)
}

/// Absolute series starting at `start`, wrapping like a tick counter
fn to_series(start: Timestamp, steps: &[(f64, u32)]) -> Vec<(f64, Timestamp)> {
    let mut at = start;
    steps
        .iter()
        .map(|&(value, gap)| {
            at = at.wrapping_add(gap);
            (value, at)
        })
        .collect()
}

// ── Storage ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn store_stays_ordered_and_spaced(
        start in any::<u32>(),
        spacing in 0u32..20,
        steps in arb_steps(),
    ) {
        let clock = MockTimeSource::new(start);
        let config = MonitorConfig::new(spacing).with_history(HISTORY_MS);
        let series = to_series(start, &steps);

        let mut grown = growable(config, &clock);
        feed(&mut grown, &clock, &series);
        let mut bounded: BoundedMonitor<f64, _, SLOTS> = BoundedMonitor::new(config, &clock).unwrap();
        feed(&mut bounded, &clock, &series);

        for stamps in [timestamps(grown.samples()), timestamps(bounded.samples())] {
            prop_assert!(strictly_increasing(&stamps));
            for pair in stamps.windows(2) {
                prop_assert!(elapsed_ms(pair[1], pair[0]) >= spacing);
            }
        }
    }

    #[test]
    fn growable_store_trims_to_retention(start in any::<u32>(), steps in arb_steps()) {
        let clock = MockTimeSource::new(start);
        let mut monitor = growable(MonitorConfig::new(1).with_history(HISTORY_MS), &clock);

        for (value, at) in to_series(start, &steps) {
            clock.set(at);
            let _ = monitor.update_value(value);
            if let Some(oldest) = monitor.samples().front() {
                prop_assert!(elapsed_ms(at, oldest.timestamp) <= HISTORY_MS);
            }
        }
    }

    #[test]
    fn window_indices_select_exactly_the_interval(
        start in any::<u32>(),
        steps in arb_steps(),
        offset in 0u32..2_000,
        length in 0u32..500,
    ) {
        let mut store = GrowableStore::new();
        for (value, at) in to_series(start, &steps) {
            store.append(Sample::new(value, at)).unwrap();
        }

        let from = start.wrapping_add(offset);
        let to = from.wrapping_add(length);
        let inside = |at: Timestamp| is_at_or_before(from, at) && is_at_or_before(at, to);

        match store.window_indices(from, to) {
            Some(range) => {
                for (index, sample) in store.iter().enumerate() {
                    prop_assert_eq!(range.contains(&index), inside(sample.timestamp()));
                }
            }
            None => prop_assert!(store.iter().all(|sample| !inside(sample.timestamp()))),
        }
    }

    #[test]
    fn wider_window_never_selects_fewer(
        start in any::<u32>(),
        steps in arb_steps(),
        end_offset in 0u32..2_000,
        narrow in 0u32..500,
        widen_by in 0u32..500,
    ) {
        let mut store = GrowableStore::new();
        for (value, at) in to_series(start, &steps) {
            store.append(Sample::new(value, at)).unwrap();
        }

        let end = start.wrapping_add(end_offset);
        let selected = |duration: u32| {
            store
                .window_indices(end.wrapping_sub(duration), end)
                .map_or(0, |range| range.count())
        };

        prop_assert!(selected(narrow + widen_by) >= selected(narrow));
    }
}

// ── Streaks ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn threshold_streak_follows_latest_sample(start in any::<u32>(), steps in arb_steps()) {
        let clock = MockTimeSource::new(start);
        let config = MonitorConfig::new(0)
            .with_history(HISTORY_MS)
            .with_threshold(ThresholdRule::above(500.0, HISTORY_MS));
        let mut monitor = growable(config, &clock);

        for (value, at) in to_series(start, &steps) {
            clock.set(at);
            monitor.update_value(value).unwrap();
            let violating = monitor.threshold_streak() != StreakState::Clear;
            prop_assert_eq!(violating, value > 500.0);
        }
    }

    #[test]
    fn slope_streak_clears_on_calm_sample(
        start in any::<u32>(),
        steps in arb_steps(),
        limit in 1.0f64..50.0,
    ) {
        let clock = MockTimeSource::new(start);
        let rule = SlopeRule::absolute(limit, HISTORY_MS);
        let config = MonitorConfig::new(0).with_history(HISTORY_MS).with_slope(rule);
        let mut monitor = growable(config, &clock);

        for (value, at) in to_series(start, &steps) {
            clock.set(at);
            monitor.update_value(value).unwrap();

            // Reference: oldest sample still inside the slope window
            let reference = monitor
                .samples()
                .iter()
                .find(|sample| elapsed_ms(at, sample.timestamp) <= HISTORY_MS)
                .copied();
            let steep = match reference {
                Some(reference) if reference.timestamp != at => {
                    rule.is_anomaly(value - reference.value, elapsed_ms(at, reference.timestamp))
                }
                _ => false,
            };

            if steep {
                prop_assert_ne!(monitor.slope_streak(), StreakState::Clear);
            } else {
                prop_assert_eq!(monitor.slope_streak(), StreakState::Clear);
            }
        }
    }
}

// ── Queries ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn queries_leave_state_untouched(
        start in any::<u32>(),
        steps in arb_steps(),
        duration in 0u32..=HISTORY_MS,
    ) {
        let clock = MockTimeSource::new(start);
        let mut monitor = growable(MonitorConfig::new(1).with_history(HISTORY_MS), &clock);
        feed(&mut monitor, &clock, &to_series(start, &steps));

        let window = Window::last(duration);
        let ask = |monitor: &common::TestMonitor<'_>| {
            (
                monitor.average_value(window),
                monitor.simple_slope(window),
                monitor.max_value(),
                monitor.check_if_value_consistently(AnomalyDirection::BelowLimit, 0.0, window),
            )
        };

        let stored = timestamps(monitor.samples());
        let first = ask(&monitor);
        prop_assert_eq!(first, ask(&monitor));
        prop_assert_eq!(stored, timestamps(monitor.samples()));
    }

    #[test]
    fn window_mean_within_extremes(
        start in any::<u32>(),
        steps in arb_steps(),
        duration in 0u32..=HISTORY_MS,
    ) {
        let clock = MockTimeSource::new(start);
        let mut monitor = growable(MonitorConfig::new(1).with_history(HISTORY_MS), &clock);
        feed(&mut monitor, &clock, &to_series(start, &steps));

        if let Ok(mean) = monitor.average_value(Window::last(duration).min_points(1)) {
            let min = monitor.min_value().unwrap();
            let max = monitor.max_value().unwrap();
            prop_assert!(min - 1e-9 <= mean && mean <= max + 1e-9, "{} not in [{}, {}]", mean, min, max);
        }
    }

    #[test]
    fn consistency_holds_in_narrower_windows(
        start in any::<u32>(),
        steps in arb_steps(),
        wide in 0u32..=HISTORY_MS,
        narrow_percent in 0u32..=100,
        limit in -1_000.0f64..1_000.0,
    ) {
        let clock = MockTimeSource::new(start);
        let mut monitor = growable(MonitorConfig::new(1).with_history(HISTORY_MS), &clock);
        feed(&mut monitor, &clock, &to_series(start, &steps));

        let narrow = wide * narrow_percent / 100;
        let wide_window = Window::last(wide).from_latest_sample().min_points(1);
        let narrow_window = Window::last(narrow).from_latest_sample().min_points(1);

        if monitor.check_if_value_consistently(AnomalyDirection::AboveLimit, limit, wide_window) {
            prop_assert!(monitor.check_if_value_consistently(
                AnomalyDirection::AboveLimit,
                limit,
                narrow_window
            ));
        }
    }
}
