//! Shared Monitor Example
//!
//! This example demonstrates one variable watched from several threads:
//! a sampling thread feeds a bus voltage while a supervisor thread polls
//! for anomalies and retunes the threshold at runtime.
//!
//! ## What You'll Learn
//!
//! - Sharing a monitor through `&SharedMonitor`
//! - Bounded lock waits and what a timeout looks like
//! - Changing configuration while samples keep arriving
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_shared_monitor
//! ```

use std::thread;
use std::time::Duration;

use driftguard_core::{
    store::GrowableStore,
    time::{MonotonicClock, Timestamp},
    MonitorConfig, MonitorError, Sample, SharedMonitor, SlopeRule, ThresholdRule,
    VariableTracker, Window,
};

type BusMonitor = SharedMonitor<f32, GrowableStore<Sample<f32>>, GrowableStore<Timestamp>, MonotonicClock>;

fn main() {
    println!("DriftGuard Shared Monitor Example");
    println!("=================================\n");

    // Brownout: below 11.0V for 40ms
    let config = MonitorConfig::new(2)
        .with_history(500)
        .with_threshold(ThresholdRule::below(11.0f32, 500).with_anomaly_duration(40))
        .with_slope(SlopeRule::absolute(0.2, 100).with_anomaly_duration(20));

    let monitor: BusMonitor = match SharedMonitor::new(config, MonotonicClock::new()) {
        Ok(monitor) => monitor.with_label("bus-12v").with_lock_timeout(5),
        Err(error) => {
            println!("Rejected configuration: {}", error);
            return;
        }
    };
    println!("Lock timeout: {}ms\n", monitor.lock_timeout_ms());

    thread::scope(|scope| {
        // Sampling context: 12V rail that sags between samples 80 and 140
        scope.spawn(|| {
            let mut dropped = 0;
            for step in 0..200u32 {
                let volts = if (80..140).contains(&step) { 10.4 } else { 12.1 };
                match monitor.update_value(volts) {
                    Ok(_) => {}
                    Err(MonitorError::RateLimited { .. }) => dropped += 1,
                    Err(error) => println!("  [sampler] {}", error),
                }
                thread::sleep(Duration::from_millis(2));
            }
            println!("  [sampler] done, {} samples throttled", dropped);
        });

        // Supervisor context: poll, report, retune
        scope.spawn(|| {
            for poll in 0..40 {
                if monitor.check_threshold() {
                    println!("  [supervisor] poll {:2}: BROWNOUT", poll);
                }
                if monitor.check_slope() {
                    println!("  [supervisor] poll {:2}: rail step", poll);
                }
                if poll == 30 {
                    // Tolerate a deeper sag from now on
                    match monitor.configure(|config| config.set_threshold(10.0)) {
                        Ok(()) => println!("  [supervisor] threshold lowered to 10.0V"),
                        Err(error) => println!("  [supervisor] retune failed: {}", error),
                    }
                }
                thread::sleep(Duration::from_millis(10));
            }
        });
    });

    println!("\nAfter the run:");
    match monitor.average_value(Window::last(100).from_latest_sample()) {
        Ok(mean) => println!("  Mean over last 100ms: {:.2}V", mean),
        Err(error) => println!("  Mean unavailable: {}", error),
    }
    match (monitor.len(), monitor.value_count()) {
        (Ok(stored), Ok(retained)) => println!("  Stored {} samples, {} retained", stored, retained),
        _ => println!("  Monitor busy"),
    }
    if let Ok(Some(at)) = monitor.last_threshold_anomaly() {
        println!("  Last brownout sample at {}ms", at);
    }
    if let Ok(config) = monitor.config() {
        println!("  Threshold now: {:?}", config.threshold.map(|rule| rule.limit));
    }
}
