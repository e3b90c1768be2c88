//! Basic Variable Monitoring Example
//!
//! This example demonstrates the simplest use case of DriftGuard:
//! watching a motor winding temperature for overheating and fast swings.
//!
//! ## What You'll Learn
//!
//! - Configuring threshold and slope rules
//! - Feeding samples through a throttled monitor
//! - Reacting to persistent anomalies (edge triggered)
//! - Asking windowed questions about the recent history
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_monitor
//! ```

use driftguard_core::{
    time::MockTimeSource, AnomalyDirection, BoundedMonitor, MonitorConfig, MonitorError,
    SlopeCalculation, SlopeRule, ThresholdRule, VariableTracker, Window, ring_capacity,
};

// 2 s of history at one sample per 100 ms
const SLOTS: usize = ring_capacity(2_000, 100);

fn main() {
    println!("DriftGuard Basic Monitor Example");
    println!("================================\n");

    // Over 120.0 for 300ms is an anomaly
    // Faster than 0.05 units/ms over 1s is an anomaly
    let config = MonitorConfig::new(100)
        .with_history(2_000)
        .with_threshold(ThresholdRule::above(120.0f32, 2_000).with_anomaly_duration(300))
        .with_slope(SlopeRule::absolute(0.05, 1_000).with_anomaly_duration(200));

    // Simulated tick counter
    let clock = MockTimeSource::new(0);
    let mut monitor: BoundedMonitor<f32, _, SLOTS> = match BoundedMonitor::new(config, &clock) {
        Ok(monitor) => monitor.with_label("winding"),
        Err(error) => {
            println!("Rejected configuration: {}", error);
            return;
        }
    };

    println!("Monitor '{}' ({} slots):", monitor.label(), SLOTS);
    println!("  Min spacing: {}ms", config.min_spacing_ms);
    println!("  Retention: {}ms", config.retention_ms());
    println!();

    // Warm-up, then a runaway, then recovery
    let readings: [f32; 24] = [
        95.0, 95.5, 96.0, 96.2, 96.5, 97.0, 97.1, 97.3,
        105.0, 115.0, 124.0, 131.0, 136.0, 139.0, 140.0, 140.5,
        138.0, 130.0, 121.0, 112.0, 104.0, 99.0, 97.0, 96.5,
    ];

    println!("Sampling every 100ms:\n");
    for (step, &reading) in readings.iter().enumerate() {
        clock.set(step as u32 * 100);

        match monitor.update_value(reading) {
            Ok(_) => {}
            Err(MonitorError::RateLimited { .. }) => continue,
            Err(error) => {
                println!("  t={:5}ms: sample rejected: {}", clock_ms(step), error);
                continue;
            }
        }

        let mut notes = Vec::new();
        if monitor.check_threshold() {
            notes.push("OVERHEAT");
        }
        if monitor.check_slope() {
            notes.push("FAST SWING");
        }
        println!("  t={:5}ms: {:6.1}  {}", clock_ms(step), reading, notes.join(", "));
    }

    // A burst inside the spacing is dropped
    println!("\nSample 30ms after the last one:");
    clock.advance(30);
    match monitor.update_value(96.0) {
        Err(MonitorError::RateLimited { elapsed_ms, min_spacing_ms }) => {
            println!("  Dropped ({}ms < {}ms)", elapsed_ms, min_spacing_ms);
        }
        other => println!("  Unexpected: {:?}", other),
    }

    println!("\nWindowed queries:");
    let last_second = Window::last(1_000).from_latest_sample();

    match monitor.average_value(last_second) {
        Ok(mean) => println!("  Mean over last 1s: {:.1}", mean),
        Err(error) => println!("  Mean unavailable: {}", error),
    }
    match monitor.simple_slope(last_second) {
        Ok(slope) => println!("  Slope over last 1s: {:+.4}/ms", slope),
        Err(error) => println!("  Slope unavailable: {}", error),
    }
    match monitor.advanced_slope(Window::last(2_000).from_latest_sample(), SlopeCalculation::Minimum, 3) {
        Ok(slope) => println!("  Steepest smoothed fall over 2s: {:+.4}/ms", slope),
        Err(error) => println!("  Smoothed slope unavailable: {}", error),
    }
    println!(
        "  Below 125.0 for the last 500ms: {}",
        monitor.check_if_value_consistently(
            AnomalyDirection::BelowLimit,
            125.0,
            Window::last(500).from_latest_sample()
        )
    );
    println!(
        "  Settled within ±2.0: {}",
        monitor.is_value_stabilized(4.0, Window::last(300).from_latest_sample())
    );

    if let (Ok(max), Ok(min)) = (monitor.max_value(), monitor.min_value()) {
        println!("  Retained range: {:.1} .. {:.1}", min, max);
    }
    println!("  Last threshold anomaly: {:?}", monitor.last_threshold_anomaly());
    println!("  Last slope anomaly: {:?}", monitor.last_slope_anomaly());
}

fn clock_ms(step: usize) -> usize {
    step * 100
}
