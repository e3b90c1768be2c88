//! Time-windowed variable monitor for DriftGuard
//!
//! Tracks one streamed scalar (a temperature, a bus voltage, a motor
//! current) over a bounded, time-ordered sample history. Every new sample
//! is classified against a threshold rule and a slope rule; sustained
//! violations surface as edge-triggered anomalies, and the history answers
//! windowed questions such as "has this stayed below 5.0 for the last
//! 300 ms?".
//!
//! Key constraints:
//! - `no_std`, heap optional (`BoundedMonitor` sizes its ring at compile time)
//! - Wrapping 32-bit millisecond clock, never compared across the wrap
//! - No panics on data conditions; "not enough history" is an ordinary result
//!
//! ```rust
//! use driftguard_core::{
//!     GrowableMonitor, MonitorConfig, SlopeRule, ThresholdRule, VariableTracker, Window,
//! };
//! use driftguard_core::time::MockTimeSource;
//!
//! let clock = MockTimeSource::new(0);
//! let config = MonitorConfig::new(10)
//!     .with_threshold(ThresholdRule::above(90.0f32, 1_000).with_anomaly_duration(100))
//!     .with_slope(SlopeRule::absolute(0.5, 1_000));
//! let mut monitor: GrowableMonitor<f32, _> = GrowableMonitor::new(config, &clock).unwrap();
//!
//! // Sample loop
//! for reading in [70.0, 72.0, 75.0, 79.0] {
//!     let _ = monitor.update_value(reading); // RateLimited is routine
//!     clock.advance(50);
//! }
//!
//! let slope = monitor.simple_slope(Window::last(150).from_latest_sample()).unwrap();
//! assert!((slope - 0.06).abs() < 1e-6);
//! assert!(!monitor.check_threshold());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod anomaly;
pub mod config;
pub mod constants;
pub mod errors;
pub mod history;
pub mod monitor;
pub mod query;
pub mod rules;
pub mod sample;
pub mod shared;
pub mod store;
pub mod sync;
pub mod time;
pub mod tracker;
pub mod value;

// Public API
pub use anomaly::StreakState;
pub use config::MonitorConfig;
pub use errors::{MonitorError, MonitorResult};
pub use monitor::{BoundedMonitor, GrowableMonitor, Monitor, UpdateOutcome};
pub use query::{AveragingScheme, SlopeCalculation, Window, WindowEnd};
pub use rules::{AnomalyDirection, SlopeMode, SlopeReference, SlopeRule, ThresholdRule};
pub use sample::Sample;
pub use shared::SharedMonitor;
pub use store::ring_capacity;
pub use tracker::VariableTracker;
pub use value::MonitorValue;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
