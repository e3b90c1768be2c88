//! Deterministic signal generators
//!
//! Produce `(value, timestamp)` series shaped like real firmware variables:
//! a noisy plateau, a linear ramp, a plateau interrupted by a spike.

use driftguard_core::time::Timestamp;

/// Xorshift generator, reproducible across platforms
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / 16_777_216.0
    }

    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// `count` samples around `level` with uniform noise of `±noise`
pub fn plateau(
    rng: &mut TestRng,
    level: f64,
    noise: f64,
    start: Timestamp,
    period_ms: u32,
    count: usize,
) -> Vec<(f64, Timestamp)> {
    (0..count)
        .map(|step| {
            let at = start.wrapping_add(period_ms * step as u32);
            (level + rng.gen_range(-noise, noise), at)
        })
        .collect()
}

/// `count` samples rising by `slope_per_ms` from `from`
pub fn ramp(
    from: f64,
    slope_per_ms: f64,
    start: Timestamp,
    period_ms: u32,
    count: usize,
) -> Vec<(f64, Timestamp)> {
    (0..count)
        .map(|step| {
            let elapsed = period_ms * step as u32;
            (from + slope_per_ms * f64::from(elapsed), start.wrapping_add(elapsed))
        })
        .collect()
}

/// Plateau with samples `spike_from..spike_to` lifted by `height`
pub fn spike(
    rng: &mut TestRng,
    level: f64,
    height: f64,
    period_ms: u32,
    count: usize,
    spike_from: usize,
    spike_to: usize,
) -> Vec<(f64, Timestamp)> {
    let mut series = plateau(rng, level, 0.1, 0, period_ms, count);
    for sample in &mut series[spike_from..spike_to] {
        sample.0 += height;
    }
    series
}
