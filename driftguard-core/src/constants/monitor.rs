//! Monitor Query Defaults and Storage Sizing

// ===== QUERY DEFAULTS =====

/// Default minimum number of samples a windowed query needs.
///
/// Two points are the least that can describe a trend or a "consistent"
/// streak; one point only describes an instant.
pub const DEFAULT_MIN_DATA_POINTS: usize = 2;

/// Narrowest moving-average width that still smooths anything.
pub const MIN_SMOOTHING_WINDOW: usize = 2;

// ===== IDENTIFICATION =====

/// Capacity of the monitor label used in log lines (bytes).
///
/// Longer labels are truncated at a character boundary.
pub const LABEL_CAPACITY: usize = 16;
