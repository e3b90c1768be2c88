//! Time-Related Constants
//!
//! Limits of the wrapping 32-bit millisecond clock and default waits.

// ===== CLOCK ARITHMETIC =====

/// Half the range of the 32-bit millisecond counter.
///
/// Two instants closer than this are ordered by the sign of their wrapping
/// difference. Windows and retention periods must stay below it
/// (~24.8 days).
pub const CLOCK_HALF_RANGE_MS: u32 = 1 << 31;

// ===== SAMPLING =====

/// Smallest distance between two stored samples (milliseconds).
///
/// Holds even with throttling disabled: a sample landing in the same tick
/// as the newest one replaces it, so slope division never sees zero.
/// Storage sizing uses it in place of a zero spacing.
pub const MIN_SAMPLE_SPACING_MS: u32 = 1;

// ===== LOCKING =====

/// Default bounded wait for a shared monitor lock (milliseconds).
///
/// Long enough to ride out a preempted writer on a 1 kHz tick, short
/// enough that a sampling loop never stalls for a full period.
pub const DEFAULT_LOCK_TIMEOUT_MS: u32 = 10;

/// Failed lock attempts tolerated while the clock reads the same instant.
///
/// Ends a bounded wait on a frozen or coarse clock. Any clock movement
/// restarts the count, so a live 1 ms tick never reaches it.
pub const MAX_STALLED_LOCK_SPINS: u32 = 1_000_000;
