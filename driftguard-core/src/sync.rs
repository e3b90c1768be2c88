//! Injected Mutual Exclusion
//!
//! ## Overview
//!
//! A shared monitor never names a concrete mutex. It asks a [`LockKind`]
//! for a mutex type and acquires it through [`MonitorLock::try_lock`], a
//! non-blocking attempt in the `nb` style:
//!
//! ```text
//! Ok(guard)                 lock taken, released when the guard drops
//! Err(nb::Error::WouldBlock) held elsewhere, try again
//! ```
//!
//! [`lock_within`] turns that into a bounded wait measured on the
//! monitor's own clock, so no RTOS API is needed to time out.
//!
//! ## Provided Lock Families
//!
//! | Kind       | Mutex                | Target                      |
//! |------------|----------------------|-----------------------------|
//! | `SpinLock` | `spin::Mutex`        | bare metal, ISR-adjacent    |
//! | `StdLock`  | `std::sync::Mutex`   | hosts (requires `std`)      |
//!
//! A poisoned `std` mutex is recovered: monitor state stays consistent
//! between statements, so the data behind a panicked holder is still valid.

use core::convert::Infallible;
use core::ops::DerefMut;

use crate::constants::MAX_STALLED_LOCK_SPINS;
use crate::errors::{MonitorError, MonitorResult};
use crate::time::{elapsed_ms, TimeSource};

/// Mutex holding `D`, acquired without blocking
pub trait MonitorLock<D> {
    /// Scoped access; dropping it releases the lock
    type Guard<'a>: DerefMut<Target = D>
    where
        Self: 'a;

    /// Wrap `data` in a new unlocked mutex
    fn new(data: D) -> Self;

    /// Try to take the lock once
    fn try_lock(&self) -> nb::Result<Self::Guard<'_>, Infallible>;

    /// Exclusive access through `&mut self`, no locking needed
    fn get_mut(&mut self) -> &mut D;
}

/// Family of mutexes a shared monitor is built from
pub trait LockKind {
    /// Mutex type for data `D`
    type Mutex<D>: MonitorLock<D>;
}

/// Spinning mutex from the `spin` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinLock;

impl LockKind for SpinLock {
    type Mutex<D> = spin::Mutex<D>;
}

impl<D> MonitorLock<D> for spin::Mutex<D> {
    type Guard<'a> = spin::MutexGuard<'a, D>
    where
        Self: 'a;

    fn new(data: D) -> Self {
        spin::Mutex::new(data)
    }

    fn try_lock(&self) -> nb::Result<Self::Guard<'_>, Infallible> {
        spin::Mutex::try_lock(self).ok_or(nb::Error::WouldBlock)
    }

    fn get_mut(&mut self) -> &mut D {
        spin::Mutex::get_mut(self)
    }
}

/// Operating system mutex from `std::sync` (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdLock;

#[cfg(feature = "std")]
impl LockKind for StdLock {
    type Mutex<D> = std::sync::Mutex<D>;
}

#[cfg(feature = "std")]
impl<D> MonitorLock<D> for std::sync::Mutex<D> {
    type Guard<'a> = std::sync::MutexGuard<'a, D>
    where
        Self: 'a;

    fn new(data: D) -> Self {
        std::sync::Mutex::new(data)
    }

    fn try_lock(&self) -> nb::Result<Self::Guard<'_>, Infallible> {
        match std::sync::Mutex::try_lock(self) {
            Ok(guard) => Ok(guard),
            Err(std::sync::TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(std::sync::TryLockError::WouldBlock) => Err(nb::Error::WouldBlock),
        }
    }

    fn get_mut(&mut self) -> &mut D {
        match std::sync::Mutex::get_mut(self) {
            Ok(data) => data,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Take `lock`, spinning for at most `timeout_ms` on `clock`
///
/// A zero timeout makes exactly one attempt. A clock that stops moving
/// ends the wait after [`MAX_STALLED_LOCK_SPINS`] attempts at one instant.
pub fn lock_within<'a, D, L, C>(
    lock: &'a L,
    clock: &C,
    timeout_ms: u32,
) -> MonitorResult<L::Guard<'a>>
where
    L: MonitorLock<D>,
    C: TimeSource,
{
    let start = clock.now();
    let mut last_seen = start;
    let mut stalled: u32 = 0;
    loop {
        match lock.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(never)) => match never {},
        }

        let now = clock.now();
        if now == last_seen {
            stalled += 1;
        } else {
            last_seen = now;
            stalled = 0;
        }

        if elapsed_ms(now, start) >= timeout_ms || stalled >= MAX_STALLED_LOCK_SPINS {
            return Err(MonitorError::LockTimeout { timeout_ms });
        }
        core::hint::spin_loop();
    }
}
