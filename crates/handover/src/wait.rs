//! The timed-wait protocol shared by the typed and erased futures.
//!
//! Blocking is always a condition-variable wait against an absolute
//! deadline computed once at entry; the completion condition is re-checked
//! in a loop so spurious wakeups and notify/lock races are harmless. There
//! is no spin or yield loop anywhere.

use std::time::{Duration, Instant};

use crate::error::Error;
use crate::state::Lifecycle;
use crate::sync::{Condvar, Mutex, MutexGuard};

/// Slot types that expose their lifecycle to the wait loop.
pub(crate) trait Gate {
    fn lifecycle(&self) -> Lifecycle;
}

/// Absolute deadline for a relative timeout. `Duration::ZERO` makes the
/// deadline "now", turning the wait into a non-blocking poll.
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    // Absurd timeouts clamp to a year rather than overflowing the clock.
    now.checked_add(timeout)
        .unwrap_or(now + Duration::from_secs(60 * 60 * 24 * 365))
}

/// Block until the slot is `Completed` or the deadline passes.
///
/// Returns the guard still held so the caller can consume the value in the
/// same critical section. `Consumed` and `Destroyed` surface as
/// `InvalidState`, including when entered while we were blocked (destroy
/// notifies waiters).
pub(crate) fn block_until<'a, S: Gate>(
    slot: &'a Mutex<S>,
    completed: &Condvar,
    deadline: Instant,
) -> Result<MutexGuard<'a, S>, Error> {
    let mut guard = slot.lock().map_err(|_| Error::Unknown)?;
    loop {
        match guard.lifecycle() {
            Lifecycle::Completed => return Ok(guard),
            Lifecycle::Consumed | Lifecycle::Destroyed => return Err(Error::InvalidState),
            Lifecycle::Pending => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(Error::TimedOut);
        }

        guard = wait_on(completed, guard, deadline - now)?;
    }
}

#[cfg(not(feature = "loom"))]
fn wait_on<'a, S>(
    completed: &Condvar,
    guard: MutexGuard<'a, S>,
    remaining: Duration,
) -> Result<MutexGuard<'a, S>, Error> {
    // The WaitTimeoutResult is ignored on purpose: the loop re-reads the
    // clock and the state, which is the only check that matters.
    completed
        .wait_timeout(guard, remaining)
        .map(|(guard, _)| guard)
        .map_err(|_| Error::Unknown)
}

#[cfg(feature = "loom")]
fn wait_on<'a, S>(
    completed: &Condvar,
    guard: MutexGuard<'a, S>,
    _remaining: Duration,
) -> Result<MutexGuard<'a, S>, Error> {
    // loom's condvar has no deadline model; models must include an eventual
    // completer or destroyer. Timeout behavior is exercised outside loom.
    completed.wait(guard).map_err(|_| Error::Unknown)
}
