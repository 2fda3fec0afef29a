//! Typed single-assignment future.
//!
//! One lock-guarded `Option<T>` slot plus a condition variable. `complete`
//! takes ownership of the value; the first successful `take_timeout` moves
//! it back out and invalidates the instance. The instance itself is the
//! shared handle: producer and consumers hold `&Future<T>` (via scoped
//! threads or an `Arc` the caller brings).

use std::time::Duration;

use tracing::trace;

use crate::error::Error;
use crate::state::Lifecycle;
use crate::sync::{Condvar, Mutex, MutexGuard};
use crate::wait::{self, Gate};

/// A blocking one-shot future.
///
/// Completable at most once, consumable at most once; see [`Lifecycle`] for
/// the transition table. All methods take `&self` and are safe to call from
/// any number of threads, though the single-completer discipline is a
/// caller contract: two racing `complete` calls are memory-safe, but only
/// one of them wins.
pub struct Future<T> {
    slot: Mutex<Slot<T>>,
    completed: Condvar,
}

struct Slot<T> {
    state: Lifecycle,
    value: Option<T>,
}

impl<T> Gate for Slot<T> {
    #[inline]
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

impl<T> Future<T> {
    /// Creates an empty, pending future.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: Lifecycle::Pending,
                value: None,
            }),
            completed: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slot<T>>, Error> {
        self.slot.lock().map_err(|_| Error::Unknown)
    }

    /// Completes the future with `value`, waking every blocked waiter.
    ///
    /// Succeeds at most once. A second completion, or a completion after
    /// the value was consumed or the instance destroyed, fails with
    /// [`Error::InvalidState`] and leaves the stored value untouched.
    pub fn complete(&self, value: T) -> Result<(), Error> {
        let mut slot = self.lock()?;
        match slot.state {
            Lifecycle::Pending => {
                slot.value = Some(value);
                slot.state = Lifecycle::Completed;
                trace!("future completed");
                self.completed.notify_all();
                Ok(())
            }
            _ => Err(Error::InvalidState),
        }
    }

    /// Blocks until the future is completed or `timeout` elapses.
    ///
    /// Does not consume the value: any number of threads may wait, before
    /// or after completion, and a completed future reports `Ok` forever
    /// until it is consumed or destroyed. `Duration::ZERO` is a
    /// non-blocking poll.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), Error> {
        let deadline = wait::deadline_after(timeout);
        wait::block_until(&self.slot, &self.completed, deadline).map(drop)
    }

    /// Blocks like [`wait_timeout`](Self::wait_timeout), then moves the
    /// value out.
    ///
    /// On success the instance becomes [`Lifecycle::Consumed`]; every later
    /// `take_timeout` or `complete` fails with [`Error::InvalidState`]. On
    /// [`Error::TimedOut`] the instance is untouched and a retry may
    /// succeed once the producer gets around to completing it. If already
    /// completed, returns immediately without blocking.
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, Error> {
        let deadline = wait::deadline_after(timeout);
        let mut slot = wait::block_until(&self.slot, &self.completed, deadline)?;
        let value = slot.value.take().ok_or(Error::Unknown)?;
        slot.state = Lifecycle::Consumed;
        trace!("future consumed");
        Ok(value)
    }

    /// Invalidates the future in place, dropping any stored value.
    ///
    /// Blocked waiters are woken and observe [`Error::InvalidState`]. Fails
    /// with [`Error::InvalidState`] if the instance is already terminal.
    /// Deallocation is separate: that happens when the owner drops the
    /// instance.
    pub fn destroy(&self) -> Result<(), Error> {
        let mut slot = self.lock()?;
        if slot.state.is_terminal() {
            return Err(Error::InvalidState);
        }
        slot.value = None;
        slot.state = Lifecycle::Destroyed;
        trace!("future destroyed");
        self.completed.notify_all();
        Ok(())
    }

    /// Snapshot of the current lifecycle state.
    ///
    /// A poisoned instance reads as [`Lifecycle::Destroyed`]: it is
    /// unusable either way.
    pub fn state(&self) -> Lifecycle {
        self.slot
            .lock()
            .map(|slot| slot.state)
            .unwrap_or(Lifecycle::Destroyed)
    }

    /// Non-blocking check for a completed, not-yet-consumed value.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state() == Lifecycle::Completed
    }
}

impl<T> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Future").field("state", &self.state()).finish()
    }
}
