//! Type-erased single-assignment future.
//!
//! For callers that only know the payload size at runtime. The payload
//! lives in one zero-filled byte buffer allocated at construction and never
//! resized; `complete` and `read_into` copy whole payloads under the lock
//! and reject mismatched sizes before touching anything. Payload bytes are
//! whatever the caller makes them — this layer carries no type information
//! beyond the size.

use std::time::Duration;

use tracing::trace;

use crate::error::Error;
use crate::state::Lifecycle;
use crate::sync::{Condvar, Mutex, MutexGuard};
use crate::wait::{self, Gate};

/// A blocking one-shot future over an opaque fixed-size payload.
///
/// Same protocol as [`Future`](crate::Future), with the value expressed as
/// bytes. Sizes are checked eagerly: a mismatched source or destination
/// fails with [`Error::SizeMismatch`] before any copy and before any
/// blocking, so a partial copy is never observable.
pub struct RawFuture {
    value_size: usize,
    slot: Mutex<RawSlot>,
    completed: Condvar,
}

struct RawSlot {
    state: Lifecycle,
    buf: Box<[u8]>,
}

impl Gate for RawSlot {
    #[inline]
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

impl RawFuture {
    /// Creates a pending future whose payload is `value_size` bytes.
    ///
    /// The buffer is allocated fallibly; on failure the instance is never
    /// created and [`Error::AllocationFailed`] is returned.
    pub fn with_size(value_size: usize) -> Result<Self, Error> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(value_size)
            .map_err(|_| Error::AllocationFailed)?;
        buf.resize(value_size, 0);

        Ok(Self {
            value_size,
            slot: Mutex::new(RawSlot {
                state: Lifecycle::Pending,
                buf: buf.into_boxed_slice(),
            }),
            completed: Condvar::new(),
        })
    }

    /// The registered payload size in bytes. Immutable after construction.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    fn lock(&self) -> Result<MutexGuard<'_, RawSlot>, Error> {
        self.slot.lock().map_err(|_| Error::Unknown)
    }

    fn check_size(&self, actual: usize) -> Result<(), Error> {
        if actual != self.value_size {
            return Err(Error::SizeMismatch {
                expected: self.value_size,
                actual,
            });
        }
        Ok(())
    }

    /// Completes the future by copying `src` into the payload buffer.
    ///
    /// `src` must be exactly [`value_size`](Self::value_size) bytes. The
    /// copy happens under the lock, then every blocked waiter is woken.
    /// Succeeds at most once; see [`Future::complete`](crate::Future::complete)
    /// for the state rules.
    pub fn complete(&self, src: &[u8]) -> Result<(), Error> {
        self.check_size(src.len())?;
        let mut slot = self.lock()?;
        match slot.state {
            Lifecycle::Pending => {
                slot.buf.copy_from_slice(src);
                slot.state = Lifecycle::Completed;
                trace!(value_size = self.value_size, "raw future completed");
                self.completed.notify_all();
                Ok(())
            }
            _ => Err(Error::InvalidState),
        }
    }

    /// Blocks until completed or `timeout` elapses. Does not consume.
    ///
    /// `Duration::ZERO` is a non-blocking poll.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), Error> {
        let deadline = wait::deadline_after(timeout);
        wait::block_until(&self.slot, &self.completed, deadline).map(drop)
    }

    /// Blocks like [`wait_timeout`](Self::wait_timeout), then copies the
    /// payload into `dest` and invalidates the instance.
    ///
    /// `dest` must be exactly [`value_size`](Self::value_size) bytes; a
    /// mismatch fails before blocking and leaves `dest` untouched. On
    /// [`Error::TimedOut`] the instance stays pending and `dest` is
    /// untouched, so the caller may retry.
    pub fn read_into(&self, timeout: Duration, dest: &mut [u8]) -> Result<(), Error> {
        self.check_size(dest.len())?;
        let deadline = wait::deadline_after(timeout);
        let mut slot = wait::block_until(&self.slot, &self.completed, deadline)?;
        dest.copy_from_slice(&slot.buf);
        slot.state = Lifecycle::Consumed;
        trace!(value_size = self.value_size, "raw future consumed");
        Ok(())
    }

    /// Invalidates the future in place, zeroing the payload buffer.
    ///
    /// Blocked waiters are woken and observe [`Error::InvalidState`].
    pub fn destroy(&self) -> Result<(), Error> {
        let mut slot = self.lock()?;
        if slot.state.is_terminal() {
            return Err(Error::InvalidState);
        }
        slot.buf.fill(0);
        slot.state = Lifecycle::Destroyed;
        trace!("raw future destroyed");
        self.completed.notify_all();
        Ok(())
    }

    /// Snapshot of the current lifecycle state. A poisoned instance reads
    /// as [`Lifecycle::Destroyed`].
    pub fn state(&self) -> Lifecycle {
        self.slot
            .lock()
            .map(|slot| slot.state)
            .unwrap_or(Lifecycle::Destroyed)
    }

    /// Non-blocking check for a completed, not-yet-consumed payload.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state() == Lifecycle::Completed
    }
}

impl core::fmt::Debug for RawFuture {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawFuture")
            .field("value_size", &self.value_size)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bytes_round_trip() {
        let fut = RawFuture::with_size(4).unwrap();
        fut.complete(&[0xde, 0xad, 0xbe, 0xef]).unwrap();

        let mut out = [0u8; 4];
        fut.read_into(Duration::ZERO, &mut out).unwrap();
        assert_eq!(out, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(fut.state(), Lifecycle::Consumed);
    }

    #[test]
    fn size_mismatch_fails_before_blocking() {
        let fut = RawFuture::with_size(8).unwrap();

        // Never completed: a correct-sized read would block, but the size
        // check fires first and the destination stays untouched.
        let mut out = [0xaau8; 4];
        assert_eq!(
            fut.read_into(Duration::from_secs(10), &mut out),
            Err(Error::SizeMismatch {
                expected: 8,
                actual: 4,
            })
        );
        assert_eq!(out, [0xaa; 4]);
        assert_eq!(fut.state(), Lifecycle::Pending);
    }

    #[test]
    fn complete_checks_source_size() {
        let fut = RawFuture::with_size(2).unwrap();
        assert_eq!(
            fut.complete(&[1, 2, 3]),
            Err(Error::SizeMismatch {
                expected: 2,
                actual: 3,
            })
        );
        assert_eq!(fut.state(), Lifecycle::Pending);
    }

    #[test]
    fn timeout_leaves_destination_untouched() {
        let fut = RawFuture::with_size(2).unwrap();
        let mut out = [7u8; 2];
        assert_eq!(
            fut.read_into(Duration::ZERO, &mut out),
            Err(Error::TimedOut)
        );
        assert_eq!(out, [7; 2]);

        // Retry after completion succeeds.
        fut.complete(&[1, 2]).unwrap();
        fut.read_into(Duration::ZERO, &mut out).unwrap();
        assert_eq!(out, [1, 2]);
    }

    #[test]
    fn double_complete_keeps_first_payload() {
        let fut = RawFuture::with_size(1).unwrap();
        assert_eq!(fut.complete(&[1]), Ok(()));
        assert_eq!(fut.complete(&[2]), Err(Error::InvalidState));

        let mut out = [0u8];
        fut.read_into(Duration::ZERO, &mut out).unwrap();
        assert_eq!(out, [1]);
    }

    #[test]
    fn zero_sized_payload() {
        let fut = RawFuture::with_size(0).unwrap();
        fut.complete(&[]).unwrap();
        fut.read_into(Duration::ZERO, &mut []).unwrap();
        assert_eq!(fut.state(), Lifecycle::Consumed);
    }

    #[test]
    fn absurd_allocation_fails_cleanly() {
        assert_eq!(
            RawFuture::with_size(usize::MAX).err(),
            Some(Error::AllocationFailed)
        );
    }

    #[test]
    fn destroy_zeroes_and_invalidates() {
        let fut = RawFuture::with_size(3).unwrap();
        fut.complete(&[1, 2, 3]).unwrap();
        fut.destroy().unwrap();

        let mut out = [0u8; 3];
        assert_eq!(
            fut.read_into(Duration::ZERO, &mut out),
            Err(Error::InvalidState)
        );
    }

    proptest! {
        #[test]
        fn any_payload_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let fut = RawFuture::with_size(bytes.len()).unwrap();
            fut.complete(&bytes).unwrap();

            let mut out = vec![0u8; bytes.len()];
            fut.read_into(Duration::ZERO, &mut out).unwrap();
            prop_assert_eq!(out, bytes);
        }
    }
}
