use core::fmt;

/// Errors returned by future operations.
///
/// Every operation reports its outcome explicitly; a failure never mutates
/// the instance. `Ok(..)` is the taxonomy's "success" arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The deadline elapsed before completion. Recoverable: the instance is
    /// untouched and a later retry may succeed.
    TimedOut,
    /// The instance was already completed, already consumed, or destroyed.
    InvalidState,
    /// A source or destination buffer differs from the registered value
    /// size. Always a caller bug; detected before any copy or blocking.
    SizeMismatch { expected: usize, actual: usize },
    /// The payload buffer could not be allocated at construction. The
    /// instance was never created.
    AllocationFailed,
    /// The underlying synchronization primitive failed (a lock was
    /// poisoned by a panicking holder). Treat the instance as unusable.
    Unknown,
}

impl Error {
    /// Stable human-readable name for the error. Pure; no side effects.
    pub const fn as_str(self) -> &'static str {
        match self {
            Error::TimedOut => "timed out",
            Error::InvalidState => "invalid state",
            Error::SizeMismatch { .. } => "size mismatch",
            Error::AllocationFailed => "allocation failed",
            Error::Unknown => "synchronization primitive failure",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} bytes, got {actual}")
            }
            other => f.write_str(other.as_str()),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_covers_every_variant() {
        let variants = [
            Error::TimedOut,
            Error::InvalidState,
            Error::SizeMismatch {
                expected: 8,
                actual: 4,
            },
            Error::AllocationFailed,
            Error::Unknown,
        ];
        for err in variants {
            assert!(!err.as_str().is_empty());
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn size_mismatch_display_carries_sizes() {
        let err = Error::SizeMismatch {
            expected: 8,
            actual: 4,
        };
        let rendered = err.to_string();
        assert!(rendered.contains('8'));
        assert!(rendered.contains('4'));
    }
}
