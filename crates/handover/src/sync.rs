#[cfg(not(feature = "loom"))]
pub use std::sync::{Condvar, Mutex, MutexGuard};

#[cfg(feature = "loom")]
pub use loom::sync::{Condvar, Mutex, MutexGuard};
