#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

mod error;
mod future;
mod raw;
mod state;
mod sync;
mod wait;

pub use error::Error;
pub use future::Future;
pub use raw::RawFuture;
pub use state::Lifecycle;
