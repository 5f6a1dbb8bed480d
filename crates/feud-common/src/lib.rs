pub mod error;
pub mod pacing;
pub mod suggest;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
