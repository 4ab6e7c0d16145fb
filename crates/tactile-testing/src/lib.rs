//! Testing utilities for Tactile behaviors
//!
//! [`TouchHarness`] owns a runtime and a window and replays touches against
//! them on a virtual clock.

mod harness;

pub use harness::{TouchHarness, FRAME_SECS};

/// Installs `env_logger` once. Later calls are ignored.
#[cfg(feature = "logging")]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Logging is compiled out without the `logging` feature.
#[cfg(not(feature = "logging"))]
pub fn init_logging() {}

pub mod prelude {
    pub use crate::harness::{TouchHarness, FRAME_SECS};
    pub use crate::init_logging;
}
