//! Platform abstraction traits for runtime services.
//!
//! Hosts plug their frame scheduling and monotonic time source in through
//! these traits; the runtime itself never reads the system clock.

use web_time::Instant;

/// Schedules work for the runtime.
///
/// Implementations request that the host run a frame soon. They may be
/// invoked from wakers, so they must be safe to use from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Provides frame timestamps to the host loop.
pub trait Clock {
    /// Nanoseconds elapsed since an arbitrary, fixed origin.
    fn now_nanos(&self) -> u64;
}

/// Monotonic clock backed by `web_time::Instant`, usable on native and wasm targets.
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}
