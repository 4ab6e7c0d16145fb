#![doc = r"Cooperative runtime pieces for Tactile touch behaviors."]

pub mod collections;
pub mod event;
pub mod frame_clock;
pub mod platform;
pub mod runtime;
pub mod scope;
pub mod select;
pub mod signal;
pub mod time;

pub use event::{ExclusiveEvent, ExclusiveWait};
pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame, Ticker};
pub use platform::{Clock, InstantClock, RuntimeScheduler};
pub use runtime::{
    nanos_to_secs, secs_to_nanos, DefaultScheduler, Runtime, RuntimeHandle, TaskHandle,
};
pub use scope::{Supervisor, TaskGroup, Trigger};
pub use select::{move_on_when, race, race3, Either, Either3};
pub use signal::{LifoSignal, SignalWait};
pub use time::{sleep, yield_now, ResettableTimer, Sleep, TimerRegistration};

#[cfg(test)]
pub use runtime::{TestRuntime, TestScheduler};

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod runtime_tests;

#[cfg(test)]
#[path = "tests/signal_tests.rs"]
mod signal_tests;

#[cfg(test)]
#[path = "tests/time_tests.rs"]
mod time_tests;
