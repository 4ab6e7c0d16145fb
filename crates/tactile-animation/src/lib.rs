//! Easing curves and frame-driven tweens for Tactile.
//!
//! Curves use the same names the markup layer uses (`"out_quad"`, `"in_out_back"`, ...)
//! so behavior configs can be written as strings and parsed with [`Transition::from_str`].
//!
//! [`Transition::from_str`]: std::str::FromStr::from_str

mod transition;
mod tween;

pub use transition::{ParseTransitionError, Transition};
pub use tween::{tween, Lerp};

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
