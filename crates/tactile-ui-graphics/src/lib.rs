//! Pure math/data for Tactile
//!
//! Geometry primitives, color definitions and density-independent units
//! shared by the runtime and the behaviors.

mod color;
mod geometry;
mod unit;

pub use color::*;
pub use geometry::*;
pub use unit::*;

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::unit::{Density, Dp, Sp};
}
