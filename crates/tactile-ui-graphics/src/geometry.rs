//! Geometric primitives: Point, Size, Rect
//!
//! The y axis points up and a rectangle's origin is its bottom-left corner,
//! matching the host toolkit the behaviors are attached to.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Closed-interval containment, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x <= self.right() && y <= self.top()
    }

    /// Half-open containment: the left/bottom edges are inside, the right/top edges are not.
    pub fn contains_half_open(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.top()
    }

    /// Radius of the smallest circle centered at `center` that covers this rectangle.
    ///
    /// `center` must lie inside the rectangle for the result to be meaningful.
    pub fn enclosing_radius_from(&self, center: Point) -> f32 {
        let dx = (center.x - self.x).max(self.right() - center.x);
        let dy = (center.y - self.y).max(self.top() - center.y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_includes_edges() {
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(50.0, 50.0));
        assert!(!rect.contains(50.1, 25.0));
    }

    #[test]
    fn test_contains_half_open_excludes_far_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains_half_open(10.0, 10.0));
        assert!(!rect.contains_half_open(30.0, 12.0));
        assert!(!rect.contains_half_open(12.0, 15.0));
    }

    #[test]
    fn test_enclosing_radius_from_corner_and_center() {
        let rect = Rect::new(0.0, 0.0, 30.0, 40.0);
        assert_eq!(rect.enclosing_radius_from(Point::new(0.0, 0.0)), 50.0);
        assert_eq!(rect.enclosing_radius_from(Point::new(15.0, 20.0)), 25.0);
    }
}
