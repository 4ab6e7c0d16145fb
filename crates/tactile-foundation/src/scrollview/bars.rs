use tactile_ui_graphics::{Color, Dp, Point, Rect, Size};

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollBarConfig {
    pub enabled: bool,
    /// The thumb never gets shorter than this.
    pub length_min: Dp,
    pub thickness: Dp,
    pub color: Color,
    /// Distance of the bar from the scrollview's bottom edge (horizontal
    /// bar) or left edge (vertical bar), in pixels.
    pub offset: f32,
}

impl Default for ScrollBarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            length_min: Dp(10.0),
            thickness: Dp(10.0),
            color: Color::from_rgba_u8(0xCC, 0xCC, 0xCC, 0x77),
            offset: 0.0,
        }
    }
}

/// Where a scrollbar thumb is drawn, relative to the scrollview's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub pos: Point,
    pub size: Size,
    /// Pixels the thumb moves per pixel of content movement.
    pub ratio: f32,
}

impl Default for BarGeometry {
    fn default() -> Self {
        Self {
            pos: Point::ZERO,
            size: Size::ZERO,
            ratio: 1.0,
        }
    }
}

impl BarGeometry {
    /// Half-open hit test, `local` being relative to the scrollview's origin.
    pub fn contains(&self, local: Point) -> bool {
        Rect::from_origin_size(self.pos, self.size).contains_half_open(local.x, local.y)
    }
}

/// Thumb length and content-to-thumb ratio along one axis.
pub fn bar_length_and_ratio(viewport: f32, content: f32, length_min: f32) -> (f32, f32) {
    let scrollable = viewport - content;
    if scrollable == 0.0 {
        return (0.0, 1.0);
    }
    let length = if scrollable < 0.0 {
        viewport / content * viewport
    } else {
        content
    };
    let length = length.max(length_min);
    (length, (viewport - length) / scrollable)
}

/// Range the content position may take along one axis.
pub fn content_bounds(viewport: f32, content: f32) -> (f32, f32) {
    let diff = viewport - content;
    if diff < 0.0 {
        (diff, 0.0)
    } else {
        (0.0, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_small_content() {
        assert_eq!(content_bounds(100.0, 0.0), (0.0, 100.0));
    }

    #[test]
    fn test_bounds_of_large_content() {
        assert_eq!(content_bounds(0.0, 100.0), (-100.0, 0.0));
    }

    #[test]
    fn test_bar_for_content_twice_the_viewport() {
        let (length, ratio) = bar_length_and_ratio(100.0, 200.0, 10.0);
        assert_eq!(length, 50.0);
        // Scrolling the content by its full range of -100 moves the thumb by 50.
        assert_eq!(ratio, -0.5);
    }

    #[test]
    fn test_bar_respects_minimum_length() {
        let (length, _) = bar_length_and_ratio(100.0, 10_000.0, 10.0);
        assert_eq!(length, 10.0);
    }

    #[test]
    fn test_bar_for_content_filling_the_viewport() {
        assert_eq!(bar_length_and_ratio(100.0, 100.0, 10.0), (0.0, 1.0));
    }

    #[test]
    fn test_bar_hit_box_is_half_open() {
        let bar = BarGeometry {
            pos: Point::new(0.0, 0.0),
            size: Size::new(50.0, 10.0),
            ratio: 1.0,
        };
        assert!(bar.contains(Point::new(0.0, 0.0)));
        assert!(bar.contains(Point::new(49.9, 9.9)));
        assert!(!bar.contains(Point::new(50.0, 5.0)));
        assert!(!bar.contains(Point::new(10.0, 10.0)));
    }
}
