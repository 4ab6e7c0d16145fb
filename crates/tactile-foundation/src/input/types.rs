use tactile_ui_graphics::Point;

/// Stable identifier of one press-move-release contact.
pub type TouchId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

/// Direction of a wheel notch, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WheelDirection {
    Up,
    Down,
    Left,
    Right,
}

impl WheelDirection {
    pub fn is_vertical(&self) -> bool {
        matches!(self, WheelDirection::Up | WheelDirection::Down)
    }

    /// Up and right move content toward larger coordinates.
    pub fn is_positive(&self) -> bool {
        matches!(self, WheelDirection::Up | WheelDirection::Right)
    }
}

impl MouseButton {
    pub fn is_wheel(&self) -> bool {
        self.wheel_direction().is_some()
    }

    pub fn wheel_direction(&self) -> Option<WheelDirection> {
        match self {
            MouseButton::ScrollUp => Some(WheelDirection::Up),
            MouseButton::ScrollDown => Some(WheelDirection::Down),
            MouseButton::ScrollLeft => Some(WheelDirection::Left),
            MouseButton::ScrollRight => Some(WheelDirection::Right),
            _ => None,
        }
    }
}

/// A raw pointer event as the host reports it, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchInput {
    pub id: TouchId,
    pub pos: Point,
    /// Seconds on the host's clock.
    pub time: f64,
    pub button: Option<MouseButton>,
}

impl TouchInput {
    pub fn new(id: TouchId, pos: Point, time: f64) -> Self {
        Self {
            id,
            pos,
            time,
            button: None,
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }
}

/// One recorded move of a touch, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchMotion {
    pub pos: Point,
    pub dx: f32,
    pub dy: f32,
    pub time: f64,
}
