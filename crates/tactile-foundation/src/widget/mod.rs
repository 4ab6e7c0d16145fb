//! Retained widget tree the behaviors attach to.
//!
//! Positions follow the host toolkit: a widget's `pos` is expressed in its
//! parent's local space, the y axis points up, and `children[0]` is the
//! top-most child (the one added last, unless an index was given).

mod state;
mod tree;

pub use state::{restore_widget_state, save_widget_state, Placement, WidgetState};
pub use tree::{HitTest, Observation, WidgetTree};

use std::fmt;
use tactile_ui_graphics::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u64);

impl WidgetId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Proportional sizing relative to the parent, with optional clamps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeHint {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub min_x: Option<f32>,
    pub min_y: Option<f32>,
    pub max_x: Option<f32>,
    pub max_y: Option<f32>,
}

impl Default for SizeHint {
    fn default() -> Self {
        Self {
            x: Some(1.0),
            y: Some(1.0),
            min_x: None,
            min_y: None,
            max_x: None,
            max_y: None,
        }
    }
}

impl SizeHint {
    /// No proportional sizing on either axis.
    pub const NONE: SizeHint = SizeHint {
        x: None,
        y: None,
        min_x: None,
        min_y: None,
        max_x: None,
        max_y: None,
    };

    pub fn new(x: Option<f32>, y: Option<f32>) -> Self {
        Self {
            x,
            y,
            ..Self::NONE
        }
    }

    pub fn with_min(mut self, min_x: Option<f32>, min_y: Option<f32>) -> Self {
        self.min_x = min_x;
        self.min_y = min_y;
        self
    }

    pub fn with_max(mut self, max_x: Option<f32>, max_y: Option<f32>) -> Self {
        self.max_x = max_x;
        self.max_y = max_y;
        self
    }

    /// Resolves the hinted extent along one axis for a parent extent.
    ///
    /// Returns `None` when the axis is not hinted.
    pub fn resolve(hint: Option<f32>, min: Option<f32>, max: Option<f32>, parent: f32) -> Option<f32> {
        let mut extent = hint? * parent;
        if let Some(min) = min {
            extent = extent.max(min);
        }
        if let Some(max) = max {
            extent = extent.min(max);
        }
        Some(extent)
    }
}

/// Proportional positioning relative to the parent.
///
/// Horizontal keys are consulted in the order `x`, `right`, `center_x`,
/// `center`, `pos`; vertical ones in the order `y`, `top`, `center_y`,
/// `center`, `pos`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PosHint {
    pub x: Option<f32>,
    pub right: Option<f32>,
    pub center_x: Option<f32>,
    pub y: Option<f32>,
    pub top: Option<f32>,
    pub center_y: Option<f32>,
    pub center: Option<(f32, f32)>,
    pub pos: Option<(f32, f32)>,
}

impl PosHint {
    pub fn is_empty(&self) -> bool {
        *self == PosHint::default()
    }

    /// Resolves the horizontal position of a child `width` wide inside a
    /// parent `parent_width` wide.
    pub fn resolve_x(&self, width: f32, parent_width: f32) -> Option<f32> {
        if let Some(hint) = self.x {
            Some(hint * parent_width)
        } else if let Some(hint) = self.right {
            Some(hint * parent_width - width)
        } else if let Some(hint) = self.center_x {
            Some(hint * parent_width - width / 2.0)
        } else if let Some((hint, _)) = self.center {
            Some(hint * parent_width - width / 2.0)
        } else {
            self.pos.map(|(hint, _)| hint * parent_width)
        }
    }

    pub fn resolve_y(&self, height: f32, parent_height: f32) -> Option<f32> {
        if let Some(hint) = self.y {
            Some(hint * parent_height)
        } else if let Some(hint) = self.top {
            Some(hint * parent_height - height)
        } else if let Some(hint) = self.center_y {
            Some(hint * parent_height - height / 2.0)
        } else if let Some((_, hint)) = self.center {
            Some(hint * parent_height - height / 2.0)
        } else {
            self.pos.map(|(_, hint)| hint * parent_height)
        }
    }
}

/// How a widget maps its children's coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LocalFrame {
    /// Children share the widget's own coordinate space.
    #[default]
    Inherit,
    /// Children are positioned relative to the widget's origin shifted by
    /// `offset`.
    Relative { offset: Point },
}

/// Observable widget fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetProperty {
    Pos,
    Size,
    SizeHint,
    PosHint,
    Opacity,
    Translation,
    Disabled,
    Parent,
    Children,
    Frame,
}
