//! Touch arbitration, scroll physics and interaction behaviors for Tactile.
//!
//! Behaviors attach to widgets of a [`WidgetTree`](widget::WidgetTree) owned by
//! a [`Window`](input::Window). Each one listens to the touches the window
//! routes to its widget and competes with the others for them: the first
//! behavior to [`try_claim`](input::TouchSession::try_claim) a touch owns it,
//! everybody else lets go.

pub mod behaviors;
pub mod button;
pub mod effects;
mod error;
pub mod gesture_constants;
pub mod input;
pub mod notify;
pub mod scrollview;
pub mod switch;
pub mod touch_filters;
pub mod widget;

pub use error::ConfigError;

pub mod prelude {
    pub use crate::behaviors::draggable::{
        DragContext, DragRecovery, DragState, Draggable, DraggableConfig, DraggableListener,
    };
    pub use crate::behaviors::drop_target::{DropTarget, DropTargetConfig, DropTargetListener};
    pub use crate::behaviors::multi_tap::{MultiTap, MultiTapConfig, MultiTapRecognizer};
    pub use crate::behaviors::reorder::{ReorderConfig, ReorderContainer, ReorderListener};
    pub use crate::behaviors::ripple::{Ripple, RippleConfig, TouchRipple};
    pub use crate::behaviors::swipe2delete::{
        enable_swipe2delete, Swipe2DeleteBehavior, Swipe2DeleteConfig, SwipeDirection,
    };
    pub use crate::behaviors::tap::{TapConfig, TapRecognizer};
    pub use crate::button::{Button, ButtonColors, MultiTapButton};
    pub use crate::effects::{
        shared_effect, DampedScrollEffect, NoEffect, PlainScrollEffect, ScrollEffect, SharedEffect,
    };
    pub use crate::input::{MouseButton, TouchId, TouchInput, TouchSession, Window};
    pub use crate::scrollview::{ContentBounds, ScrollBarConfig, ScrollView, ScrollViewConfig};
    pub use crate::switch::{Switch, SwitchColors, SwitchConfig, SwitchGeometry};
    pub use crate::widget::{LocalFrame, PosHint, SizeHint, WidgetId, WidgetTree};
    pub use crate::ConfigError;
}

#[cfg(test)]
#[path = "tests/effect_tests.rs"]
mod effect_tests;

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod dispatch_tests;

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod widget_tests;
