//! Predicates deciding whether a touch-down concerns a behavior.
//!
//! Filters run synchronously during dispatch with the touch positions in
//! the space the widget's `pos` lives in.

use crate::input::TouchRef;
use crate::widget::{WidgetId, WidgetTree};
use std::rc::Rc;

pub type TouchFilter = Rc<dyn Fn(&WidgetTree, WidgetId, &TouchRef) -> bool>;

pub fn is_opos_colliding_and_not_wheel(tree: &WidgetTree, widget: WidgetId, touch: &TouchRef) -> bool {
    tree.collide_point(widget, touch.opos) && !touch.session.is_mouse_scrolling()
}

pub fn is_colliding_and_not_wheel(tree: &WidgetTree, widget: WidgetId, touch: &TouchRef) -> bool {
    tree.collide_point(widget, touch.pos) && !touch.session.is_mouse_scrolling()
}

pub fn is_opos_colliding(tree: &WidgetTree, widget: WidgetId, touch: &TouchRef) -> bool {
    tree.collide_point(widget, touch.opos)
}

pub fn is_colliding(tree: &WidgetTree, widget: WidgetId, touch: &TouchRef) -> bool {
    tree.collide_point(widget, touch.pos)
}

/// The filter tap, multi-tap, ripple and drag recognizers start with.
pub fn default_filter() -> TouchFilter {
    Rc::new(is_opos_colliding_and_not_wheel)
}
