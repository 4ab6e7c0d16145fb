//! Interaction behaviors attached to widgets of a [`Window`](crate::input::Window).
//!
//! Each behavior owns one [`Supervisor`](tactile_core::Supervisor) running its
//! listener task. The task is restarted when a watched widget property or
//! the behavior's config changes, and cancelled when the behavior is dropped.

pub mod draggable;
pub mod drop_target;
pub mod multi_tap;
pub mod reorder;
pub mod ripple;
pub mod swipe2delete;
pub mod tap;

use crate::widget::{Observation, WidgetId, WidgetProperty, WidgetTree};
use tactile_core::Trigger;

/// Pulls `trigger` whenever one of `properties` of `widget` changes.
pub(crate) fn restart_on_change(
    tree: &WidgetTree,
    widget: WidgetId,
    properties: &[WidgetProperty],
    trigger: &Trigger,
) -> Observation {
    let trigger = trigger.clone();
    tree.observe(widget, properties, move |_, _| trigger.trigger())
}
