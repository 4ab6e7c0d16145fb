//! A toggle switch: a rounded track with a round thumb, flipped by tapping.

use crate::behaviors::tap::{TapConfig, TapRecognizer};
use crate::input::Window;
use crate::notify::{HandlerId, Notifier};
use crate::widget::{WidgetId, WidgetTree};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tactile_ui_graphics::{Color, Point, Rect, Size, Sp};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchColors {
    pub track_active: Color,
    pub track_inactive: Color,
    pub track_disabled: Color,
    pub thumb_active: Color,
    pub thumb_inactive: Color,
    pub thumb_disabled: Color,
}

impl Default for SwitchColors {
    fn default() -> Self {
        Self {
            track_active: Color::from_rgba_u8(0xB6, 0x6A, 0xF7, 0xFF),
            track_inactive: Color::from_rgba_u8(0x88, 0x88, 0x88, 0xFF),
            track_disabled: Color::from_rgba_u8(0x44, 0x44, 0x44, 0xFF),
            thumb_active: Color::from_rgba_u8(0xFF, 0xFF, 0xFF, 0xFF),
            thumb_inactive: Color::from_rgba_u8(0xFF, 0xFF, 0xFF, 0xFF),
            thumb_disabled: Color::from_rgba_u8(0x66, 0x66, 0x66, 0xFF),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchConfig {
    pub track_width: Sp,
    pub track_height: Sp,
    pub colors: SwitchColors,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            track_width: Sp(64.0),
            track_height: Sp(32.0),
            colors: SwitchColors::default(),
        }
    }
}

/// Where the parts of a switch are drawn, relative to the widget's center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchGeometry {
    pub track: Rect,
    /// Bottom-left corner of the thumb's bounding square.
    pub thumb_pos: Point,
    pub thumb_diameter: f32,
}

impl SwitchGeometry {
    pub fn new(track_width: f32, track_height: f32, active: bool) -> Self {
        let half_width = track_width / 2.0;
        let half_height = track_height / 2.0;
        let padding = track_height / 16.0;
        let thumb_x = if active {
            half_width - track_height + padding
        } else {
            padding - half_width
        };
        Self {
            track: Rect::new(-half_width, -half_height, track_width, track_height),
            thumb_pos: Point::new(thumb_x, padding - half_height),
            thumb_diameter: track_height - 2.0 * padding,
        }
    }
}

/// Tapping anywhere on the track flips `active`.
///
/// Only the track, centered in the widget, collides with touches.
pub struct Switch {
    inner: Rc<SwitchInner>,
}

struct SwitchInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<SwitchConfig>,
    active: Cell<bool>,
    on_active: Notifier<bool>,
    tap: TapRecognizer,
}

impl Switch {
    pub fn attach(window: &Window, widget: WidgetId, config: SwitchConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<SwitchInner>| {
            let tap = TapRecognizer::attach(window, widget, TapConfig::default());
            let weak_tap = weak.clone();
            tap.on_tap(move |_| {
                if let Some(inner) = weak_tap.upgrade() {
                    inner.set_active(!inner.active.get());
                }
            });
            let weak_hit = weak.clone();
            let _ = window.tree().set_hit_test(
                widget,
                Some(Rc::new(move |tree: &WidgetTree, widget: WidgetId, point: Point| {
                    weak_hit
                        .upgrade()
                        .is_some_and(|inner| inner.track_contains(tree, widget, point))
                })),
            );
            SwitchInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                active: Cell::new(false),
                on_active: Notifier::new(),
                tap,
            }
        });
        Self { inner }
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> SwitchConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: SwitchConfig) {
        *self.inner.config.borrow_mut() = config;
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub fn set_active(&self, active: bool) {
        self.inner.set_active(active);
    }

    /// Called with the new state whenever `active` changes.
    pub fn on_active(&self, handler: impl Fn(&bool) + 'static) -> HandlerId {
        self.inner.on_active.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) {
        self.inner.on_active.disconnect(id);
    }

    pub fn tap(&self) -> &TapRecognizer {
        &self.inner.tap
    }

    pub fn geometry(&self) -> SwitchGeometry {
        let (width, height) = self.inner.track_size();
        SwitchGeometry::new(width, height, self.inner.active.get())
    }

    pub fn track_color(&self) -> Color {
        let colors = self.inner.config.borrow().colors;
        if self.inner.window.tree().is_disabled(self.inner.widget) {
            colors.track_disabled
        } else if self.inner.active.get() {
            colors.track_active
        } else {
            colors.track_inactive
        }
    }

    pub fn thumb_color(&self) -> Color {
        let colors = self.inner.config.borrow().colors;
        if self.inner.window.tree().is_disabled(self.inner.widget) {
            colors.thumb_disabled
        } else if self.inner.active.get() {
            colors.thumb_active
        } else {
            colors.thumb_inactive
        }
    }
}

impl SwitchInner {
    fn set_active(&self, active: bool) {
        if self.active.replace(active) != active {
            log::debug!("switch {} is now {}", self.widget, if active { "on" } else { "off" });
            self.on_active.emit(&active);
        }
    }

    fn track_size(&self) -> (f32, f32) {
        let config = self.config.borrow();
        (
            self.window.sp(config.track_width.0),
            self.window.sp(config.track_height.0),
        )
    }

    fn track_contains(&self, tree: &WidgetTree, widget: WidgetId, point: Point) -> bool {
        let (width, height) = self.track_size();
        let center = tree.center(widget);
        let track = Rect::from_origin_size(
            Point::new(center.x - width / 2.0, center.y - height / 2.0),
            Size::new(width, height),
        );
        track.contains_half_open(point.x, point.y)
    }
}

impl Drop for SwitchInner {
    fn drop(&mut self) {
        let _ = self.window.tree().set_hit_test(self.widget, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumb_positions() {
        let off = SwitchGeometry::new(64.0, 32.0, false);
        let on = SwitchGeometry::new(64.0, 32.0, true);
        assert_eq!(off.thumb_pos, Point::new(-30.0, -14.0));
        assert_eq!(on.thumb_pos, Point::new(2.0, -14.0));
        assert_eq!(on.thumb_diameter, 28.0);
        assert_eq!(off.track, Rect::new(-32.0, -16.0, 64.0, 32.0));
    }
}
