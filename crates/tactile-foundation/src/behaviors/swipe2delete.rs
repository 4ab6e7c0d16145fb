//! Swipe a child of a layout away to delete it.
//!
//! Available as a plain future, [`enable_swipe2delete`], that lasts until it
//! is dropped, and as [`Swipe2DeleteBehavior`], which restarts it whenever
//! the layout or its configuration changes.

use super::restart_on_change;
use crate::error::ConfigError;
use crate::gesture_constants::{DELETE_THRESHOLD_DP, SWIPE_FADE_FACTOR, SWIPE_THRESHOLD_DP};
use crate::input::Window;
use crate::touch_filters::is_opos_colliding;
use crate::widget::{Observation, WidgetId, WidgetProperty, WidgetTree};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::str::FromStr;
use tactile_core::{move_on_when, Supervisor, Trigger};
use tactile_ui_graphics::{Dp, Point};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwipeDirection {
    #[default]
    Horizontal,
    Vertical,
}

impl SwipeDirection {
    fn component(self, offset: Point) -> f32 {
        match self {
            SwipeDirection::Horizontal => offset.x,
            SwipeDirection::Vertical => offset.y,
        }
    }

    fn translation(self, distance: f32) -> Point {
        match self {
            SwipeDirection::Horizontal => Point::new(distance, 0.0),
            SwipeDirection::Vertical => Point::new(0.0, distance),
        }
    }
}

impl FromStr for SwipeDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(SwipeDirection::Horizontal),
            "vertical" => Ok(SwipeDirection::Vertical),
            other => Err(ConfigError::InvalidSwipeDirection(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Swipe2DeleteConfig {
    /// Distance a touch must travel along `direction` to become a swipe.
    pub swipe_threshold: Dp,
    /// Distance a swipe must reach for the release to delete the child.
    pub delete_threshold: Dp,
    pub direction: SwipeDirection,
}

impl Default for Swipe2DeleteConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: Dp(SWIPE_THRESHOLD_DP),
            delete_threshold: Dp(DELETE_THRESHOLD_DP),
            direction: SwipeDirection::Horizontal,
        }
    }
}

/// Called with the layout and the swiped child.
pub type DeleteAction = Rc<dyn Fn(&WidgetTree, WidgetId, WidgetId)>;

pub fn remove_child(tree: &WidgetTree, layout: WidgetId, child: WidgetId) {
    tree.remove_widget(layout, child);
}

/// Puts the swiped child back, then deletes it if it went far enough.
struct SwipeGuard<'a> {
    tree: &'a WidgetTree,
    layout: WidgetId,
    child: WidgetId,
    original_opacity: f32,
    distance: Cell<f32>,
    delete_threshold: f32,
    delete_action: &'a dyn Fn(&WidgetTree, WidgetId, WidgetId),
}

impl Drop for SwipeGuard<'_> {
    fn drop(&mut self) {
        let _ = self.tree.set_opacity(self.child, self.original_opacity);
        let _ = self.tree.set_translation(self.child, Point::ZERO);
        if self.distance.get().abs() > self.delete_threshold {
            log::debug!("{} swiped out of {}", self.child, self.layout);
            (self.delete_action)(self.tree, self.layout, self.child);
        }
    }
}

/// Lets the children of `layout` be swiped away until the future is dropped.
///
/// Touches are handled one at a time.
pub async fn enable_swipe2delete(
    window: Window,
    layout: WidgetId,
    config: Swipe2DeleteConfig,
    delete_action: impl Fn(&WidgetTree, WidgetId, WidgetId) + 'static,
) {
    let tree = window.tree().clone();
    let swipe_threshold = window.dp(config.swipe_threshold.0);
    let delete_threshold = window.dp(config.delete_threshold.0);
    let fade_threshold = delete_threshold * SWIPE_FADE_FACTOR;
    let direction = config.direction;
    let downs = window.touch_downs(layout, Rc::new(is_opos_colliding));
    loop {
        let touch = downs.next().await;
        let Some(child) = tree.child_at(layout, tree.to_local(layout, touch.opos)) else {
            continue;
        };
        let origin = tree.to_window(layout, touch.opos);
        let session = touch.session;
        let moves = session.moves();
        move_on_when(session.ended().wait(), async {
            move_on_when(session.exclusive_access().wait(), async {
                loop {
                    let motion = moves.next().await;
                    if direction.component(motion.pos - origin).abs() > swipe_threshold {
                        break;
                    }
                }
            })
            .await;
            if session.exclusive_access().is_fired() || !session.try_claim() {
                return;
            }

            let original_opacity = tree.opacity(child);
            let guard = SwipeGuard {
                tree: &tree,
                layout,
                child,
                original_opacity,
                distance: Cell::new(0.0),
                delete_threshold,
                delete_action: &delete_action,
            };
            loop {
                let motion = moves.next().await;
                let distance = direction.component(motion.pos - origin);
                guard.distance.set(distance);
                log::trace!("{child} swiped by {distance}");
                let _ = tree.set_translation(child, direction.translation(distance));
                let _ = tree.set_opacity(
                    child,
                    (1.0 - distance.abs() / fade_threshold) * original_opacity,
                );
            }
        })
        .await;
    }
}

/// Swipe-to-delete on a layout, active while the layout has a parent and
/// neither it nor the behavior is disabled.
pub struct Swipe2DeleteBehavior {
    inner: Rc<Swipe2DeleteInner>,
}

struct Swipe2DeleteInner {
    window: Window,
    layout: WidgetId,
    config: RefCell<Swipe2DeleteConfig>,
    s2d_disabled: Cell<bool>,
    delete_action: RefCell<DeleteAction>,
    supervisor: Supervisor,
    trigger: Trigger,
    _observation: Observation,
}

impl Swipe2DeleteBehavior {
    pub fn attach(window: &Window, layout: WidgetId, config: Swipe2DeleteConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<Swipe2DeleteInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    Swipe2DeleteInner::reset(&inner);
                }
            });
            let observation = restart_on_change(
                window.tree(),
                layout,
                &[WidgetProperty::Disabled, WidgetProperty::Parent],
                &trigger,
            );
            Swipe2DeleteInner {
                window: window.clone(),
                layout,
                config: RefCell::new(config),
                s2d_disabled: Cell::new(false),
                delete_action: RefCell::new(Rc::new(remove_child)),
                supervisor: Supervisor::new(window.runtime().clone()),
                trigger,
                _observation: observation,
            }
        });
        Swipe2DeleteInner::reset(&inner);
        Self { inner }
    }

    pub fn config(&self) -> Swipe2DeleteConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: Swipe2DeleteConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    pub fn s2d_disabled(&self) -> bool {
        self.inner.s2d_disabled.get()
    }

    pub fn set_s2d_disabled(&self, disabled: bool) {
        if self.inner.s2d_disabled.replace(disabled) != disabled {
            self.inner.trigger.trigger();
        }
    }

    /// Replaces what happens to a child swiped past the delete threshold.
    /// Removing it from the layout is the default.
    pub fn on_swipe2delete(&self, action: impl Fn(&WidgetTree, WidgetId, WidgetId) + 'static) {
        *self.inner.delete_action.borrow_mut() = Rc::new(action);
    }
}

impl Swipe2DeleteInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        let tree = this.window.tree();
        if tree.parent(this.layout).is_none() || tree.is_disabled(this.layout) || this.s2d_disabled.get() {
            return;
        }
        let weak = Rc::downgrade(this);
        let delete_action = move |tree: &WidgetTree, layout: WidgetId, child: WidgetId| {
            if let Some(inner) = weak.upgrade() {
                let action = Rc::clone(&*inner.delete_action.borrow());
                action(tree, layout, child);
            }
        };
        this.supervisor.restart(enable_swipe2delete(
            this.window.clone(),
            this.layout,
            this.config.borrow().clone(),
            delete_action,
        ));
    }
}
