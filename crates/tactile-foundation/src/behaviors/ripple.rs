use super::restart_on_change;
use crate::input::{TouchRef, Window};
use crate::touch_filters::is_opos_colliding_and_not_wheel;
use crate::widget::{Observation, WidgetId, WidgetProperty};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tactile_animation::{tween, Lerp, Transition};
use tactile_core::select::pending;
use tactile_core::{move_on_when, Supervisor, TaskGroup, Trigger};
use tactile_ui_graphics::{Color, Dp, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct RippleConfig {
    /// Diameter a ripple starts from.
    pub initial_size: Dp,
    /// Diameter a ripple grows to. `None` covers the whole widget.
    pub final_size: Option<Dp>,
    pub duration_in: f32,
    pub duration_out: f32,
    pub growth_curve: Transition,
    pub fadeout_curve: Transition,
    pub color: Color,
    /// Whether several touches may show ripples at once.
    pub allow_multiple: bool,
    /// Fade when the touch is claimed rather than when it is released.
    pub fades_on_claim: bool,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            initial_size: Dp(20.0),
            final_size: None,
            duration_in: 0.3,
            duration_out: 0.2,
            growth_curve: Transition::Linear,
            fadeout_curve: Transition::Linear,
            color: Color::rgba(1.0, 1.0, 1.0, 0x44 as f32 / 255.0),
            allow_multiple: true,
            fades_on_claim: true,
        }
    }
}

/// A ripple being drawn. `center` is in the widget's `pos` space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub center: Point,
    pub diameter: f32,
    pub color: Color,
}

/// Touch feedback: a circle growing from where the touch went down.
///
/// Ripples are not clipped to the widget.
pub struct TouchRipple {
    inner: Rc<RippleInner>,
}

struct RippleInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<RippleConfig>,
    supervisor: Supervisor,
    ripples: RefCell<IndexMap<u64, Ripple>>,
    next_ripple: Cell<u64>,
    trigger: Trigger,
    _observation: Observation,
}

impl TouchRipple {
    pub fn attach(window: &Window, widget: WidgetId, config: RippleConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RippleInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    RippleInner::reset(&inner);
                }
            });
            let observation =
                restart_on_change(window.tree(), widget, &[WidgetProperty::Disabled], &trigger);
            RippleInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                supervisor: Supervisor::new(window.runtime().clone()),
                ripples: RefCell::new(IndexMap::new()),
                next_ripple: Cell::new(1),
                trigger,
                _observation: observation,
            }
        });
        RippleInner::reset(&inner);
        Self { inner }
    }

    pub fn config(&self) -> RippleConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: RippleConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    /// Ripples currently shown, oldest first.
    pub fn ripples(&self) -> Vec<Ripple> {
        self.inner.ripples.borrow().values().copied().collect()
    }
}

/// Removes a ripple however its animation ends.
struct RippleGuard {
    inner: Weak<RippleInner>,
    id: u64,
}

impl Drop for RippleGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.ripples.borrow_mut().shift_remove(&self.id);
        }
    }
}

impl RippleInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        this.ripples.borrow_mut().clear();
        if this.window.tree().is_disabled(this.widget) {
            return;
        }
        this.supervisor.restart(Self::run(Rc::downgrade(this)));
    }

    fn update(this: &Weak<Self>, id: u64, f: impl FnOnce(&mut Ripple)) {
        if let Some(inner) = this.upgrade() {
            if let Some(ripple) = inner.ripples.borrow_mut().get_mut(&id) {
                f(ripple);
            }
        }
    }

    async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let downs = inner
            .window
            .touch_downs(inner.widget, Rc::new(is_opos_colliding_and_not_wheel));
        let allow_multiple = inner.config.borrow().allow_multiple;
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        loop {
            let touch = downs.next().await;
            if allow_multiple {
                group.start(Self::generate(this.clone(), touch));
            } else {
                Self::generate(this.clone(), touch).await;
            }
        }
    }

    async fn generate(this: Weak<Self>, touch: TouchRef) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let config = inner.config.borrow().clone();
        let tree = inner.window.tree().clone();
        let runtime = inner.window.runtime().clone();
        let widget = inner.widget;
        let center = tree.to_local(widget, touch.opos);
        let initial = inner.window.dp(config.initial_size.0);
        let target = match config.final_size {
            Some(size) => inner.window.dp(size.0),
            None => 2.0 * tree.rect(widget).enclosing_radius_from(touch.opos),
        };
        let id = inner.next_ripple.get();
        inner.next_ripple.set(id + 1);
        inner.ripples.borrow_mut().insert(
            id,
            Ripple {
                center,
                diameter: initial,
                color: config.color,
            },
        );
        drop(inner);
        let _guard = RippleGuard {
            inner: this.clone(),
            id,
        };

        let signal = if config.fades_on_claim {
            touch.session.exclusive_access().clone()
        } else {
            touch.session.ended().clone()
        };
        let growing = this.clone();
        move_on_when(signal.wait(), async {
            tween(&runtime, config.duration_in, config.growth_curve, move |progress| {
                Self::update(&growing, id, |ripple| {
                    ripple.diameter = initial.lerp(&target, progress);
                });
            })
            .await;
            pending::<()>().await;
        })
        .await;

        let fading = this.clone();
        let alpha = config.color.a();
        tween(&runtime, config.duration_out, config.fadeout_curve, move |progress| {
            Self::update(&fading, id, |ripple| {
                ripple.color = ripple.color.with_alpha(alpha.lerp(&0.0, progress));
            });
        })
        .await;
    }
}
