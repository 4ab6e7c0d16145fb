//! A scrollview with kinetic scrolling, overscroll and scrollbars.
//!
//! The scrollview holds exactly one child, the content. Its children live in
//! a [`LocalFrame::Relative`] frame offset by the content position, and it
//! clips touches and drawing to its bounds.

mod bars;
mod handlers;
mod velocity;

pub use bars::{bar_length_and_ratio, content_bounds, BarGeometry, ScrollBarConfig};
pub use velocity::{compute_velocity, MotionSample, TouchHistory};

use crate::behaviors::restart_on_change;
use crate::effects::{
    shared_effect, DampedScrollEffect, EffectDriver, PlainScrollEffect, ScrollEffect, SharedEffect,
};
use crate::error::ConfigError;
use crate::gesture_constants::{SCROLL_DISTANCE_DP, SCROLL_TIMEOUT, SCROLL_WHEEL_DISTANCE_DP};
use crate::input::Window;
use crate::widget::{LocalFrame, Observation, SizeHint, WidgetId, WidgetProperty};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tactile_core::{Supervisor, Trigger};
use tactile_ui_graphics::{Dp, Point, Size};

#[derive(Clone)]
pub struct ScrollViewConfig {
    /// Distance a touch must travel before it scrolls.
    pub scroll_distance: Dp,
    pub scroll_wheel_distance: Dp,
    /// Seconds a touch has to reach `scroll_distance` before it is left to
    /// the children.
    pub scroll_timeout: f64,
    /// When set, wheel notches add `distance * smooth_scroll_end` to the
    /// effect's velocity instead of jumping.
    pub smooth_scroll_end: Option<f32>,
    pub do_scroll_x: bool,
    pub do_scroll_y: bool,
    pub do_overscroll_x: bool,
    pub do_overscroll_y: bool,
    /// Effect for the x axis. `None` picks a [`DampedScrollEffect`] when
    /// overscroll is allowed, a [`PlainScrollEffect`] otherwise.
    pub effect_x: Option<SharedEffect>,
    pub effect_y: Option<SharedEffect>,
    pub hbar: ScrollBarConfig,
    pub vbar: ScrollBarConfig,
}

impl Default for ScrollViewConfig {
    fn default() -> Self {
        Self {
            scroll_distance: Dp(SCROLL_DISTANCE_DP),
            scroll_wheel_distance: Dp(SCROLL_WHEEL_DISTANCE_DP),
            scroll_timeout: SCROLL_TIMEOUT,
            smooth_scroll_end: None,
            do_scroll_x: true,
            do_scroll_y: true,
            do_overscroll_x: true,
            do_overscroll_y: true,
            effect_x: None,
            effect_y: None,
            hbar: ScrollBarConfig::default(),
            vbar: ScrollBarConfig::default(),
        }
    }
}

impl ScrollViewConfig {
    fn do_scroll(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.do_scroll_x,
            Axis::Y => self.do_scroll_y,
        }
    }

    fn do_overscroll(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.do_overscroll_x,
            Axis::Y => self.do_overscroll_y,
        }
    }

    fn hbar_active(&self) -> bool {
        self.hbar.enabled && self.do_scroll_x
    }

    fn vbar_active(&self) -> bool {
        self.vbar.enabled && self.do_scroll_y
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, point: Point) -> f32 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }

    fn set(self, point: &mut Point, value: f32) {
        match self {
            Axis::X => point.x = value,
            Axis::Y => point.y = value,
        }
    }

    fn extent(self, size: Size) -> f32 {
        match self {
            Axis::X => size.width,
            Axis::Y => size.height,
        }
    }
}

/// Range the content position may take, relative to the scrollview.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentBounds {
    pub min: Point,
    pub max: Point,
}

#[derive(Default)]
struct Drivers {
    x: Option<EffectDriver>,
    y: Option<EffectDriver>,
}

impl Drivers {
    fn get(&self, axis: Axis) -> Option<&EffectDriver> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
        }
    }
}

pub struct ScrollView {
    inner: Rc<ScrollInner>,
}

pub(crate) struct ScrollInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<ScrollViewConfig>,
    supervisor: Supervisor,
    content: Cell<Option<WidgetId>>,
    prev_content: Cell<Option<WidgetId>>,
    content_pos: Cell<Point>,
    bounds: Cell<ContentBounds>,
    hbar: Cell<BarGeometry>,
    vbar: Cell<BarGeometry>,
    drivers: RefCell<Drivers>,
    content_observations: RefCell<Vec<Observation>>,
    last_error: RefCell<Option<ConfigError>>,
    trigger: Trigger,
    _observation: Observation,
}

impl ScrollView {
    /// Turns `widget` into a scrollview.
    ///
    /// Fails when it already holds more than one child.
    pub fn attach(window: &Window, widget: WidgetId, config: ScrollViewConfig) -> Result<Self, ConfigError> {
        let count = window.tree().child_count(widget);
        if count > 1 {
            return Err(ConfigError::TooManyChildren { widget, count });
        }
        let inner = Rc::new_cyclic(|weak: &Weak<ScrollInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    ScrollInner::reset(&inner);
                }
            });
            let observation = restart_on_change(
                window.tree(),
                widget,
                &[WidgetProperty::Disabled, WidgetProperty::Children],
                &trigger,
            );
            ScrollInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                supervisor: Supervisor::new(window.runtime().clone()),
                content: Cell::new(None),
                prev_content: Cell::new(None),
                content_pos: Cell::new(Point::ZERO),
                bounds: Cell::new(ContentBounds::default()),
                hbar: Cell::new(BarGeometry::default()),
                vbar: Cell::new(BarGeometry::default()),
                drivers: RefCell::new(Drivers::default()),
                content_observations: RefCell::new(Vec::new()),
                last_error: RefCell::new(None),
                trigger,
                _observation: observation,
            }
        });
        let _ = window.tree().set_clips(widget, true);
        ScrollInner::reset(&inner);
        Ok(Self { inner })
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    /// Makes `content` the scrolled child. Fails without touching the tree
    /// when the scrollview already holds another child.
    pub fn set_content(&self, content: WidgetId) -> Result<(), ConfigError> {
        let tree = self.inner.window.tree();
        let children = tree.children(self.inner.widget);
        if children.contains(&content) {
            return Ok(());
        }
        if !children.is_empty() {
            return Err(ConfigError::TooManyChildren {
                widget: self.inner.widget,
                count: children.len() + 1,
            });
        }
        tree.add_widget(self.inner.widget, content, 0)
    }

    pub fn config(&self) -> ScrollViewConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: ScrollViewConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    /// The scrolled child while the scrollview is active.
    pub fn content(&self) -> Option<WidgetId> {
        self.inner.content.get()
    }

    /// Content position relative to the scrollview.
    pub fn content_pos(&self) -> Point {
        self.inner.content_pos.get()
    }

    pub fn content_bounds(&self) -> ContentBounds {
        self.inner.bounds.get()
    }

    pub fn hbar(&self) -> BarGeometry {
        self.inner.hbar.get()
    }

    pub fn vbar(&self) -> BarGeometry {
        self.inner.vbar.get()
    }

    /// The configuration error that kept the scrollview inactive at its
    /// last restart, if any.
    pub fn last_error(&self) -> Option<ConfigError> {
        self.inner.last_error.borrow().clone()
    }

    /// Whether an effect is currently moving the content.
    pub fn is_animating(&self) -> bool {
        let drivers = self.inner.drivers.borrow();
        [Axis::X, Axis::Y]
            .into_iter()
            .filter_map(|axis| drivers.get(axis))
            .any(EffectDriver::is_active)
    }

    pub fn stop_scroll_momentum(&self) {
        self.inner.stop_scroll_momentum();
    }

    /// Gives the content the momentum to travel roughly the given distances.
    pub fn scroll_by_distance(&self, x: Option<f32>, y: Option<f32>) {
        self.inner.with_effects(x, y, |effect, distance| effect.scroll_by(distance));
    }

    /// Gives the content the momentum to come to rest near the given position.
    pub fn scroll_to_pos(&self, x: Option<f32>, y: Option<f32>) {
        self.inner.with_effects(x, y, |effect, value| effect.scroll_to(value));
    }

    /// Scrolls until `widget`, a descendant of the content, sits in the middle.
    pub fn scroll_to_widget(&self, widget: WidgetId) -> Result<(), ConfigError> {
        let tree = self.inner.window.tree();
        let not_a_descendant = ConfigError::NotADescendant { widget };
        let content = self.inner.content.get().ok_or_else(|| not_a_descendant.clone())?;
        let mut center = tree.center(widget);
        let mut parent = tree.parent(widget);
        loop {
            match parent {
                Some(ancestor) if ancestor == content => break,
                Some(ancestor) if ancestor != self.inner.widget => {
                    center = tree.to_parent(ancestor, center);
                    parent = tree.parent(ancestor);
                }
                _ => return Err(not_a_descendant),
            }
        }
        let size = tree.size(self.inner.widget);
        self.scroll_to_pos(
            Some(size.width * 0.5 - center.x),
            Some(size.height * 0.5 - center.y),
        );
        Ok(())
    }
}

impl ScrollInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        this.teardown();
        this.last_error.borrow_mut().take();
        if this.window.tree().is_disabled(this.widget) {
            return;
        }
        match Self::setup(this) {
            Ok(true) => {
                log::debug!("scrollview {} listening", this.widget);
                this.supervisor.restart(Self::run(Rc::downgrade(this)));
            }
            Ok(false) => {}
            Err(err) => {
                log::error!("scrollview {} stays inactive: {err}", this.widget);
                *this.last_error.borrow_mut() = Some(err);
            }
        }
    }

    fn teardown(&self) {
        self.content_observations.borrow_mut().clear();
        let drivers = std::mem::take(&mut *self.drivers.borrow_mut());
        drop(drivers);
        if let Some(content) = self.content.take() {
            self.prev_content.set(Some(content));
        }
        self.hbar.set(BarGeometry::default());
        self.vbar.set(BarGeometry::default());
    }

    /// Binds the scrollview to its single child. Returns `Ok(false)` when
    /// there is nothing to scroll.
    fn setup(this: &Rc<Self>) -> Result<bool, ConfigError> {
        let tree = this.window.tree();
        let children = tree.children(this.widget);
        let content = match children.as_slice() {
            [] => {
                log::warn!("scrollview {} has no content", this.widget);
                return Ok(false);
            }
            [content] => *content,
            _ => {
                return Err(ConfigError::TooManyChildren {
                    widget: this.widget,
                    count: children.len(),
                })
            }
        };
        if this.prev_content.get() != Some(content) {
            tree.set_pos(content, Point::ZERO)?;
            this.content_pos.set(Point::ZERO);
        }
        this.content.set(Some(content));
        let config = this.config.borrow().clone();

        let observe = |widget: WidgetId, properties: &[WidgetProperty]| {
            let weak = Rc::downgrade(this);
            tree.observe(widget, properties, move |_, _| {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh();
                }
            })
        };
        let observations = vec![
            observe(this.widget, &[WidgetProperty::Size]),
            observe(
                content,
                &[WidgetProperty::Size, WidgetProperty::SizeHint, WidgetProperty::PosHint],
            ),
        ];
        *this.content_observations.borrow_mut() = observations;
        this.refresh();

        let mut drivers = Drivers::default();
        for axis in [Axis::X, Axis::Y] {
            if !config.do_scroll(axis) {
                continue;
            }
            let effect = match axis {
                Axis::X => config.effect_x.clone(),
                Axis::Y => config.effect_y.clone(),
            }
            .unwrap_or_else(|| default_effect(config.do_overscroll(axis)));
            {
                let bounds = this.bounds.get();
                let mut effect = effect.borrow_mut();
                let state = effect.state_mut();
                state.velocity = 0.0;
                state.min = axis.of(bounds.min);
                state.max = axis.of(bounds.max);
                state.value = axis.of(this.content_pos.get());
            }
            let weak = Rc::downgrade(this);
            let driver = EffectDriver::new(&this.window.runtime().frame_clock(), effect, move |value| {
                if let Some(inner) = weak.upgrade() {
                    inner.move_content(axis, value, true);
                }
            });
            match axis {
                Axis::X => drivers.x = Some(driver),
                Axis::Y => drivers.y = Some(driver),
            }
        }
        *this.drivers.borrow_mut() = drivers;
        Ok(true)
    }

    /// Recomputes everything derived from the scrollview's and the content's
    /// geometry.
    fn refresh(&self) {
        let Some(content) = self.content.get() else {
            return;
        };
        let tree = self.window.tree();
        let config = self.config.borrow().clone();
        let viewport = tree.size(self.widget);

        let hint = tree.size_hint(content);
        if let Some(width) = SizeHint::resolve(hint.x, hint.min_x, hint.max_x, viewport.width) {
            let _ = tree.set_width(content, width);
        }
        if let Some(height) = SizeHint::resolve(hint.y, hint.min_y, hint.max_y, viewport.height) {
            let _ = tree.set_height(content, height);
        }
        let content_size = tree.size(content);

        let mut bounds = self.bounds.get();
        let mut pos = self.content_pos.get();
        let pos_hint = tree.pos_hint(content);
        for axis in [Axis::X, Axis::Y] {
            if config.do_scroll(axis) {
                let (min, max) = content_bounds(axis.extent(viewport), axis.extent(content_size));
                axis.set(&mut bounds.min, min);
                axis.set(&mut bounds.max, max);
                if !config.do_overscroll(axis) {
                    let clamped = axis.of(pos).clamp(min, max);
                    axis.set(&mut pos, clamped);
                }
            } else {
                let hinted = match axis {
                    Axis::X => pos_hint.resolve_x(content_size.width, viewport.width),
                    Axis::Y => pos_hint.resolve_y(content_size.height, viewport.height),
                };
                if let Some(value) = hinted {
                    axis.set(&mut pos, value);
                }
            }
        }
        self.bounds.set(bounds);
        if let Ok(drivers) = self.drivers.try_borrow() {
            for axis in [Axis::X, Axis::Y] {
                if let Some(driver) = drivers.get(axis) {
                    if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                        let state = effect.state_mut();
                        state.min = axis.of(bounds.min);
                        state.max = axis.of(bounds.max);
                        state.value = axis.of(pos);
                    }
                }
            }
        }

        let density = self.window.density();
        let mut hbar = BarGeometry::default();
        if config.hbar_active() {
            let (length, ratio) = bar_length_and_ratio(
                viewport.width,
                content_size.width,
                config.hbar.length_min.to_px(density),
            );
            hbar.size = Size::new(length, config.hbar.thickness.to_px(density));
            hbar.ratio = ratio;
        }
        self.hbar.set(hbar);
        let mut vbar = BarGeometry::default();
        if config.vbar_active() {
            let (length, ratio) = bar_length_and_ratio(
                viewport.height,
                content_size.height,
                config.vbar.length_min.to_px(density),
            );
            vbar.size = Size::new(config.vbar.thickness.to_px(density), length);
            vbar.ratio = ratio;
        }
        self.vbar.set(vbar);

        self.content_pos.set(pos);
        self.apply_content_pos();
    }

    /// Moves the content along `axis`. With `clamp`, an axis without
    /// overscroll is kept inside the bounds.
    pub(crate) fn move_content(&self, axis: Axis, value: f32, clamp: bool) {
        let config = self.config.borrow();
        let bounds = self.bounds.get();
        let requested = value;
        let value = if clamp && !config.do_overscroll(axis) {
            value.clamp(axis.of(bounds.min), axis.of(bounds.max))
        } else {
            value
        };
        drop(config);
        let mut pos = self.content_pos.get();
        axis.set(&mut pos, value);
        self.content_pos.set(pos);
        if let Some(driver) = self.drivers.borrow().get(axis) {
            if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                let state = effect.state_mut();
                state.value = value;
                // Momentum stops at the edge it was clamped to.
                if value != requested {
                    state.velocity = 0.0;
                }
            }
        }
        self.apply_content_pos();
    }

    pub(crate) fn content_axis(&self, axis: Axis) -> f32 {
        axis.of(self.content_pos.get())
    }

    fn apply_content_pos(&self) {
        let pos = self.content_pos.get();
        let config = self.config.borrow();
        let mut hbar = self.hbar.get();
        hbar.pos = Point::new(pos.x * hbar.ratio, config.hbar.offset);
        self.hbar.set(hbar);
        let mut vbar = self.vbar.get();
        vbar.pos = Point::new(config.vbar.offset, pos.y * vbar.ratio);
        self.vbar.set(vbar);
        drop(config);
        let _ = self
            .window
            .tree()
            .set_frame(self.widget, LocalFrame::Relative { offset: pos });
    }

    pub(crate) fn stop_scroll_momentum(&self) {
        let drivers = self.drivers.borrow();
        for axis in [Axis::X, Axis::Y] {
            if let Some(driver) = drivers.get(axis) {
                driver.deactivate();
                if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                    effect.state_mut().velocity = 0.0;
                }
            }
        }
    }

    pub(crate) fn activate(&self, axis: Axis) {
        if let Some(driver) = self.drivers.borrow().get(axis) {
            driver.activate();
        }
    }

    pub(crate) fn add_velocity(&self, axis: Axis, velocity: f32) {
        if let Some(driver) = self.drivers.borrow().get(axis) {
            if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                effect.state_mut().velocity += velocity;
            }
            driver.activate();
        }
    }

    pub(crate) fn set_velocity(&self, axis: Axis, velocity: f32) {
        if let Some(driver) = self.drivers.borrow().get(axis) {
            if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                effect.state_mut().velocity = velocity;
            }
            driver.activate();
        }
    }

    fn with_effects(
        &self,
        x: Option<f32>,
        y: Option<f32>,
        apply: impl Fn(&mut dyn ScrollEffect, f32),
    ) {
        let drivers = self.drivers.borrow();
        for (axis, amount) in [(Axis::X, x), (Axis::Y, y)] {
            let (Some(amount), Some(driver)) = (amount, drivers.get(axis)) else {
                continue;
            };
            if let Ok(mut effect) = driver.effect().try_borrow_mut() {
                apply(&mut *effect, amount);
            }
            driver.activate();
        }
    }
}

fn default_effect(overscroll: bool) -> SharedEffect {
    if overscroll {
        shared_effect(DampedScrollEffect::new())
    } else {
        shared_effect(PlainScrollEffect::new())
    }
}
