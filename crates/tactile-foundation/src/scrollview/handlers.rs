use super::velocity::{compute_velocity, TouchHistory};
use super::{Axis, ScrollInner};
use crate::gesture_constants::{VELOCITY_HISTORY_LEN, VELOCITY_WINDOW};
use crate::input::{TouchRef, TouchSession};
use crate::touch_filters::is_opos_colliding;
use std::rc::{Rc, Weak};
use tactile_core::{move_on_when, race, race3, sleep};
use tactile_ui_graphics::Point;

impl ScrollInner {
    /// Routes every touch-down to one of the wheel, scrollbar or content
    /// handlers, one touch at a time.
    pub(super) async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let downs = inner
            .window
            .touch_downs(inner.widget, Rc::new(is_opos_colliding));
        drop(inner);
        loop {
            let touch = downs.next().await;
            if touch.session.is_mouse_scrolling() {
                Self::handle_mouse_wheel(&this, &touch.session).await;
                continue;
            }
            match Self::bar_under(&this, &touch) {
                Some(axis) => Self::handle_bar_drag(&this, &touch.session, axis).await,
                None => Self::handle_potential_scroll(&this, &touch.session).await,
            }
        }
    }

    fn bar_under(this: &Weak<Self>, touch: &TouchRef) -> Option<Axis> {
        let inner = this.upgrade()?;
        let config = inner.config.borrow();
        let local = touch.opos - inner.window.tree().pos(inner.widget);
        if config.vbar_active() && inner.vbar.get().contains(local) {
            return Some(Axis::Y);
        }
        if config.hbar_active() && inner.hbar.get().contains(local) {
            return Some(Axis::X);
        }
        None
    }

    async fn handle_mouse_wheel(this: &Weak<Self>, session: &Rc<TouchSession>) {
        let Some(direction) = session.button().and_then(|button| button.wheel_direction()) else {
            return;
        };
        let axis = if direction.is_vertical() { Axis::Y } else { Axis::X };
        let positive = direction.is_positive();
        let Some((distance, smooth)) = Self::with(this, |inner| {
            let config = inner.config.borrow();
            if !config.do_scroll(axis) {
                return None;
            }
            let pos = inner.content_axis(axis);
            let bounds = inner.bounds.get();
            let has_room = if positive {
                axis.of(bounds.max) > pos
            } else {
                axis.of(bounds.min) < pos
            };
            has_room.then(|| {
                (
                    inner.window.dp(config.scroll_wheel_distance.0),
                    config.smooth_scroll_end,
                )
            })
        })
        .flatten() else {
            return;
        };

        race(session.ended().wait(), session.exclusive_access().wait()).await;
        if !session.try_claim() {
            return;
        }

        let distance = if positive { distance } else { -distance };
        log::debug!("wheel scrolls {axis:?} by {distance}");
        Self::with(this, |inner| match smooth {
            None => {
                inner.stop_scroll_momentum();
                inner.move_content(axis, inner.content_axis(axis) + distance, true);
            }
            Some(smooth) => inner.add_velocity(axis, distance * smooth),
        });
    }

    async fn handle_bar_drag(this: &Weak<Self>, session: &Rc<TouchSession>, axis: Axis) {
        if session.exclusive_access().is_fired() || !session.try_claim() {
            return;
        }
        let Some(ratio) = Self::with(this, |inner| {
            inner.stop_scroll_momentum();
            match axis {
                Axis::X => inner.hbar.get().ratio,
                Axis::Y => inner.vbar.get().ratio,
            }
        }) else {
            return;
        };
        // A thumb that cannot move maps to no content movement.
        let bar_to_content = if ratio == 0.0 { 0.0 } else { 1.0 / ratio };
        let moves = session.moves();
        move_on_when(session.ended().wait(), async {
            loop {
                let motion = moves.next().await;
                let delta = axis.of(Point::new(motion.dx, motion.dy)) * bar_to_content;
                Self::with(this, |inner| {
                    inner.move_content(axis, inner.content_axis(axis) + delta, true);
                });
            }
        })
        .await;
        Self::with(this, |inner| inner.activate(axis));
    }

    /// Decides whether a touch scrolls the content or is left to the
    /// children, then follows it and flings on release.
    async fn handle_potential_scroll(this: &Weak<Self>, session: &Rc<TouchSession>) {
        let Some((scroll_distance, scroll_timeout, runtime)) = Self::with(this, |inner| {
            let config = inner.config.borrow();
            (
                inner.window.dp(config.scroll_distance.0),
                config.scroll_timeout,
                inner.window.runtime().clone(),
            )
        }) else {
            return;
        };
        let mut history = TouchHistory::new(VELOCITY_HISTORY_LEN);
        history.push(session.time_start(), 0.0, 0.0);
        let moves = session.moves();
        let mut travelled = Point::ZERO;

        let confirmed = move_on_when(
            race3(
                session.exclusive_access().wait(),
                session.ended().wait(),
                sleep(&runtime, scroll_timeout),
            ),
            async {
                loop {
                    let motion = moves.next().await;
                    travelled.x += motion.dx;
                    travelled.y += motion.dy;
                    history.push(motion.time, motion.dx, motion.dy);
                    let wants = Self::with(this, |inner| inner.wants_gesture(travelled, scroll_distance));
                    if wants.unwrap_or(false) {
                        break;
                    }
                }
            },
        )
        .await;
        if confirmed.is_none() || !session.try_claim() {
            return;
        }

        log::debug!("touch {} scrolls the content", session.id());
        Self::with(this, |inner| {
            inner.stop_scroll_momentum();
            for axis in [Axis::Y, Axis::X] {
                if inner.config.borrow().do_scroll(axis) {
                    inner.move_content(axis, inner.content_axis(axis) + axis.of(travelled), true);
                }
            }
        });

        move_on_when(session.ended().wait(), async {
            loop {
                let motion = moves.next().await;
                history.push(motion.time, motion.dx, motion.dy);
                Self::with(this, |inner| {
                    let delta = Point::new(motion.dx, motion.dy);
                    for axis in [Axis::Y, Axis::X] {
                        if inner.config.borrow().do_scroll(axis) {
                            inner.move_content(axis, inner.content_axis(axis) + axis.of(delta), true);
                        }
                    }
                });
            }
        })
        .await;
        history.push(session.time_end().unwrap_or(session.time_update()), 0.0, 0.0);

        let (velocity_x, velocity_y) = compute_velocity(&history, VELOCITY_WINDOW);
        log::debug!("scroll released with velocity ({velocity_x:.1}, {velocity_y:.1})");
        Self::with(this, |inner| {
            for (axis, velocity) in [(Axis::Y, velocity_y), (Axis::X, velocity_x)] {
                if inner.config.borrow().do_scroll(axis) {
                    inner.set_velocity(axis, velocity);
                }
            }
        });
    }

    /// Whether the distance travelled so far makes the touch a scroll.
    ///
    /// The vertical axis is checked first; once it has travelled far enough
    /// the horizontal axis is not considered.
    fn wants_gesture(&self, travelled: Point, scroll_distance: f32) -> bool {
        let config = self.config.borrow();
        let bounds = self.bounds.get();
        let axis = if config.do_scroll_y && travelled.y.abs() > scroll_distance {
            Axis::Y
        } else if config.do_scroll_x && travelled.x.abs() > scroll_distance {
            Axis::X
        } else {
            return false;
        };
        if config.do_overscroll(axis) {
            return true;
        }
        let pos = self.content_axis(axis);
        let delta = axis.of(travelled);
        (delta > 0.0 && pos < axis.of(bounds.max)) || (delta < 0.0 && pos > axis.of(bounds.min))
    }

    fn with<R>(this: &Weak<Self>, f: impl FnOnce(&Self) -> R) -> Option<R> {
        this.upgrade().map(|inner| f(&inner))
    }
}
