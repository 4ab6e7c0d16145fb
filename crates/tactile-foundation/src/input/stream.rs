use super::session::TouchSession;
use super::types::TouchMotion;
use super::window::WindowInner;
use crate::widget::WidgetId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use tactile_core::{ExclusiveEvent, ExclusiveWait};
use tactile_ui_graphics::Point;

/// A touch as seen by one listener.
///
/// `opos` and `pos` are in the space the listener widget's `pos` lives in
/// at the moment of dispatch; later moves are reported in window
/// coordinates through the session.
#[derive(Clone)]
pub struct TouchRef {
    pub session: Rc<TouchSession>,
    pub opos: Point,
    pub pos: Point,
}

impl TouchRef {
    /// A reference whose positions are in window coordinates.
    pub fn window(session: &Rc<TouchSession>) -> Self {
        Self {
            opos: session.opos(),
            pos: session.pos(),
            session: Rc::clone(session),
        }
    }
}

pub(crate) struct MoveQueue {
    events: RefCell<VecDeque<TouchMotion>>,
    waiting: RefCell<Option<Waker>>,
}

impl MoveQueue {
    pub(crate) fn push(&self, motion: TouchMotion) {
        self.events.borrow_mut().push_back(motion);
        let waker = self.waiting.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn poll_motion(&self, cx: &mut Context<'_>) -> Poll<TouchMotion> {
        if let Some(motion) = self.events.borrow_mut().pop_front() {
            Poll::Ready(motion)
        } else {
            self.waiting.replace(Some(cx.waker().clone()));
            Poll::Pending
        }
    }
}

/// Buffered moves of one touch, in window coordinates.
///
/// Moves recorded after the stream was created are queued until read.
/// The stream never finishes on its own; race it against the session's
/// end signal.
pub struct TouchMoves {
    queue: Rc<MoveQueue>,
}

impl TouchMoves {
    pub(crate) fn new() -> (Self, Weak<MoveQueue>) {
        let queue = Rc::new(MoveQueue {
            events: RefCell::new(VecDeque::new()),
            waiting: RefCell::new(None),
        });
        let weak = Rc::downgrade(&queue);
        (Self { queue }, weak)
    }

    pub fn next(&self) -> NextMove<'_> {
        NextMove { queue: &self.queue }
    }

    /// Drops moves that were queued but not read yet.
    pub fn clear(&self) {
        self.queue.events.borrow_mut().clear();
    }
}

pub struct NextMove<'a> {
    queue: &'a MoveQueue,
}

impl Future for NextMove<'_> {
    type Output = TouchMotion;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<TouchMotion> {
        self.queue.poll_motion(cx)
    }
}

/// Touch-downs routed to one widget that passed its filter.
///
/// Only delivered while a `next()` is pending: a down arriving while the
/// listener is busy is ignored by that listener.
pub struct TouchDowns {
    pub(crate) window: Weak<WindowInner>,
    pub(crate) id: u64,
    pub(crate) widget: WidgetId,
    pub(crate) event: ExclusiveEvent<TouchRef>,
}

impl TouchDowns {
    pub fn next(&self) -> ExclusiveWait<TouchRef> {
        self.event.wait()
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }
}

impl Drop for TouchDowns {
    fn drop(&mut self) {
        if let Some(window) = self.window.upgrade() {
            window.down_listeners.borrow_mut().shift_remove(&self.id);
        }
    }
}

/// Window-wide moves of any touch that passed the filter.
///
/// Delivered under the same rule as [`TouchDowns`].
pub struct WindowMoves {
    pub(crate) window: Weak<WindowInner>,
    pub(crate) id: u64,
    pub(crate) event: ExclusiveEvent<Rc<TouchSession>>,
}

impl WindowMoves {
    pub fn next(&self) -> ExclusiveWait<Rc<TouchSession>> {
        self.event.wait()
    }
}

impl Drop for WindowMoves {
    fn drop(&mut self) {
        if let Some(window) = self.window.upgrade() {
            window.move_listeners.borrow_mut().shift_remove(&self.id);
        }
    }
}
