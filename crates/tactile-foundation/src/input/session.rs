use super::stream::{MoveQueue, TouchMoves};
use super::types::{MouseButton, TouchId, TouchInput, TouchMotion};
use crate::behaviors::draggable::{DragContext, DropReceiver};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tactile_core::collections::map::HashSet;
use tactile_core::LifoSignal;
use tactile_ui_graphics::Point;

#[derive(Default)]
struct DragSlot {
    class: Option<String>,
    context: Option<Rc<DragContext>>,
    released_on: Option<Rc<dyn DropReceiver>>,
    draggable_index: Option<usize>,
}

/// Per-touch state shared by every behavior that sees the touch.
///
/// Positions are in window coordinates. The session lives from touch-down to
/// touch-up in the window's registry; behaviors may keep an `Rc` past that.
pub struct TouchSession {
    id: TouchId,
    button: Option<MouseButton>,
    opos: Point,
    time_start: f64,
    pos: Cell<Point>,
    delta: Cell<Point>,
    time_update: Cell<f64>,
    time_end: Cell<Option<f64>>,
    exclusive_access: LifoSignal,
    ended: LifoSignal,
    claimed: Cell<bool>,
    drag: RefCell<DragSlot>,
    marks: RefCell<HashSet<u64>>,
    move_subscribers: RefCell<Vec<Weak<MoveQueue>>>,
}

impl TouchSession {
    pub(crate) fn new(input: &TouchInput) -> Self {
        Self {
            id: input.id,
            button: input.button,
            opos: input.pos,
            time_start: input.time,
            pos: Cell::new(input.pos),
            delta: Cell::new(Point::ZERO),
            time_update: Cell::new(input.time),
            time_end: Cell::new(None),
            exclusive_access: LifoSignal::new(),
            ended: LifoSignal::new(),
            claimed: Cell::new(false),
            drag: RefCell::new(DragSlot::default()),
            marks: RefCell::new(HashSet::default()),
            move_subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> TouchId {
        self.id
    }

    pub fn button(&self) -> Option<MouseButton> {
        self.button
    }

    pub fn is_mouse_scrolling(&self) -> bool {
        self.button.map(|button| button.is_wheel()).unwrap_or(false)
    }

    /// Where the touch went down.
    pub fn opos(&self) -> Point {
        self.opos
    }

    pub fn pos(&self) -> Point {
        self.pos.get()
    }

    pub fn dx(&self) -> f32 {
        self.delta.get().x
    }

    pub fn dy(&self) -> f32 {
        self.delta.get().y
    }

    pub fn time_start(&self) -> f64 {
        self.time_start
    }

    pub fn time_update(&self) -> f64 {
        self.time_update.get()
    }

    pub fn time_end(&self) -> Option<f64> {
        self.time_end.get()
    }

    /// Fires when some behavior takes the touch over, and unconditionally at
    /// touch-up after [`TouchSession::ended`].
    pub fn exclusive_access(&self) -> &LifoSignal {
        &self.exclusive_access
    }

    pub fn ended(&self) -> &LifoSignal {
        &self.ended
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_fired()
    }

    /// Whether a behavior won the touch through [`TouchSession::try_claim`].
    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }

    /// Takes the touch over. Only the first caller succeeds.
    pub fn try_claim(&self) -> bool {
        if self.claimed.replace(true) {
            return false;
        }
        log::debug!("touch {} claimed", self.id);
        self.exclusive_access.fire();
        true
    }

    /// Subscribes to the moves recorded from now on.
    pub fn moves(&self) -> TouchMoves {
        let (moves, queue) = TouchMoves::new();
        let mut subscribers = self.move_subscribers.borrow_mut();
        subscribers.retain(|subscriber| subscriber.strong_count() > 0);
        subscribers.push(queue);
        moves
    }

    /// Tags the session so a listener can tell it has already handled it.
    /// Returns `false` when the mark was already present.
    pub fn mark(&self, key: u64) -> bool {
        self.marks.borrow_mut().insert(key)
    }

    pub fn unmark(&self, key: u64) {
        self.marks.borrow_mut().remove(&key);
    }

    pub fn is_marked(&self, key: u64) -> bool {
        self.marks.borrow().contains(&key)
    }

    pub fn drag_class(&self) -> Option<String> {
        self.drag.borrow().class.clone()
    }

    pub fn drag_context(&self) -> Option<Rc<DragContext>> {
        self.drag.borrow().context.clone()
    }

    pub fn released_on(&self) -> Option<Rc<dyn DropReceiver>> {
        self.drag.borrow().released_on.clone()
    }

    /// Records the receiver the dragged widget was released on, unless one
    /// already claimed the release.
    pub fn set_released_on_if_unset(&self, receiver: Rc<dyn DropReceiver>) -> bool {
        let mut drag = self.drag.borrow_mut();
        if drag.released_on.is_some() {
            return false;
        }
        drag.released_on = Some(receiver);
        true
    }

    /// Child index a reorder container reserved for the dragged widget.
    pub fn draggable_index(&self) -> Option<usize> {
        self.drag.borrow().draggable_index
    }

    pub fn set_draggable_index(&self, index: usize) {
        self.drag.borrow_mut().draggable_index = Some(index);
    }

    pub(crate) fn begin_drag(&self, class: String, context: Rc<DragContext>) {
        let mut drag = self.drag.borrow_mut();
        drag.class = Some(class);
        drag.context = Some(context);
    }

    pub(crate) fn clear_drag(&self) {
        let previous = std::mem::take(&mut *self.drag.borrow_mut());
        drop(previous);
    }

    pub(crate) fn record_move(&self, pos: Point, time: f64) -> TouchMotion {
        let previous = self.pos.replace(pos);
        let delta = pos - previous;
        self.delta.set(delta);
        self.time_update.set(time);
        let motion = TouchMotion {
            pos,
            dx: delta.x,
            dy: delta.y,
            time,
        };
        let subscribers: Vec<Rc<MoveQueue>> = self
            .move_subscribers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for subscriber in subscribers {
            subscriber.push(motion);
        }
        motion
    }

    pub(crate) fn record_up(&self, pos: Point, time: f64) {
        let previous = self.pos.replace(pos);
        self.delta.set(pos - previous);
        self.time_update.set(time);
        self.time_end.set(Some(time));
    }
}

impl fmt::Debug for TouchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchSession")
            .field("id", &self.id)
            .field("opos", &self.opos)
            .field("pos", &self.pos.get())
            .field("claimed", &self.claimed.get())
            .field("ended", &self.ended.is_fired())
            .finish()
    }
}
