use super::session::TouchSession;
use super::stream::{TouchDowns, TouchRef, WindowMoves};
use super::types::{TouchId, TouchInput};
use crate::touch_filters::TouchFilter;
use crate::widget::{WidgetId, WidgetTree};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tactile_core::{ExclusiveEvent, RuntimeHandle};
use tactile_ui_graphics::{Density, Point, Size};

pub(crate) struct DownListener {
    widget: WidgetId,
    filter: TouchFilter,
    event: ExclusiveEvent<TouchRef>,
}

pub(crate) struct MoveListener {
    filter: Rc<dyn Fn(&Rc<TouchSession>) -> bool>,
    event: ExclusiveEvent<Rc<TouchSession>>,
}

pub(crate) struct WindowInner {
    tree: WidgetTree,
    runtime: RuntimeHandle,
    density: Cell<Density>,
    sessions: RefCell<IndexMap<TouchId, Rc<TouchSession>>>,
    pub(crate) down_listeners: RefCell<IndexMap<u64, DownListener>>,
    pub(crate) move_listeners: RefCell<IndexMap<u64, MoveListener>>,
    dragging: RefCell<Vec<WidgetId>>,
    next_listener: Cell<u64>,
    next_mark: Cell<u64>,
}

/// The input-dispatch boundary between the host and the behaviors.
///
/// The host reports pointer events in window coordinates; the window keeps
/// one [`TouchSession`] per active touch and routes touch-downs through the
/// widget tree. Cloning shares the same window.
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

impl Window {
    pub fn new(runtime: RuntimeHandle, size: Size) -> Self {
        Self::with_tree(runtime, WidgetTree::new(), size)
    }

    pub fn with_tree(runtime: RuntimeHandle, tree: WidgetTree, size: Size) -> Self {
        // The root is freshly created, so this cannot fail.
        let _ = tree.set_size(tree.root(), size);
        Self {
            inner: Rc::new(WindowInner {
                tree,
                runtime,
                density: Cell::new(Density::default()),
                sessions: RefCell::new(IndexMap::new()),
                down_listeners: RefCell::new(IndexMap::new()),
                move_listeners: RefCell::new(IndexMap::new()),
                dragging: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                next_mark: Cell::new(1),
            }),
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.inner.tree
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.inner.runtime
    }

    pub fn root(&self) -> WidgetId {
        self.inner.tree.root()
    }

    pub fn size(&self) -> Size {
        self.inner.tree.size(self.root())
    }

    pub fn set_size(&self, size: Size) {
        let _ = self.inner.tree.set_size(self.root(), size);
    }

    pub fn density(&self) -> Density {
        self.inner.density.get()
    }

    pub fn set_density(&self, density: Density) {
        self.inner.density.set(density);
    }

    pub fn dp(&self, value: f32) -> f32 {
        self.density().dp(value)
    }

    pub fn sp(&self, value: f32) -> f32 {
        self.density().sp(value)
    }

    /// Adds `widget` on top of everything else.
    pub fn add_widget(&self, widget: WidgetId) -> Result<(), crate::ConfigError> {
        self.inner.tree.add_widget(self.root(), widget, 0)
    }

    pub fn session(&self, id: TouchId) -> Option<Rc<TouchSession>> {
        self.inner.sessions.borrow().get(&id).cloned()
    }

    pub fn active_sessions(&self) -> Vec<Rc<TouchSession>> {
        self.inner.sessions.borrow().values().cloned().collect()
    }

    /// A key for [`TouchSession::mark`] unique to this window.
    pub fn next_mark_key(&self) -> u64 {
        let key = self.inner.next_mark.get();
        self.inner.next_mark.set(key + 1);
        key
    }

    fn next_listener_id(&self) -> u64 {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        id
    }

    /// Listens for touch-downs routed to `widget` that pass `filter`.
    pub fn touch_downs(&self, widget: WidgetId, filter: TouchFilter) -> TouchDowns {
        let id = self.next_listener_id();
        let event = ExclusiveEvent::new();
        self.inner.down_listeners.borrow_mut().insert(
            id,
            DownListener {
                widget,
                filter,
                event: event.clone(),
            },
        );
        TouchDowns {
            window: Rc::downgrade(&self.inner),
            id,
            widget,
            event,
        }
    }

    /// Listens for moves of any touch that pass `filter`.
    pub fn touch_moves(&self, filter: impl Fn(&Rc<TouchSession>) -> bool + 'static) -> WindowMoves {
        let id = self.next_listener_id();
        let event = ExclusiveEvent::new();
        self.inner.move_listeners.borrow_mut().insert(
            id,
            MoveListener {
                filter: Rc::new(filter),
                event: event.clone(),
            },
        );
        WindowMoves {
            window: Rc::downgrade(&self.inner),
            id,
            event,
        }
    }

    pub fn touch_down(&self, input: TouchInput) -> Rc<TouchSession> {
        if let Some(existing) = self.session(input.id) {
            log::warn!("touch {} is already down; ignoring the repeated touch-down", input.id);
            return existing;
        }
        let session = Rc::new(TouchSession::new(&input));
        self.inner
            .sessions
            .borrow_mut()
            .insert(input.id, Rc::clone(&session));
        log::trace!("touch {} down at {:?}", input.id, input.pos);
        self.route_down(self.root(), &session, input.pos);
        session
    }

    pub fn touch_move(&self, input: TouchInput) {
        let Some(session) = self.session(input.id) else {
            log::warn!("move for unknown touch {}", input.id);
            return;
        };
        session.record_move(input.pos, input.time);
        let listeners: Vec<_> = self
            .inner
            .move_listeners
            .borrow()
            .values()
            .filter(|listener| listener.event.is_waiting())
            .map(|listener| (Rc::clone(&listener.filter), listener.event.clone()))
            .collect();
        for (filter, event) in listeners {
            if event.is_waiting() && filter(&session) {
                event.fire(Rc::clone(&session));
            }
        }
    }

    pub fn touch_up(&self, input: TouchInput) {
        let Some(session) = self.session(input.id) else {
            log::warn!("touch-up for unknown touch {}", input.id);
            return;
        };
        session.record_up(input.pos, input.time);
        log::trace!("touch {} up at {:?}", input.id, input.pos);
        session.ended().fire();
        session.exclusive_access().fire();
        self.inner.sessions.borrow_mut().shift_remove(&input.id);
    }

    /// Routes a touch-down to `widget`, `point` being in the space its `pos`
    /// lives in. Returns `true` when the touch was consumed.
    fn route_down(&self, widget: WidgetId, session: &Rc<TouchSession>, point: Point) -> bool {
        self.deliver_down(widget, session, point);
        let tree = &self.inner.tree;
        let collides = widget == self.root() || tree.collide_point(widget, point);
        if collides && (tree.is_disabled(widget) || tree.is_touch_opaque(widget)) {
            return true;
        }
        let clips = tree.clips(widget);
        if clips && !collides {
            return false;
        }
        let local = tree.to_local(widget, point);
        for child in tree.children(widget) {
            if self.route_down(child, session, local) {
                return true;
            }
        }
        clips && collides
    }

    fn deliver_down(&self, widget: WidgetId, session: &Rc<TouchSession>, point: Point) {
        let listeners: Vec<_> = self
            .inner
            .down_listeners
            .borrow()
            .values()
            .filter(|listener| listener.widget == widget && listener.event.is_waiting())
            .map(|listener| (Rc::clone(&listener.filter), listener.event.clone()))
            .collect();
        for (filter, event) in listeners {
            let touch = TouchRef {
                session: Rc::clone(session),
                opos: point,
                pos: point,
            };
            if event.is_waiting() && filter(&self.inner.tree, widget, &touch) {
                event.fire(touch);
            }
        }
    }

    pub(crate) fn set_dragging(&self, widget: WidgetId, dragging: bool) {
        let mut list = self.inner.dragging.borrow_mut();
        list.retain(|id| *id != widget);
        if dragging {
            list.push(widget);
        }
    }
}

/// Widgets currently being dragged in `window`, in the order the drags began.
pub fn ongoing_drags(window: &Window) -> Vec<WidgetId> {
    window.inner.dragging.borrow().clone()
}
