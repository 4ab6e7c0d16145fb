use super::restart_on_change;
use crate::gesture_constants::{DRAG_DISTANCE_DP, DRAG_FAIL_ANIMATION, DRAG_TIMEOUT};
use crate::input::{TouchRef, TouchSession, Window};
use crate::touch_filters::{default_filter, TouchFilter};
use crate::widget::{
    restore_widget_state, save_widget_state, Observation, PosHint, WidgetId, WidgetProperty,
    WidgetState, WidgetTree,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use tactile_animation::{tween, Lerp, Transition};
use tactile_core::select::pending;
use tactile_core::{
    move_on_when, race3, sleep, yield_now, Either3, ExclusiveEvent, LifoSignal, Supervisor,
    TaskGroup, Trigger,
};
use tactile_ui_graphics::{Dp, Point};

/// Something a dragged widget can be released on.
pub trait DropReceiver {
    fn widget(&self) -> WidgetId;

    /// Decides what happens to the dragged widget once the drag ended over
    /// this receiver. Returning `false` fails the drag.
    fn accept_release(&self, session: &TouchSession, ctx: &DragContext) -> bool;
}

/// Everything known about one drag. Created each time a drag starts.
pub struct DragContext {
    pub draggable: WidgetId,
    /// Position of the draggable when the drag started, in window coordinates.
    pub original_pos: Point,
    /// Position of the touch when the drag started, in window coordinates.
    pub start_from: Point,
    /// Sizing and placement of the draggable before it was lifted.
    pub original_state: WidgetState,
    released_on: RefCell<Option<Rc<dyn DropReceiver>>>,
    cancelled: LifoSignal,
}

impl DragContext {
    /// The receiver the drag ended on. Known once the drag is resolved.
    pub fn released_on(&self) -> Option<Rc<dyn DropReceiver>> {
        self.released_on.borrow().clone()
    }

    /// Fires if the drag is cancelled.
    pub fn cancelled(&self) -> &LifoSignal {
        &self.cancelled
    }
}

impl fmt::Debug for DragContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragContext")
            .field("draggable", &self.draggable)
            .field("original_pos", &self.original_pos)
            .field("start_from", &self.start_from)
            .field("released_on", &self.released_on().map(|receiver| receiver.widget()))
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragState {
    Started,
    Succeeded,
    Failed,
    Cancelled,
}

/// Who received the touch passed to [`Draggable::drag_start`].
///
/// Determines the space the touch's `opos` is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragReceiver {
    Window,
    Widget(WidgetId),
}

/// What to do with the draggable after a drag succeeded or failed.
pub enum DragRecovery {
    Keep,
    /// Put the draggable back where it was, without animation.
    Restore,
    /// Slide back to the original position, then restore.
    AnimateBack { duration: f32, transition: Transition },
    Custom(Pin<Box<dyn Future<Output = ()>>>),
}

/// Hooks around a drag. Every method has a default.
pub trait DraggableListener {
    fn on_drag_start(&self, _session: &TouchSession, _ctx: &DragContext) {}

    /// Always called last, however the drag ended.
    fn on_drag_end(&self, _session: &TouchSession, _ctx: &DragContext) {}

    fn on_drag_succeed(&self, _session: &TouchSession, _ctx: &DragContext) -> DragRecovery {
        DragRecovery::Keep
    }

    fn on_drag_fail(&self, _session: &TouchSession, _ctx: &DragContext) -> DragRecovery {
        DragRecovery::AnimateBack {
            duration: DRAG_FAIL_ANIMATION,
            transition: Transition::Linear,
        }
    }

    /// Returns whether the draggable should be restored immediately.
    fn on_drag_cancel(&self, _session: &TouchSession, _ctx: &DragContext) -> bool {
        true
    }
}

struct DefaultDragListener;

impl DraggableListener for DefaultDragListener {}

#[derive(Clone)]
pub struct DraggableConfig {
    /// Tag drop targets match against.
    pub drag_cls: String,
    pub drag_distance: Dp,
    /// Seconds a touch must rest before the drag starts. Zero starts the drag
    /// on touch-down.
    pub drag_timeout: f64,
    /// Disabling cancels an ongoing drag.
    pub drag_enabled: bool,
    pub filter: TouchFilter,
}

impl Default for DraggableConfig {
    fn default() -> Self {
        Self {
            drag_cls: String::new(),
            drag_distance: Dp(DRAG_DISTANCE_DP),
            drag_timeout: DRAG_TIMEOUT,
            drag_enabled: true,
            filter: default_filter(),
        }
    }
}

/// Lets a widget be picked up, moved around under the window, and released
/// on a [`DropReceiver`].
pub struct Draggable {
    inner: Rc<DraggableInner>,
}

struct DraggableInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<DraggableConfig>,
    supervisor: Supervisor,
    state: Rc<Cell<Option<DragState>>>,
    listener: RefCell<Rc<dyn DraggableListener>>,
    start_ev: ExclusiveEvent<(DragReceiver, TouchRef)>,
    cancel_ev: ExclusiveEvent<()>,
    trigger: Trigger,
    _observation: Observation,
}

impl Draggable {
    pub fn attach(window: &Window, widget: WidgetId, config: DraggableConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<DraggableInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    DraggableInner::reset(&inner);
                }
            });
            let observation =
                restart_on_change(window.tree(), widget, &[WidgetProperty::Disabled], &trigger);
            DraggableInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                supervisor: Supervisor::new(window.runtime().clone()),
                state: Rc::new(Cell::new(None)),
                listener: RefCell::new(Rc::new(DefaultDragListener)),
                start_ev: ExclusiveEvent::new(),
                cancel_ev: ExclusiveEvent::new(),
                trigger,
                _observation: observation,
            }
        });
        DraggableInner::reset(&inner);
        Self { inner }
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> DraggableConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: DraggableConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    pub fn set_drag_enabled(&self, enabled: bool) {
        let mut config = self.config();
        if config.drag_enabled != enabled {
            config.drag_enabled = enabled;
            self.set_config(config);
        }
    }

    pub fn set_listener(&self, listener: Rc<dyn DraggableListener>) {
        *self.inner.listener.borrow_mut() = listener;
    }

    pub fn drag_state(&self) -> Option<DragState> {
        self.inner.state.get()
    }

    pub fn is_being_dragged(&self) -> bool {
        self.inner.is_being_dragged()
    }

    /// Starts dragging with `touch`, unless a drag is already in progress.
    ///
    /// The caller is responsible for the draggable's size and position when
    /// it was not laid out yet.
    pub fn drag_start(&self, receiver: DragReceiver, touch: TouchRef) -> bool {
        self.inner.drag_start(receiver, touch)
    }

    /// Cancels the ongoing drag, if any.
    pub fn drag_cancel(&self) {
        self.inner.cancel_ev.fire(());
    }
}

/// Runs the cancel and end hooks however the drag is left.
struct DragGuard {
    window: Window,
    widget: WidgetId,
    session: Rc<TouchSession>,
    ctx: Rc<DragContext>,
    listener: Rc<dyn DraggableListener>,
    state: Rc<Cell<Option<DragState>>>,
    completed: bool,
}

impl Drop for DragGuard {
    fn drop(&mut self) {
        if !self.completed {
            log::debug!("drag of {} cancelled", self.widget);
            if self.listener.on_drag_cancel(&self.session, &self.ctx) {
                restore(self.window.tree(), self.widget, &self.ctx.original_state);
            }
            self.state.set(Some(DragState::Cancelled));
            self.ctx.cancelled.fire();
        }
        self.listener.on_drag_end(&self.session, &self.ctx);
        self.state.set(None);
        self.session.clear_drag();
        self.window.set_dragging(self.widget, false);
    }
}

fn restore(tree: &WidgetTree, widget: WidgetId, state: &WidgetState) {
    if let Err(err) = restore_widget_state(tree, widget, state, false) {
        log::warn!("could not restore {widget} after a drag: {err}");
    }
}

impl DraggableInner {
    fn is_being_dragged(&self) -> bool {
        self.state.get().is_some()
    }

    fn drag_start(&self, receiver: DragReceiver, touch: TouchRef) -> bool {
        let delivered = self.start_ev.fire((receiver, touch));
        if !delivered {
            log::warn!("{} is already being dragged or not listening; drag_start ignored", self.widget);
        }
        delivered
    }

    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        let enabled = this.config.borrow().drag_enabled;
        if this.window.tree().is_disabled(this.widget) || !enabled {
            return;
        }
        this.supervisor.restart(Self::run(Rc::downgrade(this)));
    }

    async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        group.start(Self::listen_for_touch_downs(this.clone()));
        group.start(Self::listen_for_drag_requests(this));
        pending::<()>().await;
    }

    async fn listen_for_touch_downs(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let config = inner.config.borrow().clone();
        let downs = inner.window.touch_downs(inner.widget, config.filter.clone());
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        loop {
            let touch = downs.next().await;
            let Some(inner) = this.upgrade() else {
                return;
            };
            if inner.is_being_dragged() || touch.session.exclusive_access().is_fired() {
                continue;
            }
            if config.drag_timeout > 0.0 {
                group.start(Self::watch_for_long_press(this.clone(), touch));
            } else {
                inner.drag_start(DragReceiver::Widget(inner.widget), touch);
            }
        }
    }

    /// Confirms a drag once the touch has rested for `drag_timeout` without
    /// being claimed. Travelling beyond `drag_distance` first gives up.
    async fn watch_for_long_press(this: Weak<Self>, touch: TouchRef) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let tree = inner.window.tree().clone();
        let runtime = inner.window.runtime().clone();
        let config = inner.config.borrow().clone();
        let distance = inner.window.dp(config.drag_distance.0);
        let origin = tree.to_window(inner.widget, touch.opos);
        drop(inner);
        let session = touch.session;
        let moves = session.moves();
        let outcome = race3(
            session.exclusive_access().wait(),
            sleep(&runtime, config.drag_timeout),
            async {
                loop {
                    let motion = moves.next().await;
                    if (motion.pos.x - origin.x).abs() > distance
                        || (motion.pos.y - origin.y).abs() > distance
                    {
                        break;
                    }
                }
            },
        )
        .await;
        if let Either3::Second(()) = outcome {
            if let Some(inner) = this.upgrade() {
                inner.drag_start(DragReceiver::Window, TouchRef::window(&session));
            }
        }
    }

    async fn listen_for_drag_requests(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let start_ev = inner.start_ev.clone();
        let cancel_ev = inner.cancel_ev.clone();
        drop(inner);
        loop {
            move_on_when(cancel_ev.wait(), async {
                loop {
                    let (receiver, touch) = start_ev.wait().await;
                    Self::perform_drag(this.clone(), receiver, touch).await;
                }
            })
            .await;
        }
    }

    async fn perform_drag(this: Weak<Self>, receiver: DragReceiver, touch: TouchRef) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let window = inner.window.clone();
        let tree = window.tree().clone();
        let widget = inner.widget;
        let session = Rc::clone(&touch.session);
        let drag_cls = inner.config.borrow().drag_cls.clone();
        let listener = Rc::clone(&*inner.listener.borrow());
        let state = Rc::clone(&inner.state);
        drop(inner);

        let start_from = match receiver {
            DragReceiver::Window => touch.opos,
            DragReceiver::Widget(receiver) => tree.to_window(receiver, touch.opos),
        };
        let ctx = Rc::new(DragContext {
            draggable: widget,
            original_pos: tree.to_window(widget, tree.pos(widget)),
            start_from,
            original_state: save_widget_state(&tree, widget, false),
            released_on: RefCell::new(None),
            cancelled: LifoSignal::new(),
        });
        let offset = ctx.original_pos - ctx.start_from;

        // Let drop targets see what is being dragged.
        session.begin_drag(drag_cls, Rc::clone(&ctx));
        session.try_claim();
        let mut guard = DragGuard {
            window: window.clone(),
            widget,
            session: Rc::clone(&session),
            ctx: Rc::clone(&ctx),
            listener: Rc::clone(&listener),
            state: Rc::clone(&state),
            completed: false,
        };

        // Lift the draggable above everything else.
        tree.detach(widget);
        let mut size_hint = tree.size_hint(widget);
        size_hint.x = None;
        size_hint.y = None;
        let _ = tree.set_size_hint(widget, size_hint);
        let _ = tree.set_pos_hint(widget, PosHint::default());
        let _ = tree.set_pos(widget, ctx.original_pos);
        let _ = window.add_widget(widget);
        window.set_dragging(widget, true);

        log::debug!("drag of {widget} started by touch {}", session.id());
        listener.on_drag_start(&session, &ctx);
        state.set(Some(DragState::Started));

        let moves = session.moves();
        move_on_when(session.ended().wait(), async {
            loop {
                let motion = moves.next().await;
                let _ = tree.set_pos(widget, motion.pos + offset);
            }
        })
        .await;

        // Drop targets record themselves when the touch ends; let them run first.
        yield_now().await;

        let released_on = session.released_on();
        *ctx.released_on.borrow_mut() = released_on.clone();
        let accepted = match &released_on {
            Some(receiver) => receiver.accept_release(&session, &ctx),
            None => false,
        };
        let recovery = if accepted {
            let recovery = listener.on_drag_succeed(&session, &ctx);
            state.set(Some(DragState::Succeeded));
            recovery
        } else {
            let recovery = listener.on_drag_fail(&session, &ctx);
            state.set(Some(DragState::Failed));
            recovery
        };
        log::debug!("drag of {widget} resolved: {:?}", state.get());
        // Cancelling while the recovery runs still restores the draggable.
        run_recovery(&window, widget, &ctx, recovery).await;
        guard.completed = true;
        drop(guard);
    }
}

async fn run_recovery(window: &Window, widget: WidgetId, ctx: &DragContext, recovery: DragRecovery) {
    let tree = window.tree().clone();
    match recovery {
        DragRecovery::Keep => {}
        DragRecovery::Restore => restore(&tree, widget, &ctx.original_state),
        DragRecovery::AnimateBack {
            duration,
            transition,
        } => {
            let from = tree.pos(widget);
            let to = ctx.original_pos;
            let animated = tree.clone();
            tween(window.runtime(), duration, transition, move |progress| {
                let _ = animated.set_pos(widget, from.lerp(&to, progress));
            })
            .await;
            restore(&tree, widget, &ctx.original_state);
        }
        DragRecovery::Custom(future) => future.await,
    }
}
