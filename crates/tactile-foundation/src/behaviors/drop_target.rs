use super::draggable::{DragContext, DropReceiver};
use super::restart_on_change;
use crate::error::ConfigError;
use crate::input::{TouchSession, Window};
use crate::widget::{Observation, WidgetId, WidgetProperty, WidgetTree};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tactile_core::{move_on_when, Supervisor, TaskGroup, Trigger};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropTargetConfig {
    /// Drag classes this target reacts to.
    pub drag_classes: Vec<String>,
}

impl DropTargetConfig {
    pub fn accepts(&self, class: Option<&str>) -> bool {
        class.is_some_and(|class| self.drag_classes.iter().any(|accepted| accepted == class))
    }
}

pub trait DropTargetListener {
    fn on_drag_enter(&self, _session: &TouchSession, _ctx: &DragContext) {}

    fn on_drag_leave(&self, _session: &TouchSession, _ctx: &DragContext) {}

    /// Called when a drag ended over `target`. Returning `false` fails the
    /// drag. The default moves the draggable into `target`.
    fn on_drag_release(
        &self,
        window: &Window,
        target: WidgetId,
        _session: &TouchSession,
        ctx: &DragContext,
    ) -> bool {
        release_into(window.tree(), target, ctx, 0)
    }
}

struct DefaultDropListener;

impl DropTargetListener for DefaultDropListener {}

/// Moves the dragged widget under `target` at `index`, giving back the size
/// hints and pos hint it had before the drag.
pub fn release_into(tree: &WidgetTree, target: WidgetId, ctx: &DragContext, index: usize) -> bool {
    match place_draggable(tree, target, ctx, index) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("could not release {} into {target}: {err}", ctx.draggable);
            false
        }
    }
}

fn place_draggable(
    tree: &WidgetTree,
    target: WidgetId,
    ctx: &DragContext,
    index: usize,
) -> Result<(), ConfigError> {
    let draggable = ctx.draggable;
    let original = &ctx.original_state;
    tree.detach(draggable);
    let mut size_hint = tree.size_hint(draggable);
    size_hint.x = original.size_hint.x;
    size_hint.y = original.size_hint.y;
    tree.set_size_hint(draggable, size_hint)?;
    tree.set_pos_hint(draggable, original.pos_hint)?;
    tree.add_widget(target, draggable, index)
}

/// A zone dragged widgets of matching classes can be released on.
///
/// Tracks the touch with window-wide moves and its own visibility test, so
/// a target that is only partly visible (inside a scrollview, for instance)
/// only counts the visible part.
pub struct DropTarget {
    inner: Rc<DropTargetInner>,
}

struct DropTargetInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<DropTargetConfig>,
    listener: RefCell<Rc<dyn DropTargetListener>>,
    supervisor: Supervisor,
    mark_key: u64,
    trigger: Trigger,
    _observation: Observation,
}

impl DropTarget {
    pub fn attach(window: &Window, widget: WidgetId, config: DropTargetConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<DropTargetInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    DropTargetInner::reset(&inner);
                }
            });
            let observation =
                restart_on_change(window.tree(), widget, &[WidgetProperty::Disabled], &trigger);
            DropTargetInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                listener: RefCell::new(Rc::new(DefaultDropListener)),
                supervisor: Supervisor::new(window.runtime().clone()),
                mark_key: window.next_mark_key(),
                trigger,
                _observation: observation,
            }
        });
        DropTargetInner::reset(&inner);
        Self { inner }
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> DropTargetConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: DropTargetConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    pub fn set_listener(&self, listener: Rc<dyn DropTargetListener>) {
        *self.inner.listener.borrow_mut() = listener;
    }
}

/// Sends the final leave when a hover ends while still inside.
struct HoverGuard {
    listener: Rc<dyn DropTargetListener>,
    session: Rc<TouchSession>,
    ctx: Rc<DragContext>,
    inside: Cell<bool>,
}

impl Drop for HoverGuard {
    fn drop(&mut self) {
        if self.inside.get() {
            self.listener.on_drag_leave(&self.session, &self.ctx);
        }
    }
}

impl DropTargetInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        if this.window.tree().is_disabled(this.widget) {
            return;
        }
        this.supervisor.restart(Self::run(Rc::downgrade(this)));
    }

    async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let key = inner.mark_key;
        let widget = inner.widget;
        let tree = inner.window.tree().clone();
        let moves = inner.window.touch_moves(move |session| {
            !session.is_marked(key) && tree.is_visible_at(widget, session.pos())
        });
        let config = inner.config.borrow().clone();
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        loop {
            let session = moves.next().await;
            session.mark(key);
            if config.accepts(session.drag_class().as_deref()) {
                group.start(Self::track_hover(this.clone(), session));
            }
        }
    }

    async fn track_hover(this: Weak<Self>, session: Rc<TouchSession>) {
        let Some(ctx) = session.drag_context() else {
            return;
        };
        let Some(inner) = this.upgrade() else {
            return;
        };
        let tree = inner.window.tree().clone();
        let widget = inner.widget;
        let listener = Rc::clone(&*inner.listener.borrow());
        drop(inner);

        let guard = HoverGuard {
            listener: Rc::clone(&listener),
            session: Rc::clone(&session),
            ctx: Rc::clone(&ctx),
            inside: Cell::new(true),
        };
        move_on_when(ctx.cancelled().wait(), async {
            listener.on_drag_enter(&session, &ctx);
            let moves = session.moves();
            move_on_when(session.ended().wait(), async {
                loop {
                    moves.next().await;
                    let inside = tree.is_visible_at(widget, session.pos());
                    if inside == guard.inside.get() {
                        continue;
                    }
                    guard.inside.set(inside);
                    if inside {
                        listener.on_drag_enter(&session, &ctx);
                    } else {
                        listener.on_drag_leave(&session, &ctx);
                    }
                }
            })
            .await;
            if guard.inside.get() {
                if let Some(inner) = this.upgrade() {
                    if session.set_released_on_if_unset(inner) {
                        log::debug!("drag of {} released on {widget}", ctx.draggable);
                    }
                }
            }
        })
        .await;
    }
}

impl DropReceiver for DropTargetInner {
    fn widget(&self) -> WidgetId {
        self.widget
    }

    fn accept_release(&self, session: &TouchSession, ctx: &DragContext) -> bool {
        let listener = Rc::clone(&*self.listener.borrow());
        listener.on_drag_release(&self.window, self.widget, session, ctx)
    }
}
