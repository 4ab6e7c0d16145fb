use super::draggable::{DragContext, DropReceiver};
use super::drop_target::release_into;
use super::restart_on_change;
use crate::gesture_constants::SPACER_MIN_SIZE_DP;
use crate::input::{TouchSession, Window};
use crate::touch_filters::is_opos_colliding_and_not_wheel;
use crate::widget::{
    restore_widget_state, Observation, Placement, SizeHint, WidgetId, WidgetProperty, WidgetTree,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tactile_core::select::pending;
use tactile_core::{move_on_when, Supervisor, TaskGroup, Trigger};
use tactile_ui_graphics::{Point, Rect};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReorderConfig {
    pub drag_classes: Vec<String>,
    /// Placeholders shown where a dragged widget would land. Their number
    /// caps how many drags the container handles at once. `None` uses one
    /// plain spacer.
    pub spacer_widgets: Option<Vec<WidgetId>>,
}

impl ReorderConfig {
    fn accepts(&self, class: Option<&str>) -> bool {
        class.is_some_and(|class| self.drag_classes.iter().any(|accepted| accepted == class))
    }
}

pub trait ReorderListener {
    /// Called when a drag ended inside `container`. The default inserts the
    /// draggable where the spacer was.
    fn on_drag_release(
        &self,
        window: &Window,
        container: WidgetId,
        session: &TouchSession,
        ctx: &DragContext,
    ) -> bool {
        match session.draggable_index() {
            Some(index) => release_into(window.tree(), container, ctx, index),
            None => false,
        }
    }
}

struct DefaultReorderListener;

impl ReorderListener for DefaultReorderListener {}

/// A container whose children can be reordered by dragging.
///
/// While a drag of a matching class hovers over it, a spacer sits at the
/// index under the touch and follows it around.
pub struct ReorderContainer {
    inner: Rc<ReorderInner>,
}

struct ReorderInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<ReorderConfig>,
    listener: RefCell<Rc<dyn ReorderListener>>,
    supervisor: Supervisor,
    mark_key: u64,
    default_spacer: WidgetId,
    idle_spacers: Rc<RefCell<Vec<WidgetId>>>,
    trigger: Trigger,
    _observation: Observation,
}

impl ReorderContainer {
    pub fn attach(window: &Window, widget: WidgetId, config: ReorderConfig) -> Self {
        let tree = window.tree();
        let default_spacer = tree.create_widget(Rect::new(0.0, 0.0, 100.0, 100.0));
        let min = window.dp(SPACER_MIN_SIZE_DP);
        let _ = tree.set_size_hint(default_spacer, SizeHint::default().with_min(Some(min), Some(min)));
        let inner = Rc::new_cyclic(|weak: &Weak<ReorderInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    ReorderInner::reset(&inner);
                }
            });
            let observation = restart_on_change(tree, widget, &[WidgetProperty::Disabled], &trigger);
            ReorderInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                listener: RefCell::new(Rc::new(DefaultReorderListener)),
                supervisor: Supervisor::new(window.runtime().clone()),
                mark_key: window.next_mark_key(),
                default_spacer,
                idle_spacers: Rc::new(RefCell::new(Vec::new())),
                trigger,
                _observation: observation,
            }
        });
        ReorderInner::reset(&inner);
        Self { inner }
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> ReorderConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: ReorderConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    pub fn set_listener(&self, listener: Rc<dyn ReorderListener>) {
        *self.inner.listener.borrow_mut() = listener;
    }

    /// Spacers not currently placed under a drag.
    pub fn idle_spacer_count(&self) -> usize {
        self.inner.idle_spacers.borrow().len()
    }

    /// The top-most child under `(x, y)`, given in the container's local
    /// space, and its index.
    pub fn get_child_under_drag(&self, x: f32, y: f32) -> Option<(WidgetId, usize)> {
        child_under_drag(self.inner.window.tree(), self.inner.widget, x, y)
    }
}

fn child_under_drag(tree: &WidgetTree, container: WidgetId, x: f32, y: f32) -> Option<(WidgetId, usize)> {
    tree.children(container)
        .into_iter()
        .enumerate()
        .find(|(_, child)| tree.collide_point(*child, Point::new(x, y)))
        .map(|(index, child)| (child, index))
}

/// Takes a spacer out of the container and back into the pool.
struct SpacerGuard {
    tree: WidgetTree,
    container: WidgetId,
    spacer: WidgetId,
    idle_spacers: Rc<RefCell<Vec<WidgetId>>>,
    session: Rc<TouchSession>,
    mark_key: u64,
}

impl Drop for SpacerGuard {
    fn drop(&mut self) {
        self.session.unmark(self.mark_key);
        self.tree.remove_widget(self.container, self.spacer);
        self.idle_spacers.borrow_mut().push(self.spacer);
    }
}

impl ReorderInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        if this.window.tree().is_disabled(this.widget) {
            return;
        }
        let spacers = this
            .config
            .borrow()
            .spacer_widgets
            .clone()
            .unwrap_or_else(|| vec![this.default_spacer]);
        *this.idle_spacers.borrow_mut() = spacers;
        this.supervisor.restart(Self::run(Rc::downgrade(this)));
    }

    async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        group.start(Self::listen_for_touch_downs(this.clone()));
        group.start(Self::listen_for_touch_moves(this));
        pending::<()>().await;
    }

    /// Drags picked up from inside the container start with a spacer.
    async fn listen_for_touch_downs(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let downs = inner
            .window
            .touch_downs(inner.widget, Rc::new(is_opos_colliding_and_not_wheel));
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        loop {
            let touch = downs.next().await;
            group.start(Self::watch_touch_down(this.clone(), touch.session));
        }
    }

    async fn watch_touch_down(this: Weak<Self>, session: Rc<TouchSession>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let key = inner.mark_key;
        let config = inner.config.borrow().clone();
        drop(inner);
        session.mark(key);
        session.exclusive_access().wait().await;
        if !config.accepts(session.drag_class().as_deref()) {
            return;
        }
        let (Some(ctx), Some(inner)) = (session.drag_context(), this.upgrade()) else {
            return;
        };
        let tree = inner.window.tree().clone();
        let widget = inner.widget;
        let has_idle_spacer = !inner.idle_spacers.borrow().is_empty();
        drop(inner);
        let origin = tree.to_parent_space(widget, ctx.start_from);
        if !has_idle_spacer || !tree.collide_point(widget, origin) {
            session.unmark(key);
            return;
        }
        // The draggable may already have left the container by now.
        let index = match ctx.original_state.placement {
            Some(Placement::Child { parent, index }) if parent == widget => index,
            _ => {
                let local = tree.to_local(widget, origin);
                child_under_drag(&tree, widget, local.x, local.y)
                    .map(|(_, index)| index)
                    .unwrap_or(0)
            }
        };
        Self::place_spacer(this, session, index).await;
    }

    /// Drags entering from elsewhere get a spacer at the top.
    async fn listen_for_touch_moves(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let key = inner.mark_key;
        let widget = inner.widget;
        let tree = inner.window.tree().clone();
        let idle_spacers = Rc::clone(&inner.idle_spacers);
        let moves = inner.window.touch_moves(move |session| {
            !session.is_marked(key)
                && !idle_spacers.borrow().is_empty()
                && tree.is_visible_at(widget, session.pos())
        });
        let config = inner.config.borrow().clone();
        let group = TaskGroup::new(inner.window.runtime());
        drop(inner);
        loop {
            let session = moves.next().await;
            session.mark(key);
            if config.accepts(session.drag_class().as_deref()) {
                group.start(Self::place_spacer(this.clone(), session, 0));
            }
        }
    }

    async fn place_spacer(this: Weak<Self>, session: Rc<TouchSession>, index: usize) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let key = inner.mark_key;
        let tree = inner.window.tree().clone();
        let widget = inner.widget;
        let idle_spacers = Rc::clone(&inner.idle_spacers);
        drop(inner);
        let popped = idle_spacers.borrow_mut().pop();
        let (Some(ctx), Some(spacer)) = (session.drag_context(), popped) else {
            session.unmark(key);
            return;
        };
        let _guard = SpacerGuard {
            tree: tree.clone(),
            container: widget,
            spacer,
            idle_spacers,
            session: Rc::clone(&session),
            mark_key: key,
        };

        if let Err(err) = restore_widget_state(&tree, spacer, &ctx.original_state, true) {
            log::warn!("could not size spacer {spacer}: {err}");
        }
        if let Err(err) = tree.add_widget(widget, spacer, index) {
            log::warn!("could not place spacer {spacer} in {widget}: {err}");
            return;
        }

        move_on_when(ctx.cancelled().wait(), async {
            let moves = session.moves();
            let left = move_on_when(session.ended().wait(), async {
                loop {
                    moves.next().await;
                    let pos = session.pos();
                    if !tree.is_visible_at(widget, pos) {
                        return;
                    }
                    let local = tree.to_widget(widget, pos);
                    let index = match child_under_drag(&tree, widget, local.x, local.y) {
                        Some((child, _)) if child == spacer => continue,
                        Some((_, index)) => index,
                        None if tree.child_count(widget) > 0 => continue,
                        None => 0,
                    };
                    log::trace!("spacer {spacer} moves to index {index}");
                    tree.remove_widget(widget, spacer);
                    let _ = tree.add_widget(widget, spacer, index);
                }
            })
            .await;
            if left.is_some() {
                return;
            }
            let Some(inner) = this.upgrade() else {
                return;
            };
            if session.set_released_on_if_unset(inner) {
                if let Some(index) = tree.index_of(spacer) {
                    session.set_draggable_index(index);
                }
                log::debug!("drag of {} released into {widget}", ctx.draggable);
            }
        })
        .await;
    }
}

impl DropReceiver for ReorderInner {
    fn widget(&self) -> WidgetId {
        self.widget
    }

    fn accept_release(&self, session: &TouchSession, ctx: &DragContext) -> bool {
        let listener = Rc::clone(&*self.listener.borrow());
        listener.on_drag_release(&self.window, self.widget, session, ctx)
    }
}
