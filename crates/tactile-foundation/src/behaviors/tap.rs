use super::restart_on_change;
use crate::input::{TouchSession, Window};
use crate::notify::{HandlerId, Notifier};
use crate::touch_filters::{default_filter, TouchFilter};
use crate::widget::{Observation, WidgetId, WidgetProperty};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tactile_core::{Supervisor, Trigger};

#[derive(Clone)]
pub struct TapConfig {
    /// A touch-down failing this filter is never considered a tap.
    pub filter: TouchFilter,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Recognizes a press and release on the same widget that nobody else
/// claimed in between.
///
/// The widget becomes touch-opaque: touches landing on it do not reach the
/// widgets underneath. A widget without a parent, or a disabled one, does
/// not listen at all.
pub struct TapRecognizer {
    inner: Rc<TapInner>,
}

struct TapInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<TapConfig>,
    supervisor: Supervisor,
    on_tap: Notifier<TouchSession>,
    trigger: Trigger,
    _observation: Observation,
}

impl TapRecognizer {
    pub fn attach(window: &Window, widget: WidgetId, config: TapConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<TapInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    TapInner::reset(&inner);
                }
            });
            let observation = restart_on_change(
                window.tree(),
                widget,
                &[WidgetProperty::Disabled, WidgetProperty::Parent],
                &trigger,
            );
            TapInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                supervisor: Supervisor::new(window.runtime().clone()),
                on_tap: Notifier::new(),
                trigger,
                _observation: observation,
            }
        });
        // Touches colliding with a tap recognizer stop here.
        let _ = window.tree().set_touch_opaque(widget, true);
        TapInner::reset(&inner);
        Self { inner }
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> TapConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: TapConfig) {
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
    }

    /// Called once per recognized tap with the touch that caused it.
    pub fn on_tap(&self, handler: impl Fn(&TouchSession) + 'static) -> HandlerId {
        self.inner.on_tap.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) {
        self.inner.on_tap.disconnect(id);
    }

    pub fn is_listening(&self) -> bool {
        self.inner.supervisor.is_running()
    }
}

impl TapInner {
    fn reset(this: &Rc<Self>) {
        this.supervisor.cancel();
        let tree = this.window.tree();
        if tree.parent(this.widget).is_none() || tree.is_disabled(this.widget) {
            return;
        }
        this.supervisor.restart(Self::run(Rc::downgrade(this)));
    }

    async fn run(this: Weak<Self>) {
        let Some(inner) = this.upgrade() else {
            return;
        };
        let widget = inner.widget;
        let tree = inner.window.tree().clone();
        let filter = inner.config.borrow().filter.clone();
        let downs = inner.window.touch_downs(widget, filter);
        drop(inner);
        loop {
            let touch = downs.next().await;
            let session = touch.session;
            session.exclusive_access().wait().await;
            if !session.is_ended() || !session.try_claim() {
                continue;
            }
            // The session reports window coordinates once it has ended.
            let pos = tree.to_parent_space(widget, session.pos());
            if tree.collide_point(widget, pos) {
                log::debug!("tap on {widget} by touch {}", session.id());
                if let Some(inner) = this.upgrade() {
                    inner.on_tap.emit(&session);
                }
            }
        }
    }
}
