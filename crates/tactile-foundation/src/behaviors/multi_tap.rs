use super::restart_on_change;
use crate::error::ConfigError;
use crate::gesture_constants::TAP_MAX_INTERVAL;
use crate::input::{TouchSession, Window};
use crate::notify::{HandlerId, Notifier};
use crate::touch_filters::{default_filter, TouchFilter};
use crate::widget::{Observation, WidgetId, WidgetProperty};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tactile_core::{move_on_when, ResettableTimer, Supervisor, Trigger};

#[derive(Clone)]
pub struct MultiTapConfig {
    /// A sequence ends as soon as it reaches this many taps. At least 1.
    pub tap_max_count: u32,
    /// Seconds allowed between one tap's release and the next press.
    pub tap_max_interval: f64,
    pub filter: TouchFilter,
}

impl Default for MultiTapConfig {
    fn default() -> Self {
        Self {
            tap_max_count: 2,
            tap_max_interval: TAP_MAX_INTERVAL,
            filter: default_filter(),
        }
    }
}

impl MultiTapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tap_max_count < 1 {
            return Err(ConfigError::InvalidTapMaxCount(self.tap_max_count));
        }
        Ok(())
    }
}

/// A finished tap sequence.
#[derive(Clone, Debug)]
pub struct MultiTap {
    pub count: usize,
    /// The accepted touches, oldest first.
    pub touches: Vec<Rc<TouchSession>>,
}

/// Counts consecutive taps and reports them as one sequence.
pub struct MultiTapRecognizer {
    inner: Rc<MultiTapInner>,
}

struct MultiTapInner {
    window: Window,
    widget: WidgetId,
    config: RefCell<MultiTapConfig>,
    supervisor: Supervisor,
    on_multi_tap: Notifier<MultiTap>,
    trigger: Trigger,
    _observation: Observation,
}

impl MultiTapRecognizer {
    pub fn attach(window: &Window, widget: WidgetId, config: MultiTapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let inner = Rc::new_cyclic(|weak: &Weak<MultiTapInner>| {
            let weak = weak.clone();
            let trigger = Trigger::new(window.runtime(), move || {
                if let Some(inner) = weak.upgrade() {
                    MultiTapInner::reset(&inner);
                }
            });
            let observation = restart_on_change(
                window.tree(),
                widget,
                &[WidgetProperty::Disabled, WidgetProperty::Parent],
                &trigger,
            );
            MultiTapInner {
                window: window.clone(),
                widget,
                config: RefCell::new(config),
                supervisor: Supervisor::new(window.runtime().clone()),
                on_multi_tap: Notifier::new(),
                trigger,
                _observation: observation,
            }
        });
        let _ = window.tree().set_touch_opaque(widget, true);
        MultiTapInner::reset(&inner);
        Ok(Self { inner })
    }

    pub fn widget(&self) -> WidgetId {
        self.inner.widget
    }

    pub fn config(&self) -> MultiTapConfig {
        self.inner.config.borrow().clone()
    }

    pub fn set_config(&self, config: MultiTapConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.inner.config.borrow_mut() = config;
        self.inner.trigger.trigger();
        Ok(())
    }

    pub fn on_multi_tap(&self, handler: impl Fn(&MultiTap) + 'static) -> HandlerId {
        self.inner.on_multi_tap.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) {
        self.inner.on_multi_tap.disconnect(id);
    }
}

impl MultiTapInner {
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
        let config = inner.config.borrow().clone();
        let downs = inner.window.touch_downs(widget, config.filter.clone());
        let timer = ResettableTimer::new(inner.window.runtime(), config.tap_max_interval);
        drop(inner);
        let tap_max_count = config.tap_max_count as usize;
        let accepted: RefCell<Vec<Rc<TouchSession>>> = RefCell::new(Vec::new());
        loop {
            accepted.borrow_mut().clear();
            timer.stop();
            move_on_when(timer.wait_expiration(), async {
                while accepted.borrow().len() < tap_max_count {
                    let touch = downs.next().await;
                    timer.stop();
                    let session = touch.session;
                    session.exclusive_access().wait().await;
                    if !session.is_ended() || !session.try_claim() {
                        break;
                    }
                    let pos = tree.to_parent_space(widget, session.pos());
                    if !tree.collide_point(widget, pos) {
                        break;
                    }
                    accepted.borrow_mut().push(session);
                    timer.start();
                }
            })
            .await;
            let touches = std::mem::take(&mut *accepted.borrow_mut());
            if touches.is_empty() {
                continue;
            }
            log::debug!("{} taps on {widget}", touches.len());
            if let Some(inner) = this.upgrade() {
                inner.on_multi_tap.emit(&MultiTap {
                    count: touches.len(),
                    touches,
                });
            }
        }
    }
}
