//! Task ownership for widget lifetimes.

use crate::runtime::{RuntimeHandle, TaskHandle};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

/// Owns the single long-lived task of a behavior.
///
/// Restarting cancels the previous task before the new one is spawned, and
/// dropping the supervisor cancels whatever is running. Cancellation drops
/// the task's future, so its cleanup guards run before `restart` returns.
pub struct Supervisor {
    runtime: RuntimeHandle,
    current: RefCell<Option<TaskHandle>>,
}

impl Supervisor {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            runtime,
            current: RefCell::new(None),
        }
    }

    pub fn restart<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.cancel();
        let handle = self.runtime.start_ui(fut);
        *self.current.borrow_mut() = handle;
    }

    pub fn cancel(&self) {
        let previous = self.current.borrow_mut().take();
        if let Some(handle) = previous {
            handle.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.runtime
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if let Some(handle) = self.current.get_mut().take() {
            handle.cancel();
        }
    }
}

/// A nursery: child tasks live at most as long as the group.
pub struct TaskGroup {
    runtime: RuntimeHandle,
    children: RefCell<SmallVec<[TaskHandle; 4]>>,
}

impl TaskGroup {
    pub fn new(runtime: &RuntimeHandle) -> Self {
        Self {
            runtime: runtime.clone(),
            children: RefCell::new(SmallVec::new()),
        }
    }

    /// Starts a child and runs it up to its first suspension point.
    pub fn start<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.children
            .borrow_mut()
            .retain(|child| !child.is_finished());
        if let Some(handle) = self.runtime.start_ui(fut) {
            self.children.borrow_mut().push(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.children
            .borrow()
            .iter()
            .filter(|child| !child.is_finished())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cancel_all(&self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.cancel();
        }
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        for child in self.children.get_mut().drain(..) {
            child.cancel();
        }
    }
}

/// Coalescing deferred callback.
///
/// Any number of `trigger` calls before the next `drain_ui` pass run the
/// callback once.
#[derive(Clone)]
pub struct Trigger {
    runtime: RuntimeHandle,
    scheduled: Rc<Cell<bool>>,
    callback: Rc<dyn Fn()>,
}

impl Trigger {
    pub fn new(runtime: &RuntimeHandle, callback: impl Fn() + 'static) -> Self {
        Self {
            runtime: runtime.clone(),
            scheduled: Rc::new(Cell::new(false)),
            callback: Rc::new(callback),
        }
    }

    pub fn trigger(&self) {
        if self.scheduled.replace(true) {
            return;
        }
        let scheduled = Rc::downgrade(&self.scheduled);
        let callback = Rc::downgrade(&self.callback);
        self.runtime.enqueue_ui_task(Box::new(move || {
            let Some(scheduled) = scheduled.upgrade() else {
                return;
            };
            if !scheduled.replace(false) {
                return;
            }
            if let Some(callback) = callback.upgrade() {
                callback();
            }
        }));
    }

    pub fn cancel(&self) {
        self.scheduled.set(false);
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.get()
    }
}
