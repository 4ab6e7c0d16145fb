use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type HandlerId = u64;

/// Fan-out for behavior notifications.
///
/// Handlers run in connection order. The list is snapshotted before
/// dispatch, so a handler may connect or disconnect handlers freely.
pub struct Notifier<E: ?Sized> {
    handlers: RefCell<Vec<(HandlerId, Rc<dyn Fn(&E)>)>>,
    next_id: Cell<HandlerId>,
}

impl<E: ?Sized> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }
}

impl<E: ?Sized> Notifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, handler: impl Fn(&E) + 'static) -> HandlerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    pub fn disconnect(&self, id: HandlerId) {
        self.handlers.borrow_mut().retain(|(handler_id, _)| *handler_id != id);
    }

    pub fn emit(&self, event: &E) {
        let handlers: Vec<_> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}
