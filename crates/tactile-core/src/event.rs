use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A reusable event with a single waiter that carries a payload.
///
/// `fire` hands the value to the task currently waiting. With nobody
/// waiting the value is dropped, so a busy consumer ignores requests that
/// arrive while it is occupied.
pub struct ExclusiveEvent<T> {
    state: Rc<RefCell<ExclusiveState<T>>>,
}

struct ExclusiveState<T> {
    waiter: Option<Waker>,
    value: Option<T>,
    next_ticket: u64,
    active_ticket: Option<u64>,
}

impl<T> Clone for ExclusiveEvent<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Default for ExclusiveEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ExclusiveEvent<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ExclusiveState {
                waiter: None,
                value: None,
                next_ticket: 1,
                active_ticket: None,
            })),
        }
    }

    /// Returns `true` when a waiter received the value.
    pub fn fire(&self, value: T) -> bool {
        let waker = {
            let mut state = self.state.borrow_mut();
            match state.waiter.take() {
                Some(waker) => {
                    state.value = Some(value);
                    waker
                }
                None => return false,
            }
        };
        waker.wake();
        true
    }

    pub fn is_waiting(&self) -> bool {
        self.state.borrow().waiter.is_some()
    }

    pub fn wait(&self) -> ExclusiveWait<T> {
        ExclusiveWait {
            state: Rc::clone(&self.state),
            ticket: None,
        }
    }
}

pub struct ExclusiveWait<T> {
    state: Rc<RefCell<ExclusiveState<T>>>,
    ticket: Option<u64>,
}

impl<T> Future for ExclusiveWait<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = &mut *self;
        let mut state = this.state.borrow_mut();
        if let Some(ticket) = this.ticket {
            if state.active_ticket == Some(ticket) {
                if let Some(value) = state.value.take() {
                    state.active_ticket = None;
                    this.ticket = None;
                    return Poll::Ready(value);
                }
                state.waiter = Some(cx.waker().clone());
                return Poll::Pending;
            }
        }
        if state.active_ticket.is_some() {
            log::warn!("ExclusiveEvent already has a waiter; the newer wait replaces it");
        }
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.active_ticket = Some(ticket);
        state.waiter = Some(cx.waker().clone());
        state.value = None;
        this.ticket = Some(ticket);
        Poll::Pending
    }
}

impl<T> Drop for ExclusiveWait<T> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let mut state = self.state.borrow_mut();
            if state.active_ticket == Some(ticket) {
                state.active_ticket = None;
                state.waiter = None;
                state.value = None;
            }
        }
    }
}
