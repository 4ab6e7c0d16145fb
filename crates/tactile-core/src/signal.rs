//! One-shot arbitration signals.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A one-shot, multi-waiter signal without payload.
///
/// Firing wakes every registered waiter in reverse registration order: the
/// waiter that registered last is resumed first. Behaviors attach innermost
/// last, so this hands the innermost recognizer the first chance to act on an
/// ambiguous touch. Firing more than once has no effect.
#[derive(Clone, Default)]
pub struct LifoSignal {
    inner: Rc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
    fired: Cell<bool>,
    waiters: RefCell<Vec<Option<Waker>>>,
}

impl LifoSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.get()
    }

    pub fn fire(&self) {
        if self.inner.fired.replace(true) {
            return;
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        for waker in waiters.into_iter().rev().flatten() {
            waker.wake();
        }
    }

    /// Resolves once the signal has fired. Resolves immediately if it already has.
    pub fn wait(&self) -> SignalWait {
        SignalWait {
            inner: Rc::clone(&self.inner),
            slot: None,
        }
    }

    /// Number of waiters still registered.
    pub fn waiter_count(&self) -> usize {
        self.inner
            .waiters
            .borrow()
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn ptr_eq(&self, other: &LifoSignal) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for LifoSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifoSignal")
            .field("fired", &self.is_fired())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}

pub struct SignalWait {
    inner: Rc<SignalInner>,
    slot: Option<usize>,
}

impl Future for SignalWait {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.inner.fired.get() {
            self.slot = None;
            return Poll::Ready(());
        }
        let slot = {
            let mut waiters = self.inner.waiters.borrow_mut();
            match self.slot {
                Some(index) => {
                    waiters[index] = Some(cx.waker().clone());
                    index
                }
                None => {
                    waiters.push(Some(cx.waker().clone()));
                    waiters.len() - 1
                }
            }
        };
        self.slot = Some(slot);
        Poll::Pending
    }
}

impl Drop for SignalWait {
    fn drop(&mut self) {
        // Vacate the slot so the other waiters keep their positions.
        if let Some(index) = self.slot.take() {
            if !self.inner.fired.get() {
                if let Some(slot) = self.inner.waiters.borrow_mut().get_mut(index) {
                    *slot = None;
                }
            }
        }
    }
}
