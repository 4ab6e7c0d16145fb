//! Timers.
//!
//! Deadlines count from the runtime's current time at registration and are
//! checked whenever the host drains a frame, so a timer fires on the first
//! frame at or after its deadline.

use crate::event::ExclusiveEvent;
use crate::runtime::{secs_to_nanos, RuntimeHandle, TimerId};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Cancels its timer when dropped.
pub struct TimerRegistration {
    runtime: RuntimeHandle,
    id: Option<TimerId>,
}

impl TimerRegistration {
    pub fn new(runtime: &RuntimeHandle, delay_secs: f64, callback: impl FnOnce() + 'static) -> Self {
        let id = runtime.register_timer(secs_to_nanos(delay_secs), callback);
        Self {
            runtime: runtime.clone(),
            id,
        }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

#[derive(Default)]
struct SleepState {
    done: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

pub struct Sleep {
    runtime: RuntimeHandle,
    delay_secs: f64,
    state: Rc<SleepState>,
    timer: Option<TimerRegistration>,
}

/// Completes on the first frame whose time is at least `delay_secs` past the
/// moment it is first polled.
pub fn sleep(runtime: &RuntimeHandle, delay_secs: f64) -> Sleep {
    Sleep {
        runtime: runtime.clone(),
        delay_secs,
        state: Rc::new(SleepState::default()),
        timer: None,
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.state.done.get() {
            self.timer = None;
            return Poll::Ready(());
        }
        *self.state.waker.borrow_mut() = Some(cx.waker().clone());
        if self.timer.is_none() {
            let state = Rc::downgrade(&self.state);
            let registration = TimerRegistration::new(&self.runtime, self.delay_secs, move || {
                if let Some(state) = state.upgrade() {
                    state.done.set(true);
                    let waker = state.waker.borrow_mut().take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }
            });
            self.timer = Some(registration);
        }
        Poll::Pending
    }
}

/// Gives every other ready task one turn before resuming.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// A countdown that can be restarted or stopped, with an awaitable expiry.
pub struct ResettableTimer {
    runtime: RuntimeHandle,
    timeout_secs: f64,
    expired: ExclusiveEvent<()>,
    pending: RefCell<Option<TimerRegistration>>,
}

impl ResettableTimer {
    pub fn new(runtime: &RuntimeHandle, timeout_secs: f64) -> Self {
        Self {
            runtime: runtime.clone(),
            timeout_secs,
            expired: ExclusiveEvent::new(),
            pending: RefCell::new(None),
        }
    }

    /// Starts the countdown from the full timeout, replacing any running one.
    pub fn start(&self) {
        let expired = self.expired.clone();
        let registration = TimerRegistration::new(&self.runtime, self.timeout_secs, move || {
            expired.fire(());
        });
        let previous = self.pending.borrow_mut().replace(registration);
        drop(previous);
    }

    pub fn stop(&self) {
        let previous = self.pending.borrow_mut().take();
        drop(previous);
    }

    pub fn wait_expiration(&self) -> impl Future<Output = ()> {
        self.expired.wait()
    }
}
