use crate::runtime::{nanos_to_secs, FrameCallbackId, RuntimeHandle};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};

#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let mut callback_opt = Some(callback);
        let runtime = self.runtime.clone();
        match runtime.register_frame_callback(move |time| {
            if let Some(callback) = callback_opt.take() {
                callback(time);
            }
        }) {
            Some(id) => FrameCallbackRegistration::new(runtime, id),
            None => FrameCallbackRegistration::inactive(runtime),
        }
    }

    pub fn next_frame(&self) -> NextFrame {
        NextFrame::new(self.clone())
    }

    /// Creates a stopped [`Ticker`] that calls `callback` once per frame with the
    /// elapsed seconds since the previous tick, or since [`Ticker::start`] for
    /// the first one.
    pub fn ticker(&self, callback: impl FnMut(f32) -> bool + 'static) -> Ticker {
        Ticker::new(self.clone(), callback)
    }
}

pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

struct NextFrameState {
    registration: Option<FrameCallbackRegistration>,
    time: Option<u64>,
    waker: Option<Waker>,
}

pub struct NextFrame {
    clock: FrameClock,
    state: Rc<RefCell<NextFrameState>>,
}

impl NextFrame {
    fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            state: Rc::new(RefCell::new(NextFrameState {
                registration: None,
                time: None,
                waker: None,
            })),
        }
    }
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(time) = self.state.borrow().time {
            return Poll::Ready(time);
        }

        let needs_registration = {
            let mut state = self.state.borrow_mut();
            state.waker = Some(cx.waker().clone());
            state.registration.is_none()
        };
        if needs_registration {
            let state = Rc::downgrade(&self.state);
            let registration = self.clock.with_frame_nanos(move |time| {
                if let Some(state) = state.upgrade() {
                    let waker = {
                        let mut state = state.borrow_mut();
                        state.time = Some(time);
                        state.registration.take();
                        state.waker.take()
                    };
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }
            });
            self.state.borrow_mut().registration = Some(registration);
        }

        match self.state.borrow().time {
            Some(time) => Poll::Ready(time),
            None => Poll::Pending,
        }
    }
}

impl Drop for NextFrame {
    fn drop(&mut self) {
        let registration = self.state.borrow_mut().registration.take();
        drop(registration);
    }
}

impl FrameCallbackRegistration {
    fn new(runtime: RuntimeHandle, id: FrameCallbackId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

/// Repeating per-frame callback.
///
/// While started, the callback runs once per frame with the time step in
/// seconds. Returning `false` stops the ticker; [`Ticker::start`] resumes it.
/// An idle ticker holds no frame registration at all.
#[derive(Clone)]
pub struct Ticker {
    shared: Rc<TickerShared>,
}

struct TickerShared {
    clock: FrameClock,
    registration: RefCell<Option<FrameCallbackRegistration>>,
    last_tick_nanos: Cell<u64>,
    active: Cell<bool>,
    callback: RefCell<Box<dyn FnMut(f32) -> bool>>,
}

impl Ticker {
    fn new(clock: FrameClock, callback: impl FnMut(f32) -> bool + 'static) -> Self {
        Self {
            shared: Rc::new(TickerShared {
                clock,
                registration: RefCell::new(None),
                last_tick_nanos: Cell::new(0),
                active: Cell::new(false),
                callback: RefCell::new(Box::new(callback)),
            }),
        }
    }

    pub fn start(&self) {
        if self.shared.active.replace(true) {
            return;
        }
        let now = self.shared.clock.runtime_handle().now_nanos();
        self.shared.last_tick_nanos.set(now);
        TickerShared::schedule_next_frame(&self.shared);
    }

    pub fn stop(&self) {
        self.shared.active.set(false);
        let registration = self.shared.registration.borrow_mut().take();
        drop(registration);
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.get()
    }
}

impl TickerShared {
    fn schedule_next_frame(this: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let registration = this.clock.with_frame_nanos(move |time| {
            if let Some(shared) = weak.upgrade() {
                TickerShared::tick(&shared, time);
            }
        });
        *this.registration.borrow_mut() = Some(registration);
    }

    fn tick(this: &Rc<Self>, time: u64) {
        let fired = this.registration.borrow_mut().take();
        drop(fired);
        if !this.active.get() {
            return;
        }
        let dt = nanos_to_secs(time.saturating_sub(this.last_tick_nanos.get())) as f32;
        this.last_tick_nanos.set(time);
        let keep_going = match this.callback.try_borrow_mut() {
            Ok(mut callback) => callback(dt),
            Err(_) => true,
        };
        if !keep_going {
            this.active.set(false);
        }
        if this.active.get() && this.registration.borrow().is_none() {
            TickerShared::schedule_next_frame(this);
        }
    }
}

impl Drop for TickerShared {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.get_mut().take() {
            registration.cancel();
        }
    }
}
