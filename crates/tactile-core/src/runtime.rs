use crate::collections::map::HashMap;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::frame_clock::FrameClock;
use crate::platform::{Clock, RuntimeScheduler};

pub type FrameCallbackId = u64;
pub type TimerId = u64;

type LocalFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

pub fn secs_to_nanos(secs: f64) -> u64 {
    if secs <= 0.0 {
        0
    } else {
        (secs * NANOS_PER_SECOND).round() as u64
    }
}

pub fn nanos_to_secs(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SECOND
}

/// Task ids woken since the last poll, in wake order.
///
/// Wakers may be cloned onto other threads, so the queue is `Send + Sync`
/// even though tasks are only ever polled on the runtime thread.
#[derive(Default)]
struct ReadyQueue {
    queue: Mutex<VecDeque<u64>>,
}

impl ReadyQueue {
    fn push(&self, id: u64) {
        let mut queue = self.queue.lock().unwrap_or_else(|poison| poison.into_inner());
        if !queue.contains(&id) {
            queue.push_back(id);
        }
    }

    fn pop(&self) -> Option<u64> {
        self.queue
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .is_empty()
    }
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    clock: RefCell<Option<Rc<dyn Clock>>>,
    needs_frame: Cell<bool>,
    frame_time_nanos: Cell<u64>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    timers: RefCell<Vec<TimerEntry>>,
    next_timer_id: Cell<u64>,
    local_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    tasks: RefCell<HashMap<u64, TaskEntry>>,
    ready: Arc<ReadyQueue>,
    next_task_id: Cell<u64>,
}

struct TaskEntry {
    // `None` while the task is being polled.
    future: Option<LocalFuture>,
    waker: Waker,
}

struct TimerEntry {
    id: TimerId,
    deadline_nanos: u64,
    callback: Option<Box<dyn FnOnce() + 'static>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            clock: RefCell::new(None),
            needs_frame: Cell::new(false),
            frame_time_nanos: Cell::new(0),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            next_timer_id: Cell::new(1),
            local_tasks: RefCell::new(VecDeque::new()),
            tasks: RefCell::new(HashMap::default()),
            ready: Arc::new(ReadyQueue::default()),
            next_task_id: Cell::new(1),
        }
    }

    /// The host clock's reading, never earlier than the last frame. Without
    /// a clock this is the last frame's time.
    fn now_nanos(&self) -> u64 {
        let frame = self.frame_time_nanos.get();
        match &*self.clock.borrow() {
            Some(clock) => clock.now_nanos().max(frame),
            None => frame,
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.local_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn spawn_ui_task(&self, future: LocalFuture) -> u64 {
        let id = self.insert_task(future);
        self.ready.push(id);
        self.schedule();
        id
    }

    fn insert_task(&self, future: LocalFuture) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        let waker = TaskWaker {
            id,
            ready: Arc::clone(&self.ready),
            scheduler: Arc::clone(&self.scheduler),
        }
        .into_waker();
        self.tasks.borrow_mut().insert(
            id,
            TaskEntry {
                future: Some(future),
                waker,
            },
        );
        id
    }

    fn cancel_task(&self, id: u64) {
        // Dropping the future runs its cleanup, which may touch the task table again.
        let removed = self.tasks.borrow_mut().remove(&id);
        drop(removed);
    }

    fn is_task_alive(&self, id: u64) -> bool {
        self.tasks.borrow().contains_key(&id)
    }

    fn poll_task(&self, id: u64) -> bool {
        let taken = {
            let mut tasks = self.tasks.borrow_mut();
            tasks
                .get_mut(&id)
                .and_then(|entry| entry.future.take().map(|future| (future, entry.waker.clone())))
        };
        let Some((mut future, waker)) = taken else {
            return false;
        };
        let mut cx = Context::from_waker(&waker);
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                let removed = self.tasks.borrow_mut().remove(&id);
                drop(removed);
                drop(future);
            }
            Poll::Pending => {
                let orphaned = {
                    let mut tasks = self.tasks.borrow_mut();
                    match tasks.get_mut(&id) {
                        Some(entry) => {
                            entry.future = Some(future);
                            None
                        }
                        // Cancelled while it was running.
                        None => Some(future),
                    }
                };
                drop(orphaned);
            }
        }
        true
    }

    fn poll_async_tasks(&self) -> bool {
        let mut made_progress = false;
        while let Some(id) = self.ready.pop() {
            if self.poll_task(id) {
                made_progress = true;
            }
        }
        made_progress
    }

    fn drain_ui(&self) {
        loop {
            let mut executed = false;

            loop {
                let task = {
                    let mut local = self.local_tasks.borrow_mut();
                    local.pop_front()
                };

                match task {
                    Some(task) => {
                        executed = true;
                        task();
                    }
                    None => break,
                }
            }

            if self.poll_async_tasks() {
                executed = true;
            }

            if !executed {
                break;
            }
        }
    }

    fn has_pending_ui(&self) -> bool {
        let local_pending = self
            .local_tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        local_pending || !self.ready.is_empty()
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let removed = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .iter()
                .position(|entry| entry.id == id)
                .and_then(|index| callbacks.remove(index))
        };
        drop(removed);
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty() || !self.timers.borrow().is_empty()
    }

    fn register_timer(&self, delay_nanos: u64, callback: Box<dyn FnOnce() + 'static>) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        let deadline_nanos = self.now_nanos().saturating_add(delay_nanos);
        self.timers.borrow_mut().push(TimerEntry {
            id,
            deadline_nanos,
            callback: Some(callback),
        });
        self.schedule();
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        let removed = {
            let mut timers = self.timers.borrow_mut();
            timers
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| timers.remove(index))
        };
        drop(removed);
    }

    fn fire_due_timers(&self, now: u64) {
        let mut due = {
            let mut timers = self.timers.borrow_mut();
            let (due, pending): (Vec<TimerEntry>, Vec<TimerEntry>) = timers
                .drain(..)
                .partition(|entry| entry.deadline_nanos <= now);
            *timers = pending;
            due
        };
        due.sort_by_key(|entry| (entry.deadline_nanos, entry.id));
        for mut entry in due {
            if let Some(callback) = entry.callback.take() {
                callback();
            }
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        let now = frame_time_nanos.max(self.frame_time_nanos.get());
        self.frame_time_nanos.set(now);
        self.fire_due_timers(now);

        let mut callbacks = self.frame_callbacks.borrow_mut();
        let mut pending: Vec<Box<dyn FnOnce(u64) + 'static>> = Vec::with_capacity(callbacks.len());
        while let Some(mut entry) = callbacks.pop_front() {
            if let Some(callback) = entry.callback.take() {
                pending.push(callback);
            }
        }
        drop(callbacks);
        for callback in pending {
            callback(now);
        }
        if !self.has_frame_callbacks() && !self.has_pending_ui() {
            self.needs_frame.set(false);
        }
    }
}

#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    /// A runtime whose timers and tickers start from `clock` rather than
    /// from the last drained frame, which may be long past after the host
    /// idled.
    pub fn with_clock(scheduler: Arc<dyn RuntimeScheduler>, clock: Rc<dyn Clock>) -> Self {
        let runtime = Self::new(scheduler);
        runtime.set_clock(clock);
        runtime
    }

    pub fn set_clock(&self, clock: Rc<dyn Clock>) {
        *self.inner.clock.borrow_mut() = Some(clock);
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }

    pub fn drain_ui(&self) {
        self.inner.drain_ui();
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        self.inner.drain_frame_callbacks(frame_time_nanos);
    }

    /// One host loop step: ready tasks, a frame stamped with the runtime's
    /// clock, then the tasks that frame woke.
    pub fn run_frame(&self) {
        self.inner.drain_ui();
        let now = self.inner.now_nanos();
        self.inner.drain_frame_callbacks(now);
        self.inner.drain_ui();
    }
}

pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
pub struct TestScheduler;

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
pub struct TestRuntime {
    runtime: Runtime,
}

#[cfg(test)]
impl TestRuntime {
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new(Arc::new(TestScheduler)),
        }
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            runtime: Runtime::with_clock(Arc::new(TestScheduler), clock),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn drain(&self) {
        self.runtime.drain_ui();
    }

    /// Runs one frame at `secs` and then every task that became ready.
    pub fn advance_to(&self, secs: f64) {
        self.runtime.drain_frame_callbacks(secs_to_nanos(secs));
        self.runtime.drain_ui();
    }
}

/// Weak handle to the runtime. Every operation is a no-op once the runtime is gone.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    /// Schedules a closure to run on the next `drain_ui` pass.
    pub fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_ui_task(task);
        }
    }

    /// Queues `fut` behind every task that is already ready.
    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    /// Spawns `fut` and polls it right away, so it reaches its first
    /// suspension point before the caller continues.
    pub fn start_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner.insert_task(Box::pin(fut));
        inner.poll_task(id);
        Some(TaskHandle {
            id,
            runtime: self.clone(),
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn is_task_alive(&self, id: u64) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.is_task_alive(id))
            .unwrap_or(false)
    }

    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or(false)
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn register_timer(
        &self,
        delay_nanos: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_timer(delay_nanos, Box::new(callback)))
    }

    pub fn cancel_timer(&self, id: TimerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_timer(id);
        }
    }

    /// Timestamp of the frame currently being processed.
    pub fn frame_time_nanos(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.frame_time_nanos.get())
            .unwrap_or(0)
    }

    pub fn frame_time_secs(&self) -> f64 {
        nanos_to_secs(self.frame_time_nanos())
    }

    /// Current time: the host clock when the runtime has one, otherwise the
    /// last frame's time.
    pub fn now_nanos(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.now_nanos())
            .unwrap_or(0)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        !self.runtime.is_task_alive(self.id)
    }

    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

pub(crate) struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct TaskWaker {
    id: u64,
    ready: Arc<ReadyQueue>,
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl TaskWaker {
    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.push(arc_self.id);
        arc_self.scheduler.schedule_frame();
    }
}
