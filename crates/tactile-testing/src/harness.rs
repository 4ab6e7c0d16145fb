use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tactile_core::{secs_to_nanos, Clock, DefaultScheduler, Runtime, RuntimeHandle};
use tactile_foundation::input::{MouseButton, TouchId, TouchInput, TouchSession, Window};
use tactile_foundation::widget::{WidgetId, WidgetTree};
use tactile_ui_graphics::{Point, Rect, Size};

/// Frame step used when advancing virtual time.
pub const FRAME_SECS: f64 = 1.0 / 60.0;

/// Frame time under the harness's control.
#[derive(Default)]
struct VirtualClock {
    secs: Cell<f64>,
}

impl Clock for VirtualClock {
    fn now_nanos(&self) -> u64 {
        secs_to_nanos(self.secs.get())
    }
}

/// A window on a runtime whose clock only moves when told to.
///
/// Every input method runs the tasks it woke before returning, so assertions
/// can follow directly. Touch events are stamped with the harness clock.
pub struct TouchHarness {
    runtime: Runtime,
    window: Window,
    clock: Rc<VirtualClock>,
}

impl TouchHarness {
    pub fn new(width: f32, height: f32) -> Self {
        let clock = Rc::new(VirtualClock::default());
        let runtime = Runtime::with_clock(Arc::new(DefaultScheduler), clock.clone());
        let window = Window::new(runtime.handle(), Size::new(width, height));
        Self {
            runtime,
            window,
            clock,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn tree(&self) -> &WidgetTree {
        self.window.tree()
    }

    pub fn runtime(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Seconds of virtual time elapsed.
    pub fn time(&self) -> f64 {
        self.clock.secs.get()
    }

    /// Creates a widget and puts it on top of `parent`'s children.
    pub fn add_widget(&self, parent: WidgetId, rect: Rect) -> WidgetId {
        let tree = self.window.tree();
        let widget = tree.create_widget(rect);
        if let Err(err) = tree.add_widget(parent, widget, 0) {
            panic!("cannot add a widget to {parent}: {err}");
        }
        widget
    }

    /// Runs every ready task and the callbacks of the current frame.
    pub fn settle(&self) {
        self.runtime.run_frame();
    }

    /// Moves the clock forward frame by frame.
    pub fn advance(&mut self, secs: f64) {
        let target = self.time() + secs;
        while self.time() + 1e-9 < target {
            self.clock.secs.set((self.time() + FRAME_SECS).min(target));
            self.runtime.run_frame();
        }
    }

    /// Moves the clock without running a frame, the way time passes while a
    /// host has nothing scheduled.
    pub fn idle(&mut self, secs: f64) {
        self.clock.secs.set(self.time() + secs);
    }

    /// Advances until `done` holds or `timeout` seconds pass. Returns
    /// whether `done` held.
    pub fn advance_until(&mut self, timeout: f64, mut done: impl FnMut() -> bool) -> bool {
        let deadline = self.time() + timeout;
        while !done() {
            if self.time() >= deadline {
                return false;
            }
            self.advance(FRAME_SECS);
        }
        true
    }

    pub fn down(&mut self, id: TouchId, x: f32, y: f32) -> Rc<TouchSession> {
        self.runtime.drain_ui();
        let session = self.window.touch_down(TouchInput::new(id, Point::new(x, y), self.time()));
        self.settle();
        session
    }

    pub fn move_to(&mut self, id: TouchId, x: f32, y: f32) {
        self.window
            .touch_move(TouchInput::new(id, Point::new(x, y), self.time()));
        self.settle();
    }

    pub fn up(&mut self, id: TouchId, x: f32, y: f32) {
        self.window
            .touch_up(TouchInput::new(id, Point::new(x, y), self.time()));
        self.settle();
    }

    /// Press and release without moving.
    pub fn tap(&mut self, id: TouchId, x: f32, y: f32) {
        self.down(id, x, y);
        self.advance(FRAME_SECS);
        self.up(id, x, y);
    }

    /// One wheel notch at a window position.
    pub fn wheel(&mut self, id: TouchId, x: f32, y: f32, button: MouseButton) {
        let input = TouchInput::new(id, Point::new(x, y), self.time()).with_button(button);
        self.window.touch_down(input);
        self.settle();
        self.window.touch_up(input);
        self.settle();
    }

    /// Moves an active touch to `(x, y)` in `steps` equal moves spread over
    /// `duration` seconds.
    pub fn glide(&mut self, id: TouchId, x: f32, y: f32, steps: u32, duration: f64) {
        let Some(session) = self.window.session(id) else {
            log::warn!("glide for touch {id} which is not down");
            return;
        };
        let start = session.pos();
        let steps = steps.max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            self.advance(duration / steps as f64);
            self.move_to(id, start.x + (x - start.x) * t, start.y + (y - start.y) * t);
        }
    }
}
