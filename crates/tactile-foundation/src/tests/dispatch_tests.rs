use crate::input::{MouseButton, TouchInput, TouchRef, Window};
use crate::touch_filters::{
    is_colliding, is_colliding_and_not_wheel, is_opos_colliding, is_opos_colliding_and_not_wheel,
};
use crate::widget::{LocalFrame, WidgetId};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tactile_core::{DefaultScheduler, Runtime};
use tactile_ui_graphics::{Point, Rect, Size};

fn setup() -> (Runtime, Window) {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let window = Window::new(runtime.handle(), Size::new(400.0, 400.0));
    (runtime, window)
}

fn add(window: &Window, parent: WidgetId, rect: Rect) -> WidgetId {
    let widget = window.tree().create_widget(rect);
    window
        .tree()
        .add_widget(parent, widget, 0)
        .expect("parent exists");
    widget
}

/// Spawns a task claiming every touch routed to `widget`, logging `name`
/// when the claim succeeds.
fn claim_on_down(window: &Window, widget: WidgetId, name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) {
    let downs = window.touch_downs(widget, Rc::new(is_opos_colliding));
    let log = Rc::clone(log);
    window.runtime().spawn_ui(async move {
        loop {
            let touch = downs.next().await;
            if touch.session.try_claim() {
                log.borrow_mut().push(name);
            }
        }
    });
}

#[test]
fn only_one_listener_claims_a_touch() {
    let (runtime, window) = setup();
    let outer = add(&window, window.root(), Rect::new(0.0, 0.0, 200.0, 200.0));
    let middle = add(&window, outer, Rect::new(0.0, 0.0, 100.0, 100.0));
    let inner = add(&window, middle, Rect::new(0.0, 0.0, 50.0, 50.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    claim_on_down(&window, inner, "inner", &log);
    claim_on_down(&window, middle, "middle", &log);
    claim_on_down(&window, outer, "outer", &log);
    runtime.drain_ui();

    window.touch_down(TouchInput::new(1, Point::new(25.0, 25.0), 0.0));
    runtime.drain_ui();
    window.touch_up(TouchInput::new(1, Point::new(25.0, 25.0), 0.1));
    runtime.drain_ui();

    assert_eq!(*log.borrow(), vec!["outer"], "the outermost listener is served first");
}

#[test]
fn touch_opaque_widget_hides_widgets_underneath() {
    let (runtime, window) = setup();
    let below = add(&window, window.root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let above = add(&window, window.root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    window.tree().set_touch_opaque(above, true).expect("widget exists");
    let log = Rc::new(RefCell::new(Vec::new()));
    claim_on_down(&window, below, "below", &log);
    runtime.drain_ui();

    window.touch_down(TouchInput::new(1, Point::new(10.0, 10.0), 0.0));
    runtime.drain_ui();
    assert!(log.borrow().is_empty());

    window.touch_down(TouchInput::new(2, Point::new(150.0, 150.0), 0.0));
    runtime.drain_ui();
    assert!(log.borrow().is_empty(), "the touch missed both widgets");
}

#[test]
fn disabled_widget_swallows_touches() {
    let (runtime, window) = setup();
    let panel = add(&window, window.root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let button = add(&window, panel, Rect::new(10.0, 10.0, 20.0, 20.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    claim_on_down(&window, button, "button", &log);
    window.tree().set_disabled(panel, true).expect("widget exists");
    runtime.drain_ui();

    window.touch_down(TouchInput::new(1, Point::new(15.0, 15.0), 0.0));
    runtime.drain_ui();
    assert!(log.borrow().is_empty());
}

#[test]
fn touch_up_ends_the_session_before_releasing_it() {
    let (runtime, window) = setup();
    let session = window.touch_down(TouchInput::new(7, Point::new(1.0, 1.0), 0.0));
    let seen = Rc::new(RefCell::new(None));
    {
        let session = Rc::clone(&session);
        let seen = Rc::clone(&seen);
        window.runtime().spawn_ui(async move {
            session.exclusive_access().wait().await;
            *seen.borrow_mut() = Some((session.is_ended(), session.is_claimed()));
        });
    }
    runtime.drain_ui();
    window.touch_up(TouchInput::new(7, Point::new(2.0, 2.0), 0.5));
    runtime.drain_ui();

    assert_eq!(*seen.borrow(), Some((true, false)), "the release fire is not a claim");
    assert!(window.session(7).is_none());
    assert_eq!(session.time_end(), Some(0.5));
}

#[test]
fn moves_are_buffered_until_read() {
    let (runtime, window) = setup();
    let session = window.touch_down(TouchInput::new(1, Point::new(0.0, 0.0), 0.0));
    let moves = session.moves();
    window.touch_move(TouchInput::new(1, Point::new(5.0, 0.0), 0.1));
    window.touch_move(TouchInput::new(1, Point::new(5.0, 8.0), 0.2));

    let collected = Rc::new(RefCell::new(Vec::new()));
    {
        let collected = Rc::clone(&collected);
        window.runtime().spawn_ui(async move {
            for _ in 0..2 {
                let motion = moves.next().await;
                collected.borrow_mut().push((motion.dx, motion.dy));
            }
        });
    }
    runtime.drain_ui();
    assert_eq!(*collected.borrow(), vec![(5.0, 0.0), (0.0, 8.0)]);
}

#[test]
fn wheel_touches_skip_the_default_filter() {
    let (runtime, window) = setup();
    let widget = add(&window, window.root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let downs = window.touch_downs(widget, Rc::new(is_opos_colliding_and_not_wheel));
    let count = Rc::new(RefCell::new(0));
    {
        let count = Rc::clone(&count);
        window.runtime().spawn_ui(async move {
            loop {
                downs.next().await;
                *count.borrow_mut() += 1;
            }
        });
    }
    runtime.drain_ui();

    window.touch_down(TouchInput::new(1, Point::new(5.0, 5.0), 0.0).with_button(MouseButton::ScrollDown));
    runtime.drain_ui();
    assert_eq!(*count.borrow(), 0);

    window.touch_down(TouchInput::new(2, Point::new(5.0, 5.0), 0.0).with_button(MouseButton::Left));
    runtime.drain_ui();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn relative_frames_shift_the_routed_position() {
    let (runtime, window) = setup();
    let viewport = add(&window, window.root(), Rect::new(100.0, 100.0, 100.0, 100.0));
    window
        .tree()
        .set_frame(viewport, LocalFrame::Relative { offset: Point::new(0.0, -50.0) })
        .expect("widget exists");
    let content = add(&window, viewport, Rect::new(0.0, 0.0, 100.0, 200.0));
    let downs = window.touch_downs(content, Rc::new(is_opos_colliding));
    let seen = Rc::new(RefCell::new(None));
    {
        let seen = Rc::clone(&seen);
        window.runtime().spawn_ui(async move {
            let touch = downs.next().await;
            *seen.borrow_mut() = Some(touch.opos);
        });
    }
    runtime.drain_ui();

    window.touch_down(TouchInput::new(1, Point::new(110.0, 120.0), 0.0));
    runtime.drain_ui();
    assert_eq!(*seen.borrow(), Some(Point::new(10.0, 70.0)));
}

#[test]
fn filters_pick_the_current_or_the_original_position() {
    let (_runtime, window) = setup();
    let widget = add(&window, window.root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let tree = window.tree();
    let session = window.touch_down(TouchInput::new(1, Point::new(50.0, 50.0), 0.0));
    let touch = TouchRef {
        session,
        opos: Point::new(50.0, 50.0),
        pos: Point::new(150.0, 50.0),
    };
    assert!(is_opos_colliding(tree, widget, &touch));
    assert!(is_opos_colliding_and_not_wheel(tree, widget, &touch));
    assert!(!is_colliding(tree, widget, &touch));
    assert!(!is_colliding_and_not_wheel(tree, widget, &touch));

    let wheel = window.touch_down(
        TouchInput::new(2, Point::new(50.0, 50.0), 0.0).with_button(MouseButton::ScrollUp),
    );
    let touch = TouchRef {
        session: wheel,
        opos: Point::new(50.0, 50.0),
        pos: Point::new(50.0, 50.0),
    };
    assert!(is_colliding(tree, widget, &touch));
    assert!(!is_colliding_and_not_wheel(tree, widget, &touch));
    assert_eq!(window.active_sessions().len(), 2);
}
