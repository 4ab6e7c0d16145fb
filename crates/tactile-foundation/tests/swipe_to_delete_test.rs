use std::cell::RefCell;
use std::rc::Rc;
use tactile_foundation::prelude::*;
use tactile_testing::TouchHarness;
use tactile_ui_graphics::{Density, Point, Rect};

struct Inbox {
    harness: TouchHarness,
    list: WidgetId,
    message: WidgetId,
    behavior: Swipe2DeleteBehavior,
    deleted: Rc<RefCell<Vec<WidgetId>>>,
}

fn inbox() -> Inbox {
    inbox_at(Density::new(1.0))
}

fn inbox_at(density: Density) -> Inbox {
    let harness = TouchHarness::new(400.0, 400.0);
    harness.window().set_density(density);
    let list = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 400.0, 300.0));
    let message = harness.add_widget(list, Rect::new(0.0, 0.0, 400.0, 50.0));
    let behavior = Swipe2DeleteBehavior::attach(harness.window(), list, Swipe2DeleteConfig::default());
    let deleted = Rc::new(RefCell::new(Vec::new()));
    {
        let deleted = Rc::clone(&deleted);
        behavior.on_swipe2delete(move |tree, layout, child| {
            deleted.borrow_mut().push(child);
            tree.remove_widget(layout, child);
        });
    }
    harness.settle();
    Inbox {
        harness,
        list,
        message,
        behavior,
        deleted,
    }
}

#[test]
fn swiping_past_the_threshold_deletes_the_child() {
    let mut inbox = inbox();

    let session = inbox.harness.down(1, 10.0, 25.0);
    inbox.harness.glide(1, 350.0, 25.0, 10, 0.1);
    assert!(session.is_claimed());
    let tree = inbox.harness.tree();
    assert!(tree.translation(inbox.message).x > 300.0);
    assert!(tree.opacity(inbox.message) < 0.5, "the child fades as it leaves");

    inbox.harness.up(1, 350.0, 25.0);
    assert_eq!(*inbox.deleted.borrow(), vec![inbox.message]);
    assert!(inbox.harness.tree().children(inbox.list).is_empty());
    assert_eq!(inbox.harness.tree().opacity(inbox.message), 1.0);
}

#[test]
fn a_short_swipe_puts_the_child_back() {
    let mut inbox = inbox();

    inbox.harness.down(1, 10.0, 25.0);
    inbox.harness.glide(1, 110.0, 25.0, 5, 0.1);
    assert_ne!(inbox.harness.tree().translation(inbox.message), Point::ZERO);
    inbox.harness.up(1, 110.0, 25.0);

    let tree = inbox.harness.tree();
    assert!(inbox.deleted.borrow().is_empty());
    assert_eq!(tree.children(inbox.list), vec![inbox.message]);
    assert_eq!(tree.translation(inbox.message), Point::ZERO);
    assert_eq!(tree.opacity(inbox.message), 1.0);
}

#[test]
fn vertical_movement_is_not_a_horizontal_swipe() {
    let mut inbox = inbox();

    let session = inbox.harness.down(1, 10.0, 25.0);
    inbox.harness.glide(1, 10.0, 250.0, 5, 0.1);
    inbox.harness.up(1, 10.0, 250.0);

    assert!(!session.is_claimed());
    assert!(inbox.deleted.borrow().is_empty());
    assert_eq!(inbox.harness.tree().translation(inbox.message), Point::ZERO);
}

#[test]
fn disabling_the_behavior_stops_swipes() {
    let mut inbox = inbox();
    inbox.behavior.set_s2d_disabled(true);
    inbox.harness.settle();

    inbox.harness.down(1, 10.0, 25.0);
    inbox.harness.glide(1, 390.0, 25.0, 10, 0.1);
    inbox.harness.up(1, 390.0, 25.0);

    assert!(inbox.deleted.borrow().is_empty());
    assert_eq!(inbox.harness.tree().children(inbox.list), vec![inbox.message]);
}

#[test]
fn thresholds_scale_with_the_screen_density() {
    let mut inbox = inbox_at(Density::new(2.0));

    let session = inbox.harness.down(1, 10.0, 25.0);
    inbox.harness.glide(1, 35.0, 25.0, 2, 0.05);
    assert!(!session.is_claimed(), "25 px is short of the 40 px claim distance");

    inbox.harness.glide(1, 350.0, 25.0, 10, 0.1);
    assert!(session.is_claimed());
    inbox.harness.up(1, 350.0, 25.0);

    assert!(inbox.deleted.borrow().is_empty(), "340 px is short of 600 px");
    assert_eq!(inbox.harness.tree().children(inbox.list), vec![inbox.message]);
}
