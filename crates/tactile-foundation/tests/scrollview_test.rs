//! Scrollview bounds, gestures and wheel input.

use tactile_foundation::prelude::*;
use tactile_testing::{TouchHarness, FRAME_SECS};
use tactile_ui_graphics::{Point, Rect};

struct Scroller {
    harness: TouchHarness,
    view: ScrollView,
    content: WidgetId,
}

fn scroller(view_rect: Rect, content_rect: Rect, size_hint: SizeHint) -> Scroller {
    let harness = TouchHarness::new(400.0, 400.0);
    let widget = harness.add_widget(harness.window().root(), view_rect);
    let view = ScrollView::attach(harness.window(), widget, ScrollViewConfig::default())
        .expect("no children yet");
    let content = harness.tree().create_widget(content_rect);
    harness
        .tree()
        .set_size_hint(content, size_hint)
        .expect("content exists");
    view.set_content(content).expect("view is empty");
    harness.settle();
    Scroller {
        harness,
        view,
        content,
    }
}

/// A 100x100 view over a column three times as tall.
fn tall_column() -> Scroller {
    scroller(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        Rect::new(0.0, 0.0, 100.0, 300.0),
        SizeHint::new(Some(1.0), None),
    )
}

#[test]
fn small_content_can_move_anywhere_inside_the_view() {
    let scroller = scroller(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        Rect::new(0.0, 0.0, 0.0, 0.0),
        SizeHint::NONE,
    );
    assert_eq!(scroller.view.content(), Some(scroller.content));
    let bounds = scroller.view.content_bounds();
    assert_eq!(bounds.min, Point::new(0.0, 0.0));
    assert_eq!(bounds.max, Point::new(100.0, 100.0));
}

#[test]
fn large_content_bounds_are_negative() {
    let scroller = scroller(
        Rect::new(0.0, 0.0, 0.0, 0.0),
        Rect::new(0.0, 0.0, 100.0, 100.0),
        SizeHint::NONE,
    );
    let bounds = scroller.view.content_bounds();
    assert_eq!(bounds.min, Point::new(-100.0, -100.0));
    assert_eq!(bounds.max, Point::new(0.0, 0.0));
}

#[test]
fn size_hints_fit_the_content_to_the_view() {
    let scroller = tall_column();
    assert_eq!(scroller.harness.tree().size(scroller.content).width, 100.0);
    let bounds = scroller.view.content_bounds();
    assert_eq!(bounds.min, Point::new(0.0, -200.0));
    assert_eq!(bounds.max, Point::ZERO);
    assert!(scroller.view.vbar().ratio < 1.0);
}

#[test]
fn a_second_child_is_refused() {
    let scroller = tall_column();
    let other = scroller
        .harness
        .tree()
        .create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert!(matches!(
        scroller.view.set_content(other),
        Err(ConfigError::TooManyChildren { .. })
    ));
    assert_eq!(scroller.view.set_content(scroller.content), Ok(()));
    assert_eq!(scroller.harness.tree().child_count(scroller.view.widget()), 1);
}

#[test]
fn attaching_to_a_crowded_widget_fails() {
    let harness = TouchHarness::new(400.0, 400.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    harness.add_widget(widget, Rect::new(0.0, 0.0, 10.0, 10.0));
    harness.add_widget(widget, Rect::new(0.0, 0.0, 10.0, 10.0));
    let result = ScrollView::attach(harness.window(), widget, ScrollViewConfig::default());
    assert!(matches!(
        result,
        Err(ConfigError::TooManyChildren { count: 2, .. })
    ));
}

#[test]
fn scroll_to_widget_only_accepts_descendants_of_the_content() {
    let mut scroller = tall_column();
    let view = scroller.view.widget();
    assert!(matches!(
        scroller.view.scroll_to_widget(scroller.content),
        Err(ConfigError::NotADescendant { .. })
    ));
    assert!(matches!(
        scroller.view.scroll_to_widget(view),
        Err(ConfigError::NotADescendant { .. })
    ));

    let row = scroller
        .harness
        .add_widget(scroller.content, Rect::new(0.0, 200.0, 100.0, 50.0));
    assert_eq!(scroller.view.scroll_to_widget(row), Ok(()));
    scroller.harness.advance(3.0);
    let bounds = scroller.view.content_bounds();
    let y = scroller.view.content_pos().y;
    assert!(y < 0.0, "the content moved up to reveal the row, got {y}");
    assert!(y >= bounds.min.y - 0.5);
}

#[test]
fn dragging_moves_the_content_and_flings_within_bounds() {
    let mut scroller = tall_column();

    let session = scroller.harness.down(1, 50.0, 50.0);
    scroller.harness.glide(1, 50.0, 10.0, 4, 0.08);
    assert!(session.is_claimed());
    assert_eq!(scroller.view.content_pos(), Point::new(0.0, -40.0));

    scroller.harness.up(1, 50.0, 10.0);
    assert!(scroller.view.is_animating(), "the release keeps its momentum");
    scroller.harness.advance(4.0);

    assert!(!scroller.view.is_animating());
    let bounds = scroller.view.content_bounds();
    let y = scroller.view.content_pos().y;
    assert!(y < -40.0, "momentum carried the content further, got {y}");
    assert!(y >= bounds.min.y - 0.5 && y <= bounds.max.y, "came to rest inside, got {y}");
}

#[test]
fn a_slow_touch_is_left_to_the_children() {
    let mut scroller = tall_column();

    let session = scroller.harness.down(1, 50.0, 50.0);
    scroller.harness.advance(0.3);
    scroller.harness.glide(1, 50.0, 10.0, 4, 0.08);

    assert!(!session.is_claimed(), "the scroll timeout passed before any movement");
    assert_eq!(scroller.view.content_pos(), Point::ZERO);
    scroller.harness.up(1, 50.0, 10.0);
}

#[test]
fn wheel_notches_scroll_a_fixed_distance() {
    let mut scroller = tall_column();

    scroller.harness.wheel(1, 50.0, 50.0, MouseButton::ScrollDown);
    assert_eq!(scroller.view.content_pos(), Point::new(0.0, -20.0));

    scroller.harness.wheel(2, 50.0, 50.0, MouseButton::ScrollUp);
    assert_eq!(scroller.view.content_pos(), Point::ZERO);

    scroller.harness.wheel(3, 50.0, 50.0, MouseButton::ScrollUp);
    assert_eq!(scroller.view.content_pos(), Point::ZERO, "already at the top");
}

#[test]
fn content_is_hidden_outside_the_view() {
    let scroller = tall_column();
    let tree = scroller.harness.tree();
    assert!(tree.is_visible_at(scroller.content, Point::new(50.0, 50.0)));
    assert!(!tree.is_visible_at(scroller.content, Point::new(50.0, 150.0)));
}

#[test]
fn scroll_by_distance_travels_and_momentum_can_be_stopped() {
    let mut scroller = tall_column();

    scroller.view.scroll_by_distance(None, Some(-100.0));
    assert!(scroller.view.is_animating());
    scroller.harness.advance(4.0);
    let y = scroller.view.content_pos().y;
    assert!(y < -50.0 && y >= -200.5, "travelled about 100 px, got {y}");
    assert_eq!(scroller.view.content_pos().x, 0.0);

    scroller.view.scroll_by_distance(None, Some(100.0));
    scroller.harness.advance(0.05);
    scroller.view.stop_scroll_momentum();
    scroller.harness.settle();
    assert!(!scroller.view.is_animating());
    let stopped = scroller.view.content_pos();
    scroller.harness.advance(0.5);
    assert_eq!(scroller.view.content_pos(), stopped);
}

/// A tall column whose vertical effect the test can inspect.
fn tall_column_with_effect(
    effect: SharedEffect,
    do_overscroll_y: bool,
) -> (TouchHarness, ScrollView) {
    let harness = TouchHarness::new(400.0, 400.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let view = ScrollView::attach(
        harness.window(),
        widget,
        ScrollViewConfig {
            effect_y: Some(effect),
            do_overscroll_y,
            ..ScrollViewConfig::default()
        },
    )
    .expect("no children yet");
    let content = harness.tree().create_widget(Rect::new(0.0, 0.0, 100.0, 300.0));
    harness
        .tree()
        .set_size_hint(content, SizeHint::new(Some(1.0), None))
        .expect("content exists");
    view.set_content(content).expect("view is empty");
    harness.settle();
    (harness, view)
}

#[test]
fn pausing_before_the_release_leaves_no_momentum() {
    let effect = shared_effect(DampedScrollEffect::default());
    let (mut harness, view) = tall_column_with_effect(effect.clone(), true);

    harness.down(1, 50.0, 90.0);
    harness.glide(1, 50.0, 50.0, 4, 0.06);
    harness.advance(0.5);
    harness.up(1, 50.0, 50.0);

    assert_eq!(effect.borrow().state().velocity, 0.0, "the burst is outside the trailing window");
    harness.advance(1.0);
    assert_eq!(view.content_pos(), Point::new(0.0, -40.0));
}

#[test]
fn release_velocity_uses_only_the_latest_moves() {
    let effect = shared_effect(DampedScrollEffect::default());
    let (mut harness, _view) = tall_column_with_effect(effect.clone(), true);

    harness.down(1, 50.0, 90.0);
    // Twelve 5 px moves, one every 10 ms.
    harness.glide(1, 50.0, 30.0, 12, 0.12);
    harness.up(1, 50.0, 30.0);

    // The last four moves travel 20 px in 30 ms. The whole gesture would
    // average 60 px over 120 ms.
    let velocity = effect.borrow().state().velocity;
    assert!((velocity + 20.0 / 0.03).abs() < 1.0, "got {velocity}");
}

#[test]
fn a_custom_damped_effect_cannot_overscroll_a_clamped_axis() {
    let effect = shared_effect(DampedScrollEffect::default());
    let (mut harness, view) = tall_column_with_effect(effect.clone(), false);

    view.scroll_by_distance(None, Some(150.0));
    let mut highest = f32::MIN;
    for _ in 0..120 {
        harness.advance(FRAME_SECS);
        highest = highest.max(view.content_pos().y);
    }

    assert_eq!(highest, 0.0, "the content stops at the top edge");
    assert_eq!(effect.borrow().state().value, 0.0);
    assert!(!view.is_animating());
}
