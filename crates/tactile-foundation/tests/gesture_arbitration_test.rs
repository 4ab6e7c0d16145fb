//! Taps, multi-taps and switches driven through a real window.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tactile_foundation::prelude::*;
use tactile_testing::TouchHarness;
use tactile_ui_graphics::{Point, Rect};

fn count_taps(recognizer: &TapRecognizer) -> Rc<Cell<usize>> {
    let taps = Rc::new(Cell::new(0));
    let counter = Rc::clone(&taps);
    recognizer.on_tap(move |_| counter.set(counter.get() + 1));
    taps
}

#[test]
fn release_inside_the_widget_is_a_single_tap() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 50.0, 50.0));
    let recognizer = TapRecognizer::attach(harness.window(), widget, TapConfig::default());
    let taps = count_taps(&recognizer);
    harness.settle();

    harness.down(1, 25.0, 25.0);
    assert_eq!(taps.get(), 0, "nothing happens before the release");
    harness.advance(0.05);
    harness.up(1, 40.0, 40.0);

    assert_eq!(taps.get(), 1);
}

#[test]
fn release_outside_the_widget_is_not_a_tap() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 50.0, 50.0));
    let recognizer = TapRecognizer::attach(harness.window(), widget, TapConfig::default());
    let taps = count_taps(&recognizer);
    harness.settle();

    harness.down(1, 25.0, 25.0);
    harness.up(1, 150.0, 150.0);

    assert_eq!(taps.get(), 0);
}

#[test]
fn a_drag_claiming_on_touch_down_suppresses_the_tap() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 50.0, 50.0));
    let recognizer = TapRecognizer::attach(harness.window(), widget, TapConfig::default());
    let taps = count_taps(&recognizer);
    let draggable = Draggable::attach(
        harness.window(),
        widget,
        DraggableConfig {
            drag_timeout: 0.0,
            ..DraggableConfig::default()
        },
    );
    harness.settle();

    let session = harness.down(1, 25.0, 25.0);
    assert!(session.is_claimed());
    assert!(draggable.is_being_dragged());
    harness.up(1, 25.0, 25.0);
    harness.advance(0.3);

    assert_eq!(taps.get(), 0, "the touch belonged to the drag");
    assert!(!draggable.is_being_dragged());
}

#[test]
fn disabled_widgets_do_not_recognize_taps() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 50.0, 50.0));
    let recognizer = TapRecognizer::attach(harness.window(), widget, TapConfig::default());
    let taps = count_taps(&recognizer);
    harness.tree().set_disabled(widget, true).expect("widget exists");
    harness.settle();

    harness.tap(1, 10.0, 10.0);
    assert_eq!(taps.get(), 0);

    harness.tree().set_disabled(widget, false).expect("widget exists");
    harness.settle();
    harness.tap(2, 10.0, 10.0);
    assert_eq!(taps.get(), 1);
}

#[test]
fn multi_tap_reports_the_sequence_once_the_interval_passes() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let recognizer = MultiTapRecognizer::attach(
        harness.window(),
        widget,
        MultiTapConfig {
            tap_max_count: 7,
            ..MultiTapConfig::default()
        },
    )
    .expect("valid config");
    let counts = Rc::new(RefCell::new(Vec::new()));
    {
        let counts = Rc::clone(&counts);
        recognizer.on_multi_tap(move |sequence| counts.borrow_mut().push(sequence.count));
    }
    harness.settle();

    for id in 1..=3 {
        harness.tap(id, 50.0, 50.0);
        harness.advance(0.05);
    }
    assert!(counts.borrow().is_empty(), "the sequence may still grow");
    harness.advance(0.5);
    assert_eq!(*counts.borrow(), vec![3]);

    harness.tap(4, 50.0, 50.0);
    harness.advance(0.5);
    assert_eq!(*counts.borrow(), vec![3, 1], "a late tap starts a new sequence");
}

#[test]
fn multi_tap_stops_at_the_maximum_count() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let recognizer = MultiTapRecognizer::attach(harness.window(), widget, MultiTapConfig::default())
        .expect("valid config");
    let counts = Rc::new(RefCell::new(Vec::new()));
    {
        let counts = Rc::clone(&counts);
        recognizer.on_multi_tap(move |sequence| counts.borrow_mut().push(sequence.count));
    }
    harness.settle();

    harness.tap(1, 50.0, 50.0);
    harness.tap(2, 50.0, 50.0);
    assert_eq!(*counts.borrow(), vec![2], "reaching the maximum emits right away");
}

#[test]
fn multi_tap_rejects_a_zero_maximum() {
    let harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let result = MultiTapRecognizer::attach(
        harness.window(),
        widget,
        MultiTapConfig {
            tap_max_count: 0,
            ..MultiTapConfig::default()
        },
    );
    assert!(matches!(result, Err(ConfigError::InvalidTapMaxCount(0))));
}

#[test]
fn switch_toggles_only_when_the_track_is_tapped() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 50.0));
    let switch = Switch::attach(harness.window(), widget, SwitchConfig::default());
    let changes = Rc::new(RefCell::new(Vec::new()));
    {
        let changes = Rc::clone(&changes);
        switch.on_active(move |active| changes.borrow_mut().push(*active));
    }
    harness.settle();

    harness.tap(1, 50.0, 25.0);
    assert!(switch.is_active());
    assert_eq!(switch.track_color(), SwitchColors::default().track_active);

    harness.tap(2, 5.0, 5.0);
    assert!(switch.is_active(), "the corner lies outside the track");

    harness.tap(3, 60.0, 30.0);
    assert!(!switch.is_active());
    assert_eq!(*changes.borrow(), vec![true, false]);
}

#[test]
fn ripple_grows_while_pressed_and_fades_after_release() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let ripple = TouchRipple::attach(harness.window(), widget, RippleConfig::default());
    harness.settle();

    harness.down(1, 50.0, 50.0);
    let ripples = ripple.ripples();
    assert_eq!(ripples.len(), 1);
    assert_eq!(ripples[0].center, Point::new(50.0, 50.0));
    let initial = ripples[0].diameter;

    harness.advance(0.15);
    assert!(ripple.ripples()[0].diameter > initial);

    harness.up(1, 50.0, 50.0);
    harness.advance(0.1);
    let fading = ripple.ripples();
    assert_eq!(fading.len(), 1);
    assert!(fading[0].color.a() < RippleConfig::default().color.a());

    harness.advance(0.3);
    assert!(ripple.ripples().is_empty(), "faded ripples are removed");
}

#[test]
fn button_taps_and_follows_its_disabled_state() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 40.0));
    let button = Button::attach(
        harness.window(),
        widget,
        RippleConfig::default(),
        TapConfig::default(),
    );
    let taps = count_taps(button.tap());
    harness.settle();

    harness.tap(1, 20.0, 20.0);
    assert_eq!(taps.get(), 1);
    assert_eq!(button.background(), ButtonColors::default().background);

    harness.tree().set_disabled(widget, true).expect("widget exists");
    harness.settle();
    harness.tap(2, 20.0, 20.0);
    assert_eq!(taps.get(), 1);
    assert_eq!(button.background(), ButtonColors::default().background_disabled);
}

#[test]
fn recognizers_only_listen_while_attached_to_the_tree() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.tree().create_widget(Rect::new(0.0, 0.0, 50.0, 50.0));
    let recognizer = TapRecognizer::attach(harness.window(), widget, TapConfig::default());
    harness.settle();
    assert!(!recognizer.is_listening());

    let root = harness.window().root();
    harness.tree().add_widget(root, widget, 0).expect("root exists");
    harness.settle();
    assert!(recognizer.is_listening());

    let taps = count_taps(&recognizer);
    harness.tap(1, 10.0, 10.0);
    assert_eq!(taps.get(), 1);
}

#[test]
fn multi_tap_button_counts_taps_and_ripples() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 40.0));
    let button = MultiTapButton::attach(
        harness.window(),
        widget,
        RippleConfig::default(),
        MultiTapConfig::default(),
    )
    .expect("valid config");
    let counts = Rc::new(RefCell::new(Vec::new()));
    {
        let counts = Rc::clone(&counts);
        button.on_multi_tap(move |sequence| counts.borrow_mut().push(sequence.count));
    }
    harness.settle();

    harness.down(1, 20.0, 20.0);
    assert_eq!(button.ripple().ripples().len(), 1);
    harness.up(1, 20.0, 20.0);
    harness.tap(2, 20.0, 20.0);

    assert_eq!(*counts.borrow(), vec![2]);
    assert_eq!(button.background(), ButtonColors::default().background);
}

/// A 100x100 scrollview over a 100x300 column holding one 100x50 row at
/// the top.
fn row_in_a_scrollview(harness: &TouchHarness) -> (ScrollView, WidgetId, WidgetId) {
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let view = ScrollView::attach(harness.window(), widget, ScrollViewConfig::default())
        .expect("no children yet");
    let content = harness.tree().create_widget(Rect::new(0.0, 0.0, 100.0, 300.0));
    harness
        .tree()
        .set_size_hint(content, SizeHint::new(Some(1.0), None))
        .expect("content exists");
    view.set_content(content).expect("view is empty");
    let row = harness.add_widget(content, Rect::new(0.0, 0.0, 100.0, 50.0));
    (view, content, row)
}

#[test]
fn a_quick_tap_inside_a_scrollview_belongs_to_the_row() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let (view, _, row) = row_in_a_scrollview(&harness);
    let recognizer = TapRecognizer::attach(harness.window(), row, TapConfig::default());
    let taps = count_taps(&recognizer);
    harness.settle();

    harness.tap(1, 50.0, 25.0);

    assert_eq!(taps.get(), 1);
    assert_eq!(view.content_pos(), Point::ZERO);
    assert!(!view.is_animating());
}

#[test]
fn scrolling_over_a_row_suppresses_its_tap() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let (view, _, row) = row_in_a_scrollview(&harness);
    let recognizer = TapRecognizer::attach(harness.window(), row, TapConfig::default());
    let taps = count_taps(&recognizer);
    harness.settle();

    let session = harness.down(1, 50.0, 40.0);
    harness.glide(1, 50.0, 0.0, 4, 0.08);
    assert!(session.is_claimed());
    harness.up(1, 50.0, 0.0);
    harness.advance(0.5);

    assert_eq!(taps.get(), 0, "the release still lands on the row");
    assert!(view.content_pos().y < 0.0);
}

#[test]
fn an_immediate_drag_inside_a_scrollview_keeps_the_content_still() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let (view, content, row) = row_in_a_scrollview(&harness);
    let draggable = Draggable::attach(
        harness.window(),
        row,
        DraggableConfig {
            drag_timeout: 0.0,
            ..DraggableConfig::default()
        },
    );
    harness.settle();

    let session = harness.down(1, 50.0, 25.0);
    assert!(session.is_claimed());
    harness.glide(1, 50.0, 85.0, 4, 0.08);
    assert!(draggable.is_being_dragged());
    assert_eq!(view.content_pos(), Point::ZERO);
    assert_eq!(harness.tree().pos(row), Point::new(0.0, 60.0));

    harness.up(1, 50.0, 85.0);
    harness.advance(0.3);
    assert!(!draggable.is_being_dragged());
    assert_eq!(harness.tree().parent(row), Some(content));
    assert_eq!(view.content_pos(), Point::ZERO);
}

#[test]
fn multi_tap_and_long_press_drag_never_share_a_touch() {
    let mut harness = TouchHarness::new(200.0, 200.0);
    let widget = harness.add_widget(harness.window().root(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let recognizer = MultiTapRecognizer::attach(harness.window(), widget, MultiTapConfig::default())
        .expect("valid config");
    let counts = Rc::new(RefCell::new(Vec::new()));
    {
        let counts = Rc::clone(&counts);
        recognizer.on_multi_tap(move |sequence| counts.borrow_mut().push(sequence.count));
    }
    let draggable = Draggable::attach(
        harness.window(),
        widget,
        DraggableConfig {
            drag_timeout: 0.2,
            ..DraggableConfig::default()
        },
    );
    harness.settle();

    harness.tap(1, 50.0, 50.0);
    harness.tap(2, 50.0, 50.0);
    assert_eq!(*counts.borrow(), vec![2]);
    assert_eq!(draggable.drag_state(), None, "quick taps never arm the drag");

    let session = harness.down(3, 50.0, 50.0);
    harness.advance(0.3);
    assert!(draggable.is_being_dragged());
    assert!(session.is_claimed());
    harness.up(3, 50.0, 50.0);
    harness.advance(0.5);

    assert_eq!(*counts.borrow(), vec![2], "the long press was no tap");
    assert!(!draggable.is_being_dragged());
}
