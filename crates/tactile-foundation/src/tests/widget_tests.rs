use crate::widget::{
    restore_widget_state, save_widget_state, LocalFrame, Placement, PosHint, SizeHint,
    WidgetId, WidgetProperty, WidgetTree,
};
use crate::ConfigError;
use std::cell::RefCell;
use std::rc::Rc;
use tactile_ui_graphics::{Point, Rect};

#[test]
fn add_widget_moves_a_child_between_parents() {
    let tree = WidgetTree::new();
    let first = tree.create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    let second = tree.create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    let child = tree.create_widget(Rect::new(0.0, 0.0, 1.0, 1.0));
    tree.add_widget(first, child, 0).expect("both exist");
    tree.add_widget(second, child, 99).expect("both exist");

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), vec![child]);
    assert_eq!(tree.parent(child), Some(second));
}

#[test]
fn index_zero_is_top_most() {
    let tree = WidgetTree::new();
    let parent = tree.root();
    let a = tree.create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = tree.create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    tree.add_widget(parent, a, 0).expect("exists");
    tree.add_widget(parent, b, 0).expect("exists");
    assert_eq!(tree.children(parent), vec![b, a]);
    assert_eq!(tree.child_at(parent, Point::new(5.0, 5.0)), Some(b));
    assert_eq!(tree.index_of(a), Some(1));
}

#[test]
fn unknown_widgets_are_reported() {
    let tree = WidgetTree::new();
    let stranger = WidgetId(9_999);
    let widget = tree.create_widget(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(
        tree.add_widget(stranger, widget, 0),
        Err(ConfigError::UnknownWidget(stranger))
    );
    assert_eq!(tree.set_opacity(stranger, 0.5), Err(ConfigError::UnknownWidget(stranger)));
    assert_eq!(tree.parent(widget), None);
    assert_eq!(tree.opacity(stranger), 1.0, "reads of unknown widgets fall back to defaults");
}

#[test]
fn observation_stops_when_dropped() {
    let tree = WidgetTree::new();
    let widget = tree.create_widget(Rect::new(0.0, 0.0, 10.0, 10.0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let observation = {
        let seen = Rc::clone(&seen);
        tree.observe(widget, &[WidgetProperty::Size], move |_, property| {
            seen.borrow_mut().push(property)
        })
    };
    tree.set_width(widget, 20.0).expect("exists");
    tree.set_width(widget, 20.0).expect("exists");
    tree.set_pos(widget, Point::new(3.0, 3.0)).expect("exists");
    assert_eq!(*seen.borrow(), vec![WidgetProperty::Size], "only changes are reported");

    drop(observation);
    tree.set_width(widget, 30.0).expect("exists");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn coordinates_round_trip_through_relative_frames() {
    let tree = WidgetTree::new();
    let outer = tree.create_widget(Rect::new(50.0, 50.0, 200.0, 200.0));
    let inner = tree.create_widget(Rect::new(10.0, 20.0, 100.0, 100.0));
    let leaf = tree.create_widget(Rect::new(5.0, 5.0, 10.0, 10.0));
    tree.add_widget(tree.root(), outer, 0).expect("exists");
    tree.add_widget(outer, inner, 0).expect("exists");
    tree.add_widget(inner, leaf, 0).expect("exists");
    tree.set_frame(outer, LocalFrame::Relative { offset: Point::ZERO }).expect("exists");
    tree.set_frame(inner, LocalFrame::Relative { offset: Point::new(0.0, -30.0) })
        .expect("exists");

    let window_point = Point::new(70.0, 50.0);
    let local = tree.to_widget(inner, window_point);
    assert_eq!(local, Point::new(10.0, 10.0));
    assert_eq!(tree.to_window(leaf, local), window_point);
    assert_eq!(tree.to_parent_space(leaf, window_point), local);
}

#[test]
fn clipping_ancestors_hide_overflowing_children() {
    let tree = WidgetTree::new();
    let viewport = tree.create_widget(Rect::new(0.0, 0.0, 100.0, 100.0));
    let content = tree.create_widget(Rect::new(0.0, 0.0, 100.0, 300.0));
    tree.add_widget(tree.root(), viewport, 0).expect("exists");
    tree.add_widget(viewport, content, 0).expect("exists");
    tree.set_clips(viewport, true).expect("exists");

    assert!(tree.is_visible_at(content, Point::new(50.0, 50.0)));
    assert!(!tree.is_visible_at(content, Point::new(50.0, 250.0)));
    tree.detach(viewport);
    assert!(!tree.is_visible_at(content, Point::new(50.0, 50.0)), "detached widgets are never visible");
}

#[test]
fn widget_state_restores_geometry_and_placement() {
    let tree = WidgetTree::new();
    let list = tree.create_widget(Rect::new(0.0, 0.0, 100.0, 300.0));
    let first = tree.create_widget(Rect::new(0.0, 0.0, 100.0, 50.0));
    let second = tree.create_widget(Rect::new(0.0, 50.0, 100.0, 50.0));
    tree.add_widget(list, first, 0).expect("exists");
    tree.add_widget(list, second, 0).expect("exists");
    tree.set_size_hint(first, SizeHint::new(Some(1.0), None)).expect("exists");
    tree.set_pos_hint(first, PosHint { center_x: Some(0.5), ..PosHint::default() })
        .expect("exists");

    let state = save_widget_state(&tree, first, false);
    assert_eq!(state.placement, Some(Placement::Child { parent: list, index: 1 }));

    tree.detach(first);
    tree.set_size_hint(first, SizeHint::default()).expect("exists");
    tree.set_pos_hint(first, PosHint::default()).expect("exists");
    tree.set_rect(first, Rect::new(300.0, 300.0, 10.0, 10.0)).expect("exists");

    restore_widget_state(&tree, first, &state, false).expect("list still exists");
    assert_eq!(tree.rect(first), Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(tree.size_hint(first), SizeHint::new(Some(1.0), None));
    assert_eq!(tree.pos_hint(first).center_x, Some(0.5));
    assert_eq!(tree.children(list), vec![second, first]);
}
