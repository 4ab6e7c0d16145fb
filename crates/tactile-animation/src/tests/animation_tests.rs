use super::*;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tactile_core::{secs_to_nanos, DefaultScheduler, Runtime};
use tactile_ui_graphics::Point;

fn advance(runtime: &Runtime, secs: f64) {
    runtime.drain_frame_callbacks(secs_to_nanos(secs));
    runtime.drain_ui();
}

#[test]
fn every_curve_maps_endpoints_to_themselves() {
    let names = [
        "linear", "in_quad", "out_quad", "in_out_quad", "in_cubic", "out_cubic",
        "in_out_cubic", "in_quart", "out_quart", "in_out_quart", "in_quint", "out_quint",
        "in_out_quint", "in_sine", "out_sine", "in_out_sine", "in_expo", "out_expo",
        "in_out_expo", "in_circ", "out_circ", "in_out_circ", "in_back", "out_back",
        "in_out_back", "in_bounce", "out_bounce", "in_out_bounce", "in_elastic",
        "out_elastic", "in_out_elastic",
    ];
    for name in names {
        let transition: Transition = name.parse().expect("known curve");
        assert_eq!(transition.name(), name);
        assert!(
            transition.transform(0.0).abs() < 1e-3,
            "{name} should start at 0, got {}",
            transition.transform(0.0)
        );
        assert!(
            (transition.transform(1.0) - 1.0).abs() < 1e-3,
            "{name} should end at 1, got {}",
            transition.transform(1.0)
        );
    }
}

#[test]
fn quad_curves_match_closed_forms() {
    assert!((Transition::InQuad.transform(0.5) - 0.25).abs() < 1e-6);
    assert!((Transition::OutQuad.transform(0.5) - 0.75).abs() < 1e-6);
    assert!((Transition::InOutQuad.transform(0.25) - 0.125).abs() < 1e-6);
    assert!((Transition::InOutQuad.transform(0.75) - 0.875).abs() < 1e-6);
}

#[test]
fn back_curve_overshoots_below_zero() {
    assert!(Transition::InBack.transform(0.2) < 0.0);
    assert!(Transition::OutBack.transform(0.8) > 1.0);
}

#[test]
fn unknown_name_is_rejected() {
    let err = "wobble".parse::<Transition>().unwrap_err();
    assert_eq!(err, ParseTransitionError("wobble".into()));
    assert_eq!(err.to_string(), "unknown transition 'wobble'");
}

#[test]
fn tween_reports_progress_per_frame() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let handle = runtime.handle();
    let samples = Rc::new(RefCell::new(Vec::new()));

    {
        let samples = Rc::clone(&samples);
        let fut = tween(&handle, 0.4, Transition::Linear, move |p| {
            samples.borrow_mut().push(p)
        });
        handle.start_ui(fut);
    }

    advance(&runtime, 0.1);
    advance(&runtime, 0.2);
    advance(&runtime, 0.5);
    advance(&runtime, 0.6);

    let samples = samples.borrow();
    assert_eq!(samples.len(), 3, "tween should stop after reaching 1.0");
    assert!((samples[0] - 0.25).abs() < 1e-5);
    assert!((samples[1] - 0.5).abs() < 1e-5);
    assert_eq!(samples[2], 1.0);
}

#[test]
fn zero_duration_tween_completes_without_a_frame() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let handle = runtime.handle();
    let samples = Rc::new(RefCell::new(Vec::new()));

    {
        let samples = Rc::clone(&samples);
        let fut = tween(&handle, 0.0, Transition::OutCubic, move |p| {
            samples.borrow_mut().push(p)
        });
        handle.start_ui(fut);
    }

    assert_eq!(*samples.borrow(), vec![1.0]);
}

#[test]
fn lerp_interpolates_points() {
    let from = Point::new(0.0, 10.0);
    let to = Point::new(100.0, 20.0);
    assert_eq!(from.lerp(&to, 0.5), Point::new(50.0, 15.0));
}
