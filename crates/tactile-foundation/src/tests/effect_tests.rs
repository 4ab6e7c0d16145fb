use crate::effects::{
    shared_effect, DampedScrollEffect, EffectDriver, EffectState, NoEffect, ScrollEffect,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tactile_core::{secs_to_nanos, DefaultScheduler, Runtime};

const FRAME: f32 = 1.0 / 60.0;

fn damped_at(value: f32, velocity: f32) -> DampedScrollEffect {
    let mut effect = DampedScrollEffect::new();
    effect.state = EffectState {
        value,
        min: 0.0,
        max: 100.0,
        velocity,
    };
    effect
}

#[test]
fn damped_effect_springs_back_from_below_min() {
    let mut effect = damped_at(-5.0, 0.0);
    let mut previous = effect.overscroll().abs();
    let mut settled = false;
    for _ in 0..600 {
        if !effect.update(FRAME) {
            settled = true;
            break;
        }
        let overscroll = effect.overscroll().abs();
        assert!(
            overscroll < previous,
            "overscroll must shrink every frame: {overscroll} after {previous}"
        );
        previous = overscroll;
    }
    assert!(settled, "effect never settled: {:?}", effect.state);
    assert_eq!(effect.state.value, 0.0);
    assert_eq!(effect.state.velocity, 0.0);
}

#[test]
fn damped_effect_springs_back_from_above_max() {
    let mut effect = damped_at(130.0, 0.0);
    for _ in 0..600 {
        if !effect.update(FRAME) {
            break;
        }
    }
    assert_eq!(effect.state.value, 100.0);
    assert_eq!(effect.state.velocity, 0.0);
}

#[test]
fn damped_effect_at_rest_inside_bounds_settles_immediately() {
    let mut effect = damped_at(40.0, 5.0);
    assert!(!effect.update(FRAME));
    assert_eq!(effect.state.value, 40.0);
    assert_eq!(effect.state.velocity, 0.0);
}

#[test]
fn damped_fling_overshoots_then_returns() {
    let mut effect = damped_at(90.0, 2000.0);
    let mut max_seen = effect.state.value;
    for _ in 0..1200 {
        let keep_going = effect.update(FRAME);
        max_seen = max_seen.max(effect.state.value);
        if !keep_going {
            break;
        }
    }
    assert!(max_seen > 100.0, "a fast fling should overscroll, peaked at {max_seen}");
    assert_eq!(effect.state.value, 100.0);
}

#[test]
fn no_effect_ignores_scroll_requests() {
    let mut effect = NoEffect::default();
    effect.state.value = 12.0;
    effect.scroll_by(100.0);
    effect.scroll_to(50.0);
    assert!(!effect.update(FRAME));
    assert_eq!(effect.state.value, 12.0);
    assert_eq!(effect.state.velocity, 0.0);
    assert!(effect.is_inert());
}

#[test]
fn driver_ticks_until_the_effect_settles() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let effect = shared_effect(damped_at(-20.0, 0.0));
    let last_value = Rc::new(Cell::new(f32::NAN));
    let driver = {
        let last_value = Rc::clone(&last_value);
        EffectDriver::new(&runtime.frame_clock(), Rc::clone(&effect), move |value| {
            last_value.set(value)
        })
    };
    driver.activate();
    assert!(driver.is_active());

    let mut time = 0.0;
    for _ in 0..600 {
        time += 1.0 / 60.0;
        runtime.drain_frame_callbacks(secs_to_nanos(time));
        runtime.drain_ui();
        if !driver.is_active() {
            break;
        }
    }
    assert!(!driver.is_active(), "driver should stop once settled");
    assert_eq!(last_value.get(), 0.0);
    assert_eq!(effect.borrow().state().value, 0.0);
}

#[test]
fn inert_effect_never_activates() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let driver = EffectDriver::new(&runtime.frame_clock(), shared_effect(NoEffect::default()), |_| {});
    driver.activate();
    assert!(!driver.is_active());
}
