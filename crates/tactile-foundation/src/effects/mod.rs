//! Per-axis scroll integrators.
//!
//! An effect owns the position of one scrolling axis between frames: the
//! scrollview hands it a velocity on release and reads the value back every
//! frame until the effect settles.

mod damped;
mod no;
mod scroll;

pub use damped::DampedScrollEffect;
pub use no::NoEffect;
pub use scroll::PlainScrollEffect;

use std::cell::RefCell;
use std::rc::Rc;
use tactile_core::{FrameClock, Ticker};

/// Position, soft bounds and velocity of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectState {
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub velocity: f32,
}

pub trait ScrollEffect {
    fn state(&self) -> &EffectState;

    fn state_mut(&mut self) -> &mut EffectState;

    /// Integrates one frame of `dt` seconds. Returns `false` once the effect
    /// has settled and no longer needs frames.
    fn update(&mut self, dt: f32) -> bool;

    /// Sets the velocity so that the effect travels roughly `distance`.
    fn scroll_by(&mut self, distance: f32);

    /// Sets the velocity so that the effect comes to rest near `value`.
    fn scroll_to(&mut self, value: f32) {
        let distance = value - self.state().value;
        self.scroll_by(distance);
    }

    /// Inert effects never request frames.
    fn is_inert(&self) -> bool {
        false
    }
}

pub type SharedEffect = Rc<RefCell<dyn ScrollEffect>>;

pub fn shared_effect(effect: impl ScrollEffect + 'static) -> SharedEffect {
    Rc::new(RefCell::new(effect))
}

/// Runs an effect once per frame while activated.
///
/// A deactivated driver holds no frame registration, so an idle axis costs
/// nothing.
pub(crate) struct EffectDriver {
    effect: SharedEffect,
    ticker: Ticker,
}

impl EffectDriver {
    pub(crate) fn new(clock: &FrameClock, effect: SharedEffect, on_value: impl Fn(f32) + 'static) -> Self {
        let ticking = Rc::clone(&effect);
        let ticker = clock.ticker(move |dt| {
            let (keep_going, value) = match ticking.try_borrow_mut() {
                Ok(mut effect) => {
                    let keep_going = effect.update(dt);
                    (keep_going, effect.state().value)
                }
                Err(_) => return true,
            };
            log::trace!("effect tick dt={dt:.4} value={value:.2} keep_going={keep_going}");
            on_value(value);
            keep_going
        });
        Self { effect, ticker }
    }

    pub(crate) fn effect(&self) -> &SharedEffect {
        &self.effect
    }

    pub(crate) fn activate(&self) {
        if self.effect.borrow().is_inert() {
            return;
        }
        self.ticker.start();
    }

    pub(crate) fn deactivate(&self) {
        self.ticker.stop();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.ticker.is_active()
    }
}

impl Drop for EffectDriver {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}
