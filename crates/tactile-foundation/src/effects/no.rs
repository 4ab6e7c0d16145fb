use super::{EffectState, ScrollEffect};

/// An effect that never moves on its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoEffect {
    pub state: EffectState,
}

impl ScrollEffect for NoEffect {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn update(&mut self, _dt: f32) -> bool {
        false
    }

    fn scroll_by(&mut self, _distance: f32) {}

    fn scroll_to(&mut self, _value: f32) {}

    fn is_inert(&self) -> bool {
        true
    }
}
