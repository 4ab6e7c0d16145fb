use super::{EffectState, ScrollEffect};

/// Kinetic scrolling that stops hard at the bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct PlainScrollEffect {
    pub state: EffectState,
    /// Below this speed the effect stops.
    pub min_velocity: f32,
    pub friction: f32,
    /// Frame time the friction is calibrated for.
    pub std_dt: f32,
}

impl Default for PlainScrollEffect {
    fn default() -> Self {
        Self {
            state: EffectState::default(),
            min_velocity: 16.0,
            friction: 0.05,
            std_dt: 0.017,
        }
    }
}

impl PlainScrollEffect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScrollEffect for PlainScrollEffect {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn update(&mut self, dt: f32) -> bool {
        let EffectState {
            mut value,
            min,
            max,
            mut velocity,
        } = self.state;
        velocity -= velocity * self.friction / self.std_dt * dt;
        value += velocity * dt;

        let keep_going = if value < min {
            velocity = 0.0;
            value = min;
            false
        } else if value > max {
            velocity = 0.0;
            value = max;
            false
        } else if velocity.abs() <= self.min_velocity {
            velocity = 0.0;
            false
        } else {
            true
        };
        self.state.value = value;
        self.state.velocity = velocity;
        keep_going
    }

    fn scroll_by(&mut self, distance: f32) {
        self.state.velocity = distance * self.friction / self.std_dt;
    }
}
