use super::{EffectState, ScrollEffect};

/// Kinetic scrolling that may overshoot the bounds and springs back.
#[derive(Clone, Debug, PartialEq)]
pub struct DampedScrollEffect {
    pub state: EffectState,
    pub min_velocity: f32,
    /// Overscroll below this distance counts as settled.
    pub min_overscroll: f32,
    pub friction: f32,
    pub std_dt: f32,
    /// Extra velocity damping applied while overscrolled.
    pub edge_damping: f32,
    pub spring_constant: f32,
}

impl Default for DampedScrollEffect {
    fn default() -> Self {
        Self {
            state: EffectState::default(),
            min_velocity: 16.0,
            min_overscroll: 1.0,
            friction: 0.05,
            std_dt: 0.017,
            edge_damping: 0.25,
            spring_constant: 1.6,
        }
    }
}

impl DampedScrollEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed distance past the nearest bound, zero inside the bounds.
    pub fn overscroll(&self) -> f32 {
        overscroll_of(self.state.value, self.state.min, self.state.max)
    }
}

fn overscroll_of(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        value - min
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Rebound {
    TowardMin,
    TowardMax,
}

impl ScrollEffect for DampedScrollEffect {
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
        let keep_going = 'step: {
            let overscroll = overscroll_of(value, min, max);
            if overscroll == 0.0 && velocity.abs() <= self.min_velocity {
                velocity = 0.0;
                break 'step false;
            }

            let mut total_force = velocity * self.friction / self.std_dt * dt;
            if overscroll.abs() > self.min_overscroll {
                total_force += velocity * self.edge_damping;
                total_force += overscroll * self.spring_constant;
            }
            let rebound = if overscroll > 0.0 && velocity < 0.0 {
                Some(Rebound::TowardMax)
            } else if overscroll < 0.0 && velocity > 0.0 {
                Some(Rebound::TowardMin)
            } else {
                None
            };
            velocity -= total_force;
            value += velocity * dt;

            // Coming back from an overscroll must not carry past the bound.
            if rebound == Some(Rebound::TowardMin) && value > min {
                velocity = 0.0;
                value = min;
                break 'step false;
            }
            if rebound == Some(Rebound::TowardMax) && value < max {
                velocity = 0.0;
                value = max;
                break 'step false;
            }

            if velocity.abs() <= self.min_velocity {
                let overscroll = overscroll_of(value, min, max);
                if overscroll.abs() <= self.min_overscroll {
                    velocity = 0.0;
                    if overscroll > 0.0 {
                        value = max;
                    } else if overscroll < 0.0 {
                        value = min;
                    }
                    break 'step false;
                }
            }
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
