use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

const BACK_OVERSHOOT: f32 = 1.70158;
const ELASTIC_PERIOD: f32 = 0.3;

/// Easing curve mapping linear progress in `[0, 1]` to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Transition {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
    InElastic,
    OutElastic,
    InOutElastic,
}

const NAMES: &[(&str, Transition)] = &[
    ("linear", Transition::Linear),
    ("in_quad", Transition::InQuad),
    ("out_quad", Transition::OutQuad),
    ("in_out_quad", Transition::InOutQuad),
    ("in_cubic", Transition::InCubic),
    ("out_cubic", Transition::OutCubic),
    ("in_out_cubic", Transition::InOutCubic),
    ("in_quart", Transition::InQuart),
    ("out_quart", Transition::OutQuart),
    ("in_out_quart", Transition::InOutQuart),
    ("in_quint", Transition::InQuint),
    ("out_quint", Transition::OutQuint),
    ("in_out_quint", Transition::InOutQuint),
    ("in_sine", Transition::InSine),
    ("out_sine", Transition::OutSine),
    ("in_out_sine", Transition::InOutSine),
    ("in_expo", Transition::InExpo),
    ("out_expo", Transition::OutExpo),
    ("in_out_expo", Transition::InOutExpo),
    ("in_circ", Transition::InCirc),
    ("out_circ", Transition::OutCirc),
    ("in_out_circ", Transition::InOutCirc),
    ("in_back", Transition::InBack),
    ("out_back", Transition::OutBack),
    ("in_out_back", Transition::InOutBack),
    ("in_bounce", Transition::InBounce),
    ("out_bounce", Transition::OutBounce),
    ("in_out_bounce", Transition::InOutBounce),
    ("in_elastic", Transition::InElastic),
    ("out_elastic", Transition::OutElastic),
    ("in_out_elastic", Transition::InOutElastic),
];

impl Transition {
    pub fn name(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, transition)| transition == self)
            .map(|(name, _)| *name)
            .unwrap_or("linear")
    }

    /// Eased value for `progress`, which is clamped to `[0, 1]` first.
    ///
    /// The endpoints map to themselves. Back and elastic curves overshoot in
    /// between.
    pub fn transform(&self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Transition::Linear => p,
            Transition::InQuad => p * p,
            Transition::OutQuad => -p * (p - 2.0),
            Transition::InOutQuad => in_out(p, |q| q * q),
            Transition::InCubic => p.powi(3),
            Transition::OutCubic => (p - 1.0).powi(3) + 1.0,
            Transition::InOutCubic => in_out(p, |q| q.powi(3)),
            Transition::InQuart => p.powi(4),
            Transition::OutQuart => 1.0 - (p - 1.0).powi(4),
            Transition::InOutQuart => in_out(p, |q| q.powi(4)),
            Transition::InQuint => p.powi(5),
            Transition::OutQuint => (p - 1.0).powi(5) + 1.0,
            Transition::InOutQuint => in_out(p, |q| q.powi(5)),
            Transition::InSine => 1.0 - (p * PI / 2.0).cos(),
            Transition::OutSine => (p * PI / 2.0).sin(),
            Transition::InOutSine => -0.5 * ((PI * p).cos() - 1.0),
            Transition::InExpo => in_expo(p),
            Transition::OutExpo => 1.0 - in_expo(1.0 - p),
            Transition::InOutExpo => in_out(p, in_expo),
            Transition::InCirc => 1.0 - (1.0 - p * p).sqrt(),
            Transition::OutCirc => (1.0 - (p - 1.0).powi(2)).sqrt(),
            Transition::InOutCirc => in_out(p, |q| 1.0 - (1.0 - q * q).sqrt()),
            Transition::InBack => in_back(p, BACK_OVERSHOOT),
            Transition::OutBack => 1.0 - in_back(1.0 - p, BACK_OVERSHOOT),
            Transition::InOutBack => in_out(p, |q| in_back(q, BACK_OVERSHOOT * 1.525)),
            Transition::InBounce => 1.0 - out_bounce(1.0 - p),
            Transition::OutBounce => out_bounce(p),
            Transition::InOutBounce => in_out(p, |q| 1.0 - out_bounce(1.0 - q)),
            Transition::InElastic => in_elastic(p, ELASTIC_PERIOD),
            Transition::OutElastic => 1.0 - in_elastic(1.0 - p, ELASTIC_PERIOD),
            Transition::InOutElastic => in_out(p, |q| in_elastic(q, ELASTIC_PERIOD * 1.5)),
        }
    }
}

/// Mirrors an ease-in curve into an ease-in-out one.
fn in_out(p: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    if p < 0.5 {
        0.5 * ease_in(p * 2.0)
    } else {
        1.0 - 0.5 * ease_in((1.0 - p) * 2.0)
    }
}

fn in_expo(p: f32) -> f32 {
    if p <= 0.0 {
        0.0
    } else {
        2f32.powf(10.0 * (p - 1.0))
    }
}

fn in_back(p: f32, overshoot: f32) -> f32 {
    p * p * ((overshoot + 1.0) * p - overshoot)
}

fn out_bounce(p: f32) -> f32 {
    const K: f32 = 7.5625;
    if p < 1.0 / 2.75 {
        K * p * p
    } else if p < 2.0 / 2.75 {
        let q = p - 1.5 / 2.75;
        K * q * q + 0.75
    } else if p < 2.5 / 2.75 {
        let q = p - 2.25 / 2.75;
        K * q * q + 0.9375
    } else {
        let q = p - 2.625 / 2.75;
        K * q * q + 0.984375
    }
}

fn in_elastic(p: f32, period: f32) -> f32 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    let shift = period / 4.0;
    let q = p - 1.0;
    -(2f32.powf(10.0 * q) * ((q - shift) * (2.0 * PI) / period).sin())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransitionError(pub String);

impl fmt::Display for ParseTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transition '{}'", self.0)
    }
}

impl std::error::Error for ParseTransitionError {}

impl FromStr for Transition {
    type Err = ParseTransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, transition)| *transition)
            .ok_or_else(|| ParseTransitionError(s.to_owned()))
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
