//! Easing curves for tweens.
//!
//! Curves map normalized progress `t ∈ [0, 1]` to eased progress. Names
//! follow the usual `easeInQuad` / `easeOutBounce` convention used by
//! animation descriptors.

use crate::error::FxError;
use std::f64::consts::PI;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
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
}

const BACK: f64 = 1.70158;

impl Easing {
    /// Eased progress for `t`, clamped to `[0, 1]` on input.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t).powi(2),
            Easing::InOutQuad => in_out(t, |x| x * x),
            Easing::InCubic => t.powi(3),
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => in_out(t, |x| x.powi(3)),
            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => in_out(t, |x| x.powi(4)),
            Easing::InSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::OutSine => (t * PI / 2.0).sin(),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::InExpo => expo_in(t),
            Easing::OutExpo => 1.0 - expo_in(1.0 - t),
            Easing::InOutExpo => in_out(t, expo_in),
            Easing::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::InOutCirc => in_out(t, |x| 1.0 - (1.0 - x * x).sqrt()),
            Easing::InBack => back_in(t),
            Easing::OutBack => 1.0 - back_in(1.0 - t),
            Easing::InOutBack => in_out(t, back_in),
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => in_out(t, |x| 1.0 - bounce_out(1.0 - x)),
        }
    }

    /// The descriptor name of this curve.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, e)| *e == self)
            .map_or("linear", |(name, _)| name)
    }
}

/// Symmetric in-out built from an "in" curve.
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0) / 2.0
    }
}

fn expo_in(t: f64) -> f64 {
    if t == 0.0 { 0.0 } else { 2f64.powf(10.0 * (t - 1.0)) }
}

fn back_in(t: f64) -> f64 {
    t * t * ((BACK + 1.0) * t - BACK)
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

const NAMES: [(&str, Easing); 25] = [
    ("linear", Easing::Linear),
    ("easeInQuad", Easing::InQuad),
    ("easeOutQuad", Easing::OutQuad),
    ("easeInOutQuad", Easing::InOutQuad),
    ("easeInCubic", Easing::InCubic),
    ("easeOutCubic", Easing::OutCubic),
    ("easeInOutCubic", Easing::InOutCubic),
    ("easeInQuart", Easing::InQuart),
    ("easeOutQuart", Easing::OutQuart),
    ("easeInOutQuart", Easing::InOutQuart),
    ("easeInSine", Easing::InSine),
    ("easeOutSine", Easing::OutSine),
    ("easeInOutSine", Easing::InOutSine),
    ("easeInExpo", Easing::InExpo),
    ("easeOutExpo", Easing::OutExpo),
    ("easeInOutExpo", Easing::InOutExpo),
    ("easeInCirc", Easing::InCirc),
    ("easeOutCirc", Easing::OutCirc),
    ("easeInOutCirc", Easing::InOutCirc),
    ("easeInBack", Easing::InBack),
    ("easeOutBack", Easing::OutBack),
    ("easeInOutBack", Easing::InOutBack),
    ("easeInBounce", Easing::InBounce),
    ("easeOutBounce", Easing::OutBounce),
    ("easeInOutBounce", Easing::InOutBounce),
];

impl FromStr for Easing {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, e)| *e)
            .ok_or_else(|| FxError::UnknownEasing(s.to_string()))
    }
}
