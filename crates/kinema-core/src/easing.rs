//! Easing curves.
//!
//! Every curve maps normalized time in `[0, 1]` to progress, with
//! `f(0) = 0` and `f(1) = 1`. `back`, `elastic` and `bounce` leave `[0, 1]`
//! (or rebound inside it) between the endpoints.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use crate::bezier::CubicBezier;
use crate::error::MotionError;

/// A user-supplied curve.
#[derive(Clone)]
pub struct CustomEasing(Rc<dyn Fn(f64) -> f64>);

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEasing(..)")
    }
}

#[derive(Clone, Debug, Default)]
pub enum Easing {
    #[default]
    Linear,
    Quad,
    Cubic,
    Poly(f64),
    Sin,
    Circle,
    Exp,
    Elastic(f64),
    Back(f64),
    Bounce,
    Bezier(CubicBezier),
    In(Rc<Easing>),
    Out(Rc<Easing>),
    InOut(Rc<Easing>),
    Steps { n: u32, round_up: bool },
    Custom(CustomEasing),
}

impl Easing {
    /// Overshoot used by [`Easing::back`] in most animation libraries (~10%).
    pub const DEFAULT_BACK: f64 = 1.70158;
    /// Bounciness for [`Easing::elastic`]: about one overshoot.
    pub const DEFAULT_ELASTIC: f64 = 1.0;

    pub fn interpolate(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::Quad => t * t,
            Easing::Cubic => t * t * t,
            Easing::Poly(n) => t.powf(*n),
            Easing::Sin => 1.0 - (t * PI / 2.0).cos(),
            Easing::Circle => 1.0 - (1.0 - t * t).sqrt(),
            Easing::Exp => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * (t - 1.0))
                }
            }
            Easing::Elastic(bounciness) => {
                let p = bounciness * PI;
                1.0 - (t * PI / 2.0).cos().powi(3) * (t * p).cos()
            }
            Easing::Back(s) => t * t * ((s + 1.0) * t - s),
            Easing::Bounce => bounce(t),
            Easing::Bezier(curve) => curve.solve(t),
            Easing::In(inner) => inner.interpolate(t),
            Easing::Out(inner) => 1.0 - inner.interpolate(1.0 - t),
            Easing::InOut(inner) => {
                if t < 0.5 {
                    inner.interpolate(t * 2.0) / 2.0
                } else {
                    1.0 - inner.interpolate((1.0 - t) * 2.0) / 2.0
                }
            }
            Easing::Steps { n, round_up } => {
                let n = *n as f64;
                if *round_up {
                    (t * n).ceil() / n
                } else {
                    (t * n).floor() / n
                }
            }
            Easing::Custom(f) => (f.0)(t),
        }
    }

    pub fn linear() -> Self {
        Easing::Linear
    }

    /// Inertial curve: slow start, quick finish. Same as CSS `ease-in`.
    pub fn ease() -> Self {
        Easing::Bezier(CubicBezier::unchecked(0.42, 0.0, 1.0, 1.0))
    }

    pub fn quad() -> Self {
        Easing::Quad
    }

    pub fn cubic() -> Self {
        Easing::Cubic
    }

    /// `t => t^n`. The exponent must be finite and positive.
    pub fn poly(n: f64) -> Result<Self, MotionError> {
        if !n.is_finite() || n <= 0.0 {
            return Err(MotionError::InvalidExponent(n));
        }
        Ok(Easing::Poly(n))
    }

    pub fn sin() -> Self {
        Easing::Sin
    }

    pub fn circle() -> Self {
        Easing::Circle
    }

    pub fn exp() -> Self {
        Easing::Exp
    }

    /// Spring-like oscillation. `0` never overshoots; `n` overshoots roughly
    /// `n` times before settling.
    pub fn elastic(bounciness: f64) -> Self {
        Easing::Elastic(bounciness)
    }

    /// Pulls back below zero before moving forward.
    pub fn back(s: f64) -> Self {
        Easing::Back(s)
    }

    pub fn bounce() -> Self {
        Easing::Bounce
    }

    pub fn bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, MotionError> {
        Ok(Easing::Bezier(CubicBezier::new(x1, y1, x2, y2)?))
    }

    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Easing::Custom(CustomEasing(Rc::new(f)))
    }

    /// Runs `easing` forwards. Present for symmetry with `out` and `in_out`.
    pub fn in_(easing: Easing) -> Self {
        Easing::In(Rc::new(easing))
    }

    /// Runs `easing` backwards: `t => 1 - easing(1 - t)`.
    pub fn out(easing: Easing) -> Self {
        Easing::Out(Rc::new(easing))
    }

    /// First half forwards, second half mirrored.
    pub fn in_out(easing: Easing) -> Self {
        Easing::InOut(Rc::new(easing))
    }

    /// Quantizes progress into `n` plateaus. With `round_up`, a step is taken
    /// as soon as its interval starts; otherwise when it ends.
    pub fn steps(n: u32, round_up: bool) -> Result<Self, MotionError> {
        if n == 0 {
            return Err(MotionError::InvalidSteps);
        }
        Ok(Easing::Steps { n, round_up })
    }
}

fn bounce(t: f64) -> f64 {
    const K: f64 = 7.5625;
    if t < 1.0 / 2.75 {
        return K * t * t;
    }
    if t < 2.0 / 2.75 {
        let t2 = t - 1.5 / 2.75;
        return K * t2 * t2 + 0.75;
    }
    if t < 2.5 / 2.75 {
        let t2 = t - 2.25 / 2.75;
        return K * t2 * t2 + 0.9375;
    }
    let t2 = t - 2.625 / 2.75;
    K * t2 * t2 + 0.984375
}
