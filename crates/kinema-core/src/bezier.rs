//! Cubic Bézier timing curves with CSS `cubic-bezier()` semantics.
//!
//! The curve runs from (0, 0) to (1, 1) through two control points. Evaluating
//! it at progress `x` means solving the x polynomial for the curve parameter
//! and reading y at that parameter.

use crate::error::MotionError;

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 0.000_000_1;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP: f64 = 1.0 / (SPLINE_TABLE_SIZE as f64 - 1.0);

fn a(a1: f64, a2: f64) -> f64 {
    1.0 - 3.0 * a2 + 3.0 * a1
}
fn b(a1: f64, a2: f64) -> f64 {
    3.0 * a2 - 6.0 * a1
}
fn c(a1: f64) -> f64 {
    3.0 * a1
}

/// x(t) or y(t) for control coordinates `a1`, `a2`.
fn calc(t: f64, a1: f64, a2: f64) -> f64 {
    ((a(a1, a2) * t + b(a1, a2)) * t + c(a1)) * t
}

/// d/dt of [`calc`].
fn slope(t: f64, a1: f64, a2: f64) -> f64 {
    3.0 * a(a1, a2) * t * t + 2.0 * b(a1, a2) * t + c(a1)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    samples: [f64; SPLINE_TABLE_SIZE],
}

impl CubicBezier {
    /// Fails when an x coordinate leaves `[0, 1]`, which would make the curve
    /// non-monotonic in time.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, MotionError> {
        let x_ok = (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2);
        if !x_ok || !y1.is_finite() || !y2.is_finite() {
            return Err(MotionError::InvalidBezier { x1, x2 });
        }
        Ok(Self::unchecked(x1, y1, x2, y2))
    }

    pub(crate) fn unchecked(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let samples = std::array::from_fn(|i| calc(i as f64 * SAMPLE_STEP, x1, x2));
        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    pub fn control_points(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn solve(&self, x: f64) -> f64 {
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        calc(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let mut interval_start = 0.0;
        let mut sample = 1;
        let last = SPLINE_TABLE_SIZE - 1;
        while sample != last && self.samples[sample] <= x {
            interval_start += SAMPLE_STEP;
            sample += 1;
        }
        sample -= 1;

        let dist = (x - self.samples[sample]) / (self.samples[sample + 1] - self.samples[sample]);
        let guess = interval_start + dist * SAMPLE_STEP;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            self.newton_raphson(x, guess)
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP)
        }
    }

    fn newton_raphson(&self, x: f64, mut guess: f64) -> f64 {
        for _ in 0..NEWTON_ITERATIONS {
            let s = slope(guess, self.x1, self.x2);
            if s == 0.0 {
                return guess;
            }
            let current = calc(guess, self.x1, self.x2) - x;
            guess -= current / s;
        }
        guess
    }

    fn binary_subdivide(&self, x: f64, mut lo: f64, mut hi: f64) -> f64 {
        let mut t = lo;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = lo + (hi - lo) / 2.0;
            let current = calc(t, self.x1, self.x2) - x;
            if current.abs() <= SUBDIVISION_PRECISION {
                break;
            }
            if current > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_x_outside_unit_range() {
        assert!(CubicBezier::new(-0.1, 0.0, 1.0, 1.0).is_err());
        assert!(CubicBezier::new(0.0, 0.0, 1.5, 1.0).is_err());
        // y may overshoot.
        assert!(CubicBezier::new(0.3, -0.5, 0.7, 1.5).is_ok());
    }

    #[test]
    fn linear_control_points_are_identity() {
        let curve = CubicBezier::new(0.25, 0.25, 0.75, 0.75).unwrap();
        for i in 0..=10 {
            let x = i as f64 / 10.0;
            assert_eq!(curve.solve(x), x);
        }
    }

    #[test]
    fn css_ease_in_out_is_symmetric() {
        let curve = CubicBezier::new(0.42, 0.0, 0.58, 1.0).unwrap();
        assert!((curve.solve(0.5) - 0.5).abs() < 1e-4);
        for i in 1..10 {
            let x = i as f64 / 10.0;
            let mirrored = 1.0 - curve.solve(1.0 - x);
            assert!((curve.solve(x) - mirrored).abs() < 1e-4, "x = {x}");
        }
    }

    #[test]
    fn solved_parameter_reproduces_x() {
        let curve = CubicBezier::new(0.1, 0.7, 0.9, 0.2).unwrap();
        for i in 1..20 {
            let x = i as f64 / 20.0;
            let t = curve.t_for_x(x);
            assert!((calc(t, curve.x1, curve.x2) - x).abs() < 1e-4, "x = {x}");
        }
    }
}
