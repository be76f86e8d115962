/// Linear blend between two values of the same type.
///
/// `t` is the eased progress; easings like `back` or `elastic` may push it
/// slightly outside `[0, 1]`, and implementations extrapolate rather than
/// clamp. Interpolating values that do not share a meaningful space is a
/// caller error and is not guarded against.
pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t as f32
    }
}

impl<const N: usize> Interpolate for [f64; N] {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i].interpolate(&other[i], t))
    }
}

impl<A: Interpolate, B: Interpolate> Interpolate for (A, B) {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        (self.0.interpolate(&other.0, t), self.1.interpolate(&other.1, t))
    }
}

/// Maps `t` from `input` onto `output`, extrapolating outside the range.
///
/// `interpolate(0.5, [0.0, 1.0], [10.0, 20.0]) == 15.0`.
pub fn interpolate(t: f64, input: [f64; 2], output: [f64; 2]) -> f64 {
    let span = input[1] - input[0];
    let progress = if span == 0.0 {
        1.0
    } else {
        (t - input[0]) / span
    };
    output[0].interpolate(&output[1], progress)
}
