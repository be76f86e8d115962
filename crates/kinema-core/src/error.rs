use std::error::Error as StdError;

/// Errors raised while building or running an animation.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("{what} must be a finite, non-negative number of milliseconds (got {value})")]
    InvalidDuration { what: &'static str, value: f64 },

    #[error("timing into a callback target needs an explicit `from` value")]
    MissingFrom,

    #[error("bezier x coordinates must lie in [0, 1] (got x1 = {x1}, x2 = {x2})")]
    InvalidBezier { x1: f64, x2: f64 },

    #[error("steps easing needs at least one step")]
    InvalidSteps,

    #[error("poly easing needs a finite, positive exponent (got {0})")]
    InvalidExponent(f64),

    #[error("state field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("state field `{0}` does not exist")]
    UnknownField(String),

    #[error("state field `{name}` does not hold a {expected}")]
    FieldType {
        name: String,
        expected: &'static str,
    },

    #[error("the animation has been destroyed")]
    Destroyed,

    #[error("animation step failed: {0}")]
    Step(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl MotionError {
    /// Wraps a failure raised inside a custom step or program body.
    pub fn step(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        MotionError::Step(err.into())
    }

    /// True for errors that come from malformed configuration rather than
    /// from running a step.
    pub fn is_config(&self) -> bool {
        !matches!(self, MotionError::Destroyed | MotionError::Step(_))
    }
}

pub(crate) fn check_ms(what: &'static str, value: f64) -> Result<f64, MotionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MotionError::InvalidDuration { what, value })
    }
}
