//! The resumable step protocol.
//!
//! An animation is a tree of [`Step`]s. The scheduler resumes the root once
//! per tick; composite steps resume their live children in insertion order and
//! report back whether they are still suspended or have completed. A step
//! never blocks: it does a bounded amount of work and returns.

use std::rc::Rc;

use crate::error::MotionError;

/// One scheduler frame as seen by a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Scheduler time in milliseconds. Only differences between ticks are
    /// meaningful; steps anchor to the `now` of their first resume.
    pub now: f64,
    /// Milliseconds since the previous tick, after clamping.
    pub delta: f64,
    /// Monotonic tick counter.
    pub index: u64,
}

impl Tick {
    pub fn new(now: f64, delta: f64, index: u64) -> Self {
        Self { now, delta, index }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepState {
    Suspended,
    Completed,
}

impl StepState {
    pub fn is_completed(self) -> bool {
        self == StepState::Completed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Timing,
    Wait,
    WaitUntil,
    Delay,
    NextFrame,
    Parallel,
    Race,
    Chain,
    Stagger,
    Sequence,
    Loop,
    Custom,
}

/// A resumable unit of animation logic.
///
/// A step is resumed at most once per tick. Once it has reported
/// [`StepState::Completed`] or been cancelled, further resumes do nothing and
/// report `Completed`.
pub trait Step {
    fn kind(&self) -> StepKind;

    /// Advances the step by one tick.
    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError>;

    /// Ends the step without running any more of it. Values already written
    /// stay as they are.
    fn cancel(&mut self);
}

pub type BoxStep = Box<dyn Step>;

impl Step for BoxStep {
    fn kind(&self) -> StepKind {
        (**self).kind()
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        (**self).resume(tick)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}

pub trait StepExt: Step + Sized + 'static {
    fn boxed(self) -> BoxStep {
        Box::new(self)
    }
}

impl<S: Step + 'static> StepExt for S {}

/// Produces a fresh step every time it is called.
///
/// Combinators take factories rather than built steps so that a child can be
/// rebuilt from a clean state (loops) and is only built when it starts.
pub trait StepFactory {
    fn make(&self) -> Result<BoxStep, MotionError>;
}

impl<F, S> StepFactory for F
where
    F: Fn() -> Result<S, MotionError>,
    S: Step + 'static,
{
    fn make(&self) -> Result<BoxStep, MotionError> {
        Ok(Box::new(self()?))
    }
}

pub type SharedFactory = Rc<dyn StepFactory>;

/// Wraps a closure building a step into a shareable factory.
///
/// ```rust
/// use kinema_core::*;
///
/// let opacity = shared(0.0f64);
/// let fade_in = factory(move || timing(&opacity, TimingConfig::new(1.0).duration(200.0)));
/// let step = fade_in.make().unwrap();
/// assert_eq!(step.kind(), StepKind::Timing);
/// ```
pub fn factory<F, S>(f: F) -> SharedFactory
where
    F: Fn() -> Result<S, MotionError> + 'static,
    S: Step + 'static,
{
    Rc::new(f)
}
