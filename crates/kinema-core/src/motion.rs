use crate::combinators::{self, Chain, Loop, Parallel, Race};
use crate::error::MotionError;
use crate::group::SharedGroup;
use crate::interpolate::Interpolate;
use crate::shared::SharedValue;
use crate::step::{SharedFactory, StepState, Tick};
use crate::steps::{
    self, Custom, Delay, NextFrame, Target, Timing, TimingConfig, Wait, WaitUntil,
};

/// Toolkit handed to an animation program.
///
/// Bundles the animation's state group with every primitive and combinator so
/// a program can be written against one value. Cloning is cheap; clone it into
/// factory closures that need it.
#[derive(Clone, Debug)]
pub struct Motion {
    state: SharedGroup,
}

impl Motion {
    pub fn new(state: SharedGroup) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SharedGroup {
        &self.state
    }

    pub fn value<T: 'static>(&self, name: &str) -> Result<SharedValue<T>, MotionError> {
        self.state.value(name)
    }

    pub fn timing<T>(
        &self,
        target: impl Into<Target<T>>,
        config: TimingConfig<T>,
    ) -> Result<Timing<T>, MotionError>
    where
        T: Interpolate + Clone + 'static,
    {
        steps::timing(target, config)
    }

    /// `timing` into the state field called `name`.
    pub fn animate<T>(&self, name: &str, config: TimingConfig<T>) -> Result<Timing<T>, MotionError>
    where
        T: Interpolate + Clone + 'static,
    {
        steps::timing(self.state.value::<T>(name)?, config)
    }

    pub fn wait(&self, ms: f64) -> Result<Wait, MotionError> {
        steps::wait(ms)
    }

    pub fn wait_until(&self, flag: &SharedValue<bool>, invert: bool) -> WaitUntil {
        steps::wait_until(flag, invert)
    }

    pub fn delay(&self, ms: f64, nested: Option<SharedFactory>) -> Result<Delay, MotionError> {
        steps::delay(ms, nested)
    }

    /// Waits one tick and reports the time since the previous one.
    pub fn next_frame<F: FnOnce(f64)>(&self, on_frame: F) -> NextFrame<F> {
        steps::next_frame(on_frame)
    }

    pub fn custom<F>(&self, body: F) -> Custom<F>
    where
        F: FnMut(&Tick) -> Result<StepState, MotionError>,
    {
        steps::custom(body)
    }

    pub fn parallel(&self, children: impl IntoIterator<Item = SharedFactory>) -> Parallel {
        combinators::parallel(children)
    }

    pub fn all(&self, children: impl IntoIterator<Item = SharedFactory>) -> Parallel {
        combinators::all(children)
    }

    pub fn any(&self, children: impl IntoIterator<Item = SharedFactory>) -> Race {
        combinators::any(children)
    }

    pub fn chain(&self, children: impl IntoIterator<Item = SharedFactory>) -> Chain {
        combinators::chain(children)
    }

    pub fn stagger(
        &self,
        gap: f64,
        children: impl IntoIterator<Item = SharedFactory>,
    ) -> Result<Parallel, MotionError> {
        combinators::stagger(gap, children)
    }

    pub fn sequence(
        &self,
        gap: f64,
        children: impl IntoIterator<Item = SharedFactory>,
    ) -> Result<Chain, MotionError> {
        combinators::sequence(gap, children)
    }

    pub fn repeat(&self, factory: SharedFactory) -> Loop {
        combinators::repeat(factory)
    }

    pub fn repeat_n(&self, n: u64, factory: SharedFactory) -> Loop {
        combinators::repeat_n(n, factory)
    }
}
