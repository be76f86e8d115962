//! Primitive steps: `timing`, `wait`, `wait_until`, `delay`, `next_frame` and
//! `custom`.

use std::fmt;

use crate::easing::Easing;
use crate::error::{MotionError, check_ms};
use crate::interpolate::Interpolate;
use crate::shared::SharedValue;
use crate::step::{BoxStep, SharedFactory, Step, StepKind, StepState, Tick};

/// Where a [`Timing`] step writes its interpolated values.
pub enum Target<T: 'static> {
    Value(SharedValue<T>),
    /// Called with every interpolated value. Returning `true` ends the step
    /// early. These writes bypass the scheduler's change notification.
    Callback(Box<dyn FnMut(T) -> bool>),
}

impl<T> Target<T> {
    pub fn callback(f: impl FnMut(T) -> bool + 'static) -> Self {
        Target::Callback(Box::new(f))
    }
}

impl<T> From<SharedValue<T>> for Target<T> {
    fn from(value: SharedValue<T>) -> Self {
        Target::Value(value)
    }
}

impl<T> From<&SharedValue<T>> for Target<T> {
    fn from(value: &SharedValue<T>) -> Self {
        Target::Value(value.clone())
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Value(_) => f.write_str("Target::Value"),
            Target::Callback(_) => f.write_str("Target::Callback"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TimingConfig<T> {
    /// Start value. Defaults to the target's value when the step first runs;
    /// required for callback targets.
    pub from: Option<T>,
    pub to: T,
    /// Milliseconds.
    pub duration: f64,
    pub easing: Easing,
    /// Milliseconds between the step starting and the first write.
    pub delay: f64,
}

impl<T> TimingConfig<T> {
    pub const DEFAULT_DURATION: f64 = 300.0;

    pub fn new(to: T) -> Self {
        Self {
            from: None,
            to,
            duration: Self::DEFAULT_DURATION,
            easing: Easing::Linear,
            delay: 0.0,
        }
    }

    pub fn tween(to: T, duration: f64, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            ..Self::new(to)
        }
    }

    pub fn from(mut self, from: T) -> Self {
        self.from = Some(from);
        self
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, ms: f64) -> Self {
        self.delay = ms;
        self
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        check_ms("duration", self.duration)?;
        check_ms("delay", self.delay)?;
        Ok(())
    }
}

/// Interpolates a value from `from` to `to` over a duration.
///
/// Progress is computed from the absolute time since the step started, so
/// uneven tick spacing does not accumulate drift.
pub struct Timing<T: 'static> {
    target: Target<T>,
    from: Option<T>,
    to: T,
    duration: f64,
    delay: f64,
    easing: Easing,
    start: Option<f64>,
    finished: bool,
}

pub fn timing<T>(
    target: impl Into<Target<T>>,
    config: TimingConfig<T>,
) -> Result<Timing<T>, MotionError>
where
    T: Interpolate + Clone + 'static,
{
    config.validate()?;
    let target = target.into();
    if matches!(target, Target::Callback(_)) && config.from.is_none() {
        return Err(MotionError::MissingFrom);
    }
    Ok(Timing {
        target,
        from: config.from,
        to: config.to,
        duration: config.duration,
        delay: config.delay,
        easing: config.easing,
        start: None,
        finished: false,
    })
}

impl<T: Interpolate + Clone + 'static> Timing<T> {
    /// Eased progress in `[0, 1]` at `now`, or `None` while the delay runs.
    fn progress(&self, start: f64, now: f64) -> Option<f64> {
        let elapsed = now - start - self.delay;
        if elapsed < 0.0 {
            return None;
        }
        if self.duration <= 0.0 {
            return Some(1.0);
        }
        Some((elapsed / self.duration).min(1.0))
    }
}

impl<T: Interpolate + Clone + 'static> Step for Timing<T> {
    fn kind(&self) -> StepKind {
        StepKind::Timing
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        let start = *self.start.get_or_insert(tick.now);
        if self.from.is_none()
            && let Target::Value(value) = &self.target
        {
            self.from = Some(value.get());
        }

        let Some(t) = self.progress(start, tick.now) else {
            return Ok(StepState::Suspended);
        };
        let value = match &self.from {
            Some(from) if t < 1.0 => from.interpolate(&self.to, self.easing.interpolate(t)),
            _ => self.to.clone(),
        };

        let stop = match &mut self.target {
            Target::Value(target) => {
                target.set(value);
                false
            }
            Target::Callback(f) => f(value),
        };

        if stop || t >= 1.0 {
            self.finished = true;
            return Ok(StepState::Completed);
        }
        Ok(StepState::Suspended)
    }

    fn cancel(&mut self) {
        self.finished = true;
    }
}

/// Suspends for a fixed amount of scheduler time.
#[derive(Debug)]
pub struct Wait {
    duration: f64,
    start: Option<f64>,
    finished: bool,
}

pub fn wait(ms: f64) -> Result<Wait, MotionError> {
    Ok(Wait {
        duration: check_ms("wait", ms)?,
        start: None,
        finished: false,
    })
}

impl Step for Wait {
    fn kind(&self) -> StepKind {
        StepKind::Wait
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        let start = *self.start.get_or_insert(tick.now);
        if tick.now - start >= self.duration {
            self.finished = true;
            return Ok(StepState::Completed);
        }
        Ok(StepState::Suspended)
    }

    fn cancel(&mut self) {
        self.finished = true;
    }
}

/// Suspends until a boolean shared value reads `true` (or `false` when
/// inverted). The flag is polled every tick rather than observed, so a
/// missed notification cannot stall the step.
pub struct WaitUntil {
    flag: SharedValue<bool>,
    expected: bool,
    finished: bool,
}

pub fn wait_until(flag: &SharedValue<bool>, invert: bool) -> WaitUntil {
    WaitUntil {
        flag: flag.clone(),
        expected: !invert,
        finished: false,
    }
}

impl Step for WaitUntil {
    fn kind(&self) -> StepKind {
        StepKind::WaitUntil
    }

    fn resume(&mut self, _tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished || self.flag.get() == self.expected {
            self.finished = true;
            return Ok(StepState::Completed);
        }
        Ok(StepState::Suspended)
    }

    fn cancel(&mut self) {
        self.finished = true;
    }
}

/// `wait(ms)` followed by an optional nested step, started in the tick the
/// wait ends.
pub struct Delay {
    wait: Option<Wait>,
    nested: Option<SharedFactory>,
    child: Option<BoxStep>,
    finished: bool,
}

pub fn delay(ms: f64, nested: Option<SharedFactory>) -> Result<Delay, MotionError> {
    Ok(Delay {
        wait: Some(wait(ms)?),
        nested,
        child: None,
        finished: false,
    })
}

impl Step for Delay {
    fn kind(&self) -> StepKind {
        StepKind::Delay
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        if let Some(wait) = &mut self.wait {
            if wait.resume(tick)? == StepState::Suspended {
                return Ok(StepState::Suspended);
            }
            self.wait = None;
            if let Some(nested) = self.nested.take() {
                let child = nested.make()?;
                log::trace!("delay: starting nested {:?} step", child.kind());
                self.child = Some(child);
            }
        }

        let state = match &mut self.child {
            Some(child) => child.resume(tick)?,
            None => StepState::Completed,
        };
        if state.is_completed() {
            self.child = None;
            self.finished = true;
        }
        Ok(state)
    }

    fn cancel(&mut self) {
        self.wait = None;
        if let Some(mut child) = self.child.take() {
            child.cancel();
        }
        self.finished = true;
    }
}

/// Suspends until the next tick, then hands its delta (ms since the previous
/// tick) to `on_frame`.
pub struct NextFrame<F> {
    on_frame: Option<F>,
    waited: bool,
}

pub fn next_frame<F: FnOnce(f64)>(on_frame: F) -> NextFrame<F> {
    NextFrame {
        on_frame: Some(on_frame),
        waited: false,
    }
}

impl<F: FnOnce(f64)> Step for NextFrame<F> {
    fn kind(&self) -> StepKind {
        StepKind::NextFrame
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if !self.waited {
            self.waited = true;
            if self.on_frame.is_some() {
                return Ok(StepState::Suspended);
            }
        }
        if let Some(f) = self.on_frame.take() {
            f(tick.delta);
        }
        Ok(StepState::Completed)
    }

    fn cancel(&mut self) {
        self.waited = true;
        self.on_frame = None;
    }
}

/// A step whose body is an arbitrary closure, resumed once per tick until it
/// reports completion. Errors from the body fail the whole animation.
pub struct Custom<F> {
    body: F,
    finished: bool,
}

pub fn custom<F>(body: F) -> Custom<F>
where
    F: FnMut(&Tick) -> Result<StepState, MotionError>,
{
    Custom {
        body,
        finished: false,
    }
}

impl<F> Step for Custom<F>
where
    F: FnMut(&Tick) -> Result<StepState, MotionError>,
{
    fn kind(&self) -> StepKind {
        StepKind::Custom
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        let state = (self.body)(tick)?;
        self.finished = state.is_completed();
        Ok(state)
    }

    fn cancel(&mut self) {
        self.finished = true;
    }
}
