use std::rc::Rc;

use crate::error::MotionError;
use crate::group::{SharedGroup, SharedGroupBuilder};
use crate::motion::Motion;
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerState};
use crate::shared::{SharedValue, Subscription};
use crate::step::BoxStep;

/// An animation program: builds the root step from the toolkit.
pub type Program = Rc<dyn Fn(&Motion) -> Result<BoxStep, MotionError>>;

/// One animation instance: its state group, its program and the scheduler
/// running it.
///
/// ```rust
/// use kinema_core::*;
///
/// let mut anim = AnimationController::create(
///     |m: &Motion| {
///         Ok(m.animate("opacity", TimingConfig::new(1.0).duration(1000.0))?.boxed())
///     },
///     SharedGroup::builder().field("opacity", 0.0f64),
/// )
/// .unwrap();
///
/// anim.tick(0.0).unwrap();
/// anim.tick(50.0).unwrap();
/// let opacity = anim.value::<f64>("opacity").unwrap();
/// assert!((opacity.get() - 0.05).abs() < 1e-9);
/// ```
///
/// Listeners registered through [`AnimationController::on_change`] and
/// [`AnimationController::on_complete`] run inside [`AnimationController::tick`]
/// and must not call back into the controller; record what happened and act
/// after the tick returns.
pub struct AnimationController {
    program: Program,
    state: SharedGroup,
    scheduler: Scheduler,
    runs: u64,
}

impl AnimationController {
    /// Builds the state group and an idle scheduler. Nothing runs until
    /// [`AnimationController::restart`].
    pub fn new<P>(
        initial: SharedGroupBuilder,
        program: P,
        config: SchedulerConfig,
    ) -> Result<Self, MotionError>
    where
        P: Fn(&Motion) -> Result<BoxStep, MotionError> + 'static,
    {
        config.validate()?;
        let state = initial.build()?;
        let mut scheduler = Scheduler::new(config);
        scheduler.watch(&state);
        Ok(Self {
            program: Rc::new(program),
            state,
            scheduler,
            runs: 0,
        })
    }

    /// Builds the controller with the default config and starts it.
    pub fn create<P>(program: P, initial: SharedGroupBuilder) -> Result<Self, MotionError>
    where
        P: Fn(&Motion) -> Result<BoxStep, MotionError> + 'static,
    {
        let mut controller = Self::new(initial, program, SchedulerConfig::default())?;
        controller.restart()?;
        Ok(controller)
    }

    /// Calls the program again and runs the new tree from the start.
    ///
    /// The state group is kept: steps of the new run read the values the old
    /// run left behind (a timing without `from` starts where the value is
    /// now). If the program fails, the error is returned and the current run is
    /// left untouched.
    pub fn restart(&mut self) -> Result<(), MotionError> {
        if self.scheduler.state() == SchedulerState::Destroyed {
            return Err(MotionError::Destroyed);
        }
        let root = (self.program)(&Motion::new(self.state.clone()))?;
        self.runs += 1;
        log::debug!("animation: run {} starting", self.runs);
        self.scheduler.start(root)
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Stops ticking, cancels the run and drops all subscriptions. Idempotent.
    pub fn destroy(&mut self) {
        self.scheduler.destroy();
    }

    pub fn tick(&mut self, timestamp: f64) -> Result<SchedulerState, MotionError> {
        self.scheduler.tick(timestamp)
    }

    pub fn on_change(&self, f: impl Fn() + 'static) -> Subscription {
        self.scheduler.on_change(f)
    }

    pub fn on_complete(&self, f: impl Fn() + 'static) -> Subscription {
        self.scheduler.on_complete(f)
    }

    pub fn state(&self) -> &SharedGroup {
        &self.state
    }

    pub fn value<T: 'static>(&self, name: &str) -> Result<SharedValue<T>, MotionError> {
        self.state.value(name)
    }

    pub fn status(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// How many times the program has been started.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        self.scheduler.destroy();
    }
}
