//! Frame scheduler.
//!
//! The scheduler owns a root step and resumes it once per tick. It is driven
//! from outside: whoever owns the frame callback calls [`Scheduler::tick`]
//! with a monotonic millisecond timestamp.
//!
//! ## Time
//!
//! Scheduler time starts at 0 and only moves while running. The first tick
//! after [`Scheduler::start`] or [`Scheduler::resume`] anchors the clock: it
//! advances time by 0 and reports `delta = frame_budget_ms`. Later ticks
//! advance by the elapsed timestamp difference, clamped to
//! `max_frame_delta_ms`, so a backgrounded tab resumes where it left off
//! instead of jumping to the end of every running timing.
//!
//! ## Changes
//!
//! Writes to watched groups are coalesced: each tick emits at most one change
//! notification, after the root has been resumed.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{MotionError, check_ms};
use crate::group::SharedGroup;
use crate::shared::{Listeners, Subscription};
use crate::step::{BoxStep, StepState, Tick};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Delta reported on anchoring ticks.
    pub frame_budget_ms: f64,
    /// Upper bound on how far one tick may advance scheduler time.
    pub max_frame_delta_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_budget_ms: 1000.0 / 60.0,
            max_frame_delta_ms: 100.0,
        }
    }
}

impl SchedulerConfig {
    pub fn frame_budget(mut self, ms: f64) -> Self {
        self.frame_budget_ms = ms;
        self
    }

    pub fn max_frame_delta(mut self, ms: f64) -> Self {
        self.max_frame_delta_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        check_ms("frame budget", self.frame_budget_ms)?;
        check_ms("max frame delta", self.max_frame_delta_ms)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No root step; nothing to run.
    Idle,
    Running,
    Paused,
    /// The root step completed.
    Finished,
    /// The root step returned an error.
    Failed,
    /// Terminal.
    Destroyed,
}

#[derive(Debug, Default)]
struct FrameClock {
    now: f64,
    last: Option<f64>,
    index: u64,
}

impl FrameClock {
    fn advance(&mut self, timestamp: f64, config: &SchedulerConfig) -> Tick {
        let (step, delta) = match self.last {
            None => (0.0, config.frame_budget_ms),
            Some(last) => {
                let raw = (timestamp - last).max(0.0);
                if raw > config.max_frame_delta_ms {
                    log::debug!(
                        "scheduler: clamped frame delta {raw:.1}ms to {:.1}ms",
                        config.max_frame_delta_ms
                    );
                    (config.max_frame_delta_ms, config.max_frame_delta_ms)
                } else {
                    (raw, raw)
                }
            }
        };
        self.last = Some(timestamp);
        self.now += step;
        let tick = Tick::new(self.now, delta, self.index);
        self.index += 1;
        tick
    }

    /// The next tick re-anchors instead of measuring a gap.
    fn unanchor(&mut self) {
        self.last = None;
    }
}

pub struct Scheduler {
    config: SchedulerConfig,
    state: SchedulerState,
    root: Option<BoxStep>,
    clock: FrameClock,
    dirty: Rc<Cell<bool>>,
    change: Rc<Listeners>,
    complete: Rc<Listeners>,
    watching: Vec<Subscription>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            root: None,
            clock: FrameClock::default(),
            dirty: Rc::new(Cell::new(false)),
            change: Listeners::new(),
            complete: Listeners::new(),
            watching: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Scheduler time of the latest tick, in ms.
    pub fn now(&self) -> f64 {
        self.clock.now
    }

    /// Number of ticks that resumed the root.
    pub fn ticks(&self) -> u64 {
        self.clock.index
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Reports writes to `group` through [`Scheduler::on_change`].
    pub fn watch(&mut self, group: &SharedGroup) {
        if self.state == SchedulerState::Destroyed {
            return;
        }
        let dirty = self.dirty.clone();
        self.watching.push(group.on_change(move || dirty.set(true)));
    }

    /// Replaces the root step (cancelling the old one) and starts running.
    pub fn start(&mut self, root: BoxStep) -> Result<(), MotionError> {
        if self.state == SchedulerState::Destroyed {
            return Err(MotionError::Destroyed);
        }
        self.cancel_root();
        log::debug!("scheduler: start {:?} root", root.kind());
        self.root = Some(root);
        self.clock.unanchor();
        self.state = SchedulerState::Running;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == SchedulerState::Running {
            log::debug!("scheduler: pause at {:.1}ms", self.clock.now);
            self.state = SchedulerState::Paused;
        }
    }

    /// Resumes a paused run. Time spent paused is not counted.
    pub fn resume(&mut self) {
        if self.state == SchedulerState::Paused {
            log::debug!("scheduler: resume at {:.1}ms", self.clock.now);
            self.clock.unanchor();
            self.state = SchedulerState::Running;
        }
    }

    /// Cancels the run and goes back to idle. Values keep whatever was last
    /// written.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Destroyed {
            return;
        }
        self.cancel_root();
        self.state = SchedulerState::Idle;
        log::debug!("scheduler: stopped");
    }

    /// Cancels the run and drops every subscription. Idempotent.
    pub fn destroy(&mut self) {
        if self.state == SchedulerState::Destroyed {
            return;
        }
        self.cancel_root();
        self.unwatch();
        self.change.clear();
        self.complete.clear();
        self.state = SchedulerState::Destroyed;
        log::debug!("scheduler: destroyed");
    }

    /// Coalesced per-tick change notification.
    pub fn on_change(&self, f: impl Fn() + 'static) -> Subscription {
        self.change.add(f)
    }

    /// Fires once when the root step completes.
    pub fn on_complete(&self, f: impl Fn() + 'static) -> Subscription {
        self.complete.add(f)
    }

    /// Runs one frame.
    ///
    /// While running, resumes the root step with the elapsed time since the
    /// previous tick. In every live state, emits one change notification if a
    /// watched value was written since the last one. Non-finite timestamps are
    /// ignored. A step error cancels the
    /// run, moves the scheduler to [`SchedulerState::Failed`] and is returned.
    pub fn tick(&mut self, timestamp: f64) -> Result<SchedulerState, MotionError> {
        match self.state {
            SchedulerState::Destroyed => return Err(MotionError::Destroyed),
            SchedulerState::Running => {}
            _ => {
                self.flush();
                return Ok(self.state);
            }
        }

        if !timestamp.is_finite() {
            log::debug!("scheduler: ignoring non-finite timestamp {timestamp}");
            self.flush();
            return Ok(self.state);
        }

        let tick = self.clock.advance(timestamp, &self.config);
        let result = match self.root.as_mut() {
            Some(root) => root.resume(&tick),
            None => Ok(StepState::Completed),
        };

        match result {
            Ok(StepState::Suspended) => {
                self.flush();
            }
            Ok(StepState::Completed) => {
                self.root = None;
                self.state = SchedulerState::Finished;
                log::debug!("scheduler: finished at {:.1}ms", tick.now);
                self.flush();
                self.complete.notify();
            }
            Err(err) => {
                self.cancel_root();
                self.state = SchedulerState::Failed;
                log::debug!("scheduler: failed at {:.1}ms: {err}", tick.now);
                self.flush();
                return Err(err);
            }
        }
        Ok(self.state)
    }

    fn flush(&self) {
        if self.dirty.replace(false) {
            self.change.notify();
        }
    }

    fn cancel_root(&mut self) {
        if let Some(mut root) = self.root.take() {
            root.cancel();
        }
    }

    fn unwatch(&mut self) {
        for sub in self.watching.drain(..) {
            sub.stop();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.unwatch();
    }
}
