//! Structural operators composing steps into trees.
//!
//! Every combinator takes [`SharedFactory`] children and builds them when they
//! start, so each run (and each loop iteration) gets fresh step state.

use crate::error::{MotionError, check_ms};
use crate::step::{BoxStep, SharedFactory, Step, StepKind, StepState, Tick, factory};
use crate::steps::{delay, wait};

fn build_all(
    factories: &[SharedFactory],
    kind: StepKind,
) -> Result<Vec<Option<BoxStep>>, MotionError> {
    factories
        .iter()
        .map(|f| -> Result<Option<BoxStep>, MotionError> {
            let step = f.make()?;
            log::trace!("{kind:?}: starting {:?} child", step.kind());
            Ok(Some(step))
        })
        .collect()
}

fn cancel_all(children: &mut [Option<BoxStep>]) {
    for slot in children {
        if let Some(mut step) = slot.take() {
            step.cancel();
        }
    }
}

/// Runs every child in the same ticks; completes when all have completed.
///
/// Also backs [`stagger`], which reports [`StepKind::Stagger`].
pub struct Parallel {
    kind: StepKind,
    factories: Vec<SharedFactory>,
    children: Option<Vec<Option<BoxStep>>>,
    finished: bool,
}

pub fn parallel(children: impl IntoIterator<Item = SharedFactory>) -> Parallel {
    Parallel {
        kind: StepKind::Parallel,
        factories: children.into_iter().collect(),
        children: None,
        finished: false,
    }
}

/// Alias of [`parallel`].
pub fn all(children: impl IntoIterator<Item = SharedFactory>) -> Parallel {
    parallel(children)
}

impl Step for Parallel {
    fn kind(&self) -> StepKind {
        self.kind
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        if self.children.is_none() {
            self.children = Some(build_all(&self.factories, self.kind)?);
        }

        let mut live = false;
        for slot in self.children.iter_mut().flatten() {
            if let Some(step) = slot {
                match step.resume(tick)? {
                    StepState::Suspended => live = true,
                    StepState::Completed => *slot = None,
                }
            }
        }

        if live {
            return Ok(StepState::Suspended);
        }
        self.children = None;
        self.finished = true;
        Ok(StepState::Completed)
    }

    fn cancel(&mut self) {
        if let Some(children) = &mut self.children {
            cancel_all(children);
        }
        self.children = None;
        self.finished = true;
    }
}

/// Runs every child in the same ticks; completes as soon as one completes and
/// cancels the rest where they stand.
pub struct Race {
    factories: Vec<SharedFactory>,
    children: Option<Vec<Option<BoxStep>>>,
    finished: bool,
}

pub fn any(children: impl IntoIterator<Item = SharedFactory>) -> Race {
    Race {
        factories: children.into_iter().collect(),
        children: None,
        finished: false,
    }
}

impl Step for Race {
    fn kind(&self) -> StepKind {
        StepKind::Race
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        if self.children.is_none() {
            self.children = Some(build_all(&self.factories, StepKind::Race)?);
        }

        let children = self.children.get_or_insert_with(Vec::new);
        let mut won = children.is_empty();
        for (i, slot) in children.iter_mut().enumerate() {
            if let Some(step) = slot
                && step.resume(tick)?.is_completed()
            {
                log::trace!("race: child {i} won");
                *slot = None;
                won = true;
                break;
            }
        }

        if !won {
            return Ok(StepState::Suspended);
        }
        cancel_all(children);
        self.children = None;
        self.finished = true;
        Ok(StepState::Completed)
    }

    fn cancel(&mut self) {
        if let Some(children) = &mut self.children {
            cancel_all(children);
        }
        self.children = None;
        self.finished = true;
    }
}

/// Runs children one at a time in order. The next child starts in the tick the
/// previous one completed.
///
/// Also backs [`sequence`], which reports [`StepKind::Sequence`].
pub struct Chain {
    kind: StepKind,
    factories: Vec<SharedFactory>,
    next: usize,
    current: Option<BoxStep>,
    finished: bool,
}

pub fn chain(children: impl IntoIterator<Item = SharedFactory>) -> Chain {
    Chain {
        kind: StepKind::Chain,
        factories: children.into_iter().collect(),
        next: 0,
        current: None,
        finished: false,
    }
}

impl Step for Chain {
    fn kind(&self) -> StepKind {
        self.kind
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        loop {
            if self.current.is_none() {
                let Some(next) = self.factories.get(self.next) else {
                    self.finished = true;
                    return Ok(StepState::Completed);
                };
                let step = next.make()?;
                log::trace!(
                    "{:?}: starting child {} ({:?})",
                    self.kind,
                    self.next,
                    step.kind()
                );
                self.next += 1;
                self.current = Some(step);
            }

            let state = match self.current.as_mut() {
                Some(step) => step.resume(tick)?,
                None => StepState::Completed,
            };
            match state {
                StepState::Suspended => return Ok(StepState::Suspended),
                StepState::Completed => self.current = None,
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(mut step) = self.current.take() {
            step.cancel();
        }
        self.finished = true;
    }
}

/// Parallel run where child `i` starts `i * gap` ms after the stagger itself.
pub fn stagger(
    gap: f64,
    children: impl IntoIterator<Item = SharedFactory>,
) -> Result<Parallel, MotionError> {
    let gap = check_ms("stagger gap", gap)?;
    let delayed = children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            let offset = gap * i as f64;
            factory(move || delay(offset, Some(child.clone())))
        })
        .collect();
    Ok(Parallel {
        kind: StepKind::Stagger,
        factories: delayed,
        children: None,
        finished: false,
    })
}

/// Chain with a `wait(gap)` between consecutive children.
pub fn sequence(
    gap: f64,
    children: impl IntoIterator<Item = SharedFactory>,
) -> Result<Chain, MotionError> {
    let gap = check_ms("sequence gap", gap)?;
    let mut factories = Vec::new();
    for (i, child) in children.into_iter().enumerate() {
        if i > 0 {
            factories.push(factory(move || wait(gap)));
        }
        factories.push(child);
    }
    Ok(Chain {
        kind: StepKind::Sequence,
        factories,
        next: 0,
        current: None,
        finished: false,
    })
}

/// Repeats a freshly built child, forever or a fixed number of times.
///
/// The next iteration starts in the tick the previous one completed, unless
/// that iteration also started in this tick; then it waits for the next tick
/// so that a child completing instantly cannot spin the scheduler.
pub struct Loop {
    factory: SharedFactory,
    iterations: Option<u64>,
    completed: u64,
    current: Option<BoxStep>,
    started_at: Option<u64>,
    finished: bool,
}

/// Loops until cancelled from outside.
pub fn repeat(factory: SharedFactory) -> Loop {
    Loop {
        factory,
        iterations: None,
        completed: 0,
        current: None,
        started_at: None,
        finished: false,
    }
}

/// Runs exactly `n` iterations, then completes.
pub fn repeat_n(n: u64, factory: SharedFactory) -> Loop {
    Loop {
        iterations: Some(n),
        ..repeat(factory)
    }
}

impl Loop {
    /// Iterations that ran to completion so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl Step for Loop {
    fn kind(&self) -> StepKind {
        StepKind::Loop
    }

    fn resume(&mut self, tick: &Tick) -> Result<StepState, MotionError> {
        if self.finished {
            return Ok(StepState::Completed);
        }
        loop {
            if self.current.is_none() {
                if self.iterations.is_some_and(|n| self.completed >= n) {
                    self.finished = true;
                    return Ok(StepState::Completed);
                }
                if self.started_at == Some(tick.index) {
                    return Ok(StepState::Suspended);
                }
                log::trace!("loop: iteration {}", self.completed + 1);
                self.current = Some(self.factory.make()?);
                self.started_at = Some(tick.index);
            }

            let state = match self.current.as_mut() {
                Some(step) => step.resume(tick)?,
                None => StepState::Completed,
            };
            match state {
                StepState::Suspended => return Ok(StepState::Suspended),
                StepState::Completed => {
                    self.current = None;
                    self.completed = self.completed.saturating_add(1);
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(mut step) = self.current.take() {
            step.cancel();
        }
        self.finished = true;
    }
}
