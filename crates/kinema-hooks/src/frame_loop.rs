use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kinema_core::{AnimationController, Clock, MotionError, SchedulerState};
use slotmap::{SlotMap, new_key_type};

use crate::animation::AnimationHandle;

new_key_type! {
    pub struct AnimationKey;
}

type Entry = Weak<RefCell<AnimationController>>;

/// Ticks every registered animation from one frame callback.
///
/// Holds weak handles only: an animation dropped elsewhere is pruned on the
/// next frame.
#[derive(Clone, Default)]
pub struct FrameLoop {
    entries: Rc<RefCell<SlotMap<AnimationKey, Entry>>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: &AnimationHandle) -> AnimationKey {
        self.entries
            .borrow_mut()
            .insert(Rc::downgrade(handle.controller()))
    }

    pub fn unregister(&self, key: AnimationKey) -> bool {
        self.entries.borrow_mut().remove(key).is_some()
    }

    pub fn contains(&self, key: AnimationKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Ticks every live animation at `timestamp` (ms) and returns how many are
    /// still running.
    ///
    /// An animation whose tick fails is destroyed and unregistered; the error
    /// is logged and the first one is returned after every other animation has
    /// been ticked.
    pub fn frame(&self, timestamp: f64) -> Result<usize, MotionError> {
        let snapshot: Vec<(AnimationKey, Entry)> = self
            .entries
            .borrow()
            .iter()
            .map(|(k, w)| (k, w.clone()))
            .collect();

        let mut running = 0;
        let mut first_err = None;
        for (key, weak) in snapshot {
            let Some(controller) = weak.upgrade() else {
                self.unregister(key);
                continue;
            };
            let Ok(mut controller) = controller.try_borrow_mut() else {
                log::warn!("frame loop: animation {key:?} is busy; skipped this frame");
                continue;
            };
            if controller.status() == SchedulerState::Destroyed {
                self.unregister(key);
                continue;
            }

            match controller.tick(timestamp) {
                Ok(SchedulerState::Running) => running += 1,
                Ok(_) => {}
                Err(err) => {
                    log::error!("frame loop: animation {key:?} failed: {err}");
                    controller.destroy();
                    self.unregister(key);
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(running),
        }
    }

    /// [`FrameLoop::frame`] at the clock's current time.
    pub fn pump(&self, clock: &dyn Clock) -> Result<usize, MotionError> {
        self.frame(clock.now_ms())
    }
}
