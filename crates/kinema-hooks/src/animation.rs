use std::cell::RefCell;
use std::rc::Rc;

use kinema_core::{
    AnimationController, BoxStep, Motion, MotionError, SchedulerState, SharedGroup,
    SharedGroupBuilder, SharedValue, Subscription,
};

use crate::effects::on_unmount;
use crate::frame_loop::{AnimationKey, FrameLoop};
use crate::runtime::{current_component, remember_with_key};
use crate::scope::scoped_effect;

/// A component's view of one animation.
///
/// Reading state never borrows the controller, so a render may read values
/// at any point. Control methods borrow it and must not be called from
/// listeners that fire during a frame.
#[derive(Clone)]
pub struct AnimationHandle {
    controller: Rc<RefCell<AnimationController>>,
    state: SharedGroup,
}

impl AnimationHandle {
    pub fn new(controller: AnimationController) -> Self {
        let state = controller.state().clone();
        Self {
            controller: Rc::new(RefCell::new(controller)),
            state,
        }
    }

    pub(crate) fn controller(&self) -> &Rc<RefCell<AnimationController>> {
        &self.controller
    }

    pub fn state(&self) -> &SharedGroup {
        &self.state
    }

    pub fn value<T: 'static>(&self, name: &str) -> Result<SharedValue<T>, MotionError> {
        self.state.value(name)
    }

    pub fn restart(&self) -> Result<(), MotionError> {
        self.controller.borrow_mut().restart()
    }

    pub fn pause(&self) {
        self.controller.borrow_mut().pause();
    }

    pub fn resume(&self) {
        self.controller.borrow_mut().resume();
    }

    pub fn stop(&self) {
        self.controller.borrow_mut().stop();
    }

    pub fn destroy(&self) {
        self.controller.borrow_mut().destroy();
    }

    pub fn status(&self) -> SchedulerState {
        self.controller.borrow().status()
    }

    pub fn runs(&self) -> u64 {
        self.controller.borrow().runs()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller)
    }
}

struct Mounted<D> {
    deps: D,
    shape: Vec<(String, &'static str)>,
    handle: AnimationHandle,
    key: Option<AnimationKey>,
    subs: Vec<Subscription>,
}

impl<D> Mounted<D> {
    fn teardown(self, frames: Option<&FrameLoop>) {
        for sub in &self.subs {
            sub.stop();
        }
        if let (Some(frames), Some(key)) = (frames, self.key) {
            frames.unregister(key);
        }
        self.handle.destroy();
    }
}

struct AnimationSlot<D> {
    mounted: Rc<RefCell<Option<Mounted<D>>>>,
}

/// One live animation per component and `key`.
///
/// The controller is created (and started) on first render, and recreated
/// when `deps` or the field names/types of `initial` change; the old one is
/// destroyed first. Values already on the group are kept across renders
/// otherwise. Every coalesced change and the completion invalidate the
/// component. Unmounting the component destroys the animation.
///
/// When the component has a [`FrameLoop`], the animation is registered with
/// it; otherwise the caller ticks it.
pub fn use_animation<D, P>(
    key: &str,
    deps: D,
    initial: SharedGroupBuilder,
    program: P,
) -> Result<AnimationHandle, MotionError>
where
    D: PartialEq + 'static,
    P: Fn(&Motion) -> Result<BoxStep, MotionError> + 'static,
{
    let component = current_component();
    let frames = component.as_ref().and_then(|c| c.frame_loop().cloned());

    let slot = remember_with_key(format!("animation:{key}"), || {
        let mounted = Rc::new(RefCell::new(None::<Mounted<D>>));
        let on_drop = mounted.clone();
        let frames = frames.clone();
        scoped_effect(move || {
            on_unmount(move || {
                let current = on_drop.borrow_mut().take();
                if let Some(m) = current {
                    log::debug!("use_animation: tearing down on unmount");
                    m.teardown(frames.as_ref());
                }
            })
        });
        AnimationSlot { mounted }
    });

    let shape = initial.shape();
    let previous = {
        let mut mounted = slot.mounted.borrow_mut();
        match mounted.as_ref() {
            Some(m) if m.deps == deps && m.shape == shape => {
                return Ok(m.handle.clone());
            }
            _ => mounted.take(),
        }
    };
    if let Some(old) = previous {
        log::debug!("use_animation: '{key}' deps or shape changed; recreating");
        old.teardown(frames.as_ref());
    }

    let handle = AnimationHandle::new(AnimationController::create(program, initial)?);
    let subs = match &component {
        Some(c) => {
            let (a, b) = (c.invalidator(), c.invalidator());
            let controller = handle.controller.borrow();
            vec![
                controller.on_change(move || a.invalidate()),
                controller.on_complete(move || b.invalidate()),
            ]
        }
        None => Vec::new(),
    };
    let registered = frames.as_ref().map(|f| f.register(&handle));
    if component.is_some() && registered.is_none() {
        log::warn!("use_animation: '{key}' has no frame loop; it must be ticked by hand");
    }

    *slot.mounted.borrow_mut() = Some(Mounted {
        deps,
        shape,
        handle: handle.clone(),
        key: registered,
        subs,
    });
    Ok(handle)
}
