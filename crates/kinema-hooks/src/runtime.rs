use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::frame_loop::FrameLoop;
use crate::scope::Scope;

thread_local! {
    static CURRENT: RefCell<Option<Weak<ComponentInner>>> = const { RefCell::new(None) };
}

/// A unit of UI that owns hook state and re-renders when invalidated.
///
/// The host calls [`Component::render`] to run its body; hooks called inside
/// the body attach their state to this component. Hooks invalidate the
/// component when something they track changes, and the host re-renders it
/// when it sees the dirty flag (or from [`Component::on_invalidate`]).
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

pub(crate) struct ComponentInner {
    slots: RefCell<HashMap<String, Box<dyn Any>>>,
    scope: RefCell<Scope>,
    frames: Option<FrameLoop>,
    dirty: Cell<bool>,
    renders: Cell<u64>,
    on_invalidate: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl Component {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A component whose animations are ticked by `frames`.
    pub fn with_frame_loop(frames: &FrameLoop) -> Self {
        Self::build(Some(frames.clone()))
    }

    fn build(frames: Option<FrameLoop>) -> Self {
        Self {
            inner: Rc::new(ComponentInner {
                slots: RefCell::new(HashMap::new()),
                scope: RefCell::new(Scope::new()),
                frames,
                dirty: Cell::new(true),
                renders: Cell::new(0),
                on_invalidate: RefCell::new(None),
            }),
        }
    }

    /// Runs `body` with this component (and its scope) installed as current.
    /// Clears the dirty flag.
    ///
    /// Must not be called from inside a listener that fires during a frame;
    /// schedule the render for after [`FrameLoop::frame`] returns instead.
    pub fn render<R>(&self, body: impl FnOnce() -> R) -> R {
        self.inner.dirty.set(false);
        self.inner.renders.set(self.inner.renders.get() + 1);

        let prev = CURRENT.with(|c| c.replace(Some(Rc::downgrade(&self.inner))));
        let scope = self.inner.scope.borrow().clone();
        let result = scope.run(body);
        CURRENT.with(|c| *c.borrow_mut() = prev);
        result
    }

    /// Marks the component dirty and calls the invalidation callback.
    pub fn invalidate(&self) {
        self.inner.dirty.set(true);
        let callback = self.inner.on_invalidate.borrow().clone();
        if let Some(cb) = callback {
            cb();
        }
    }

    /// Sets the callback run on every invalidation, replacing the previous one.
    pub fn on_invalidate(&self, f: impl Fn() + 'static) {
        *self.inner.on_invalidate.borrow_mut() = Some(Rc::new(f));
    }

    pub fn invalidator(&self) -> Invalidator {
        Invalidator(Rc::downgrade(&self.inner))
    }

    /// Runs every teardown registered by hooks and forgets all hook state.
    /// A later render starts from scratch.
    pub fn unmount(&self) {
        let scope = self.inner.scope.replace(Scope::new());
        scope.dispose();
        let slots = std::mem::take(&mut *self.inner.slots.borrow_mut());
        drop(slots);
        self.inner.dirty.set(true);
        log::debug!("component: unmounted");
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn renders(&self) -> u64 {
        self.inner.renders.get()
    }

    pub fn frame_loop(&self) -> Option<&FrameLoop> {
        self.inner.frames.as_ref()
    }

    pub fn slot_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }
}

/// Weak handle that invalidates a component if it still exists.
#[derive(Clone)]
pub struct Invalidator(Weak<ComponentInner>);

impl Invalidator {
    pub fn invalidate(&self) {
        if let Some(inner) = self.0.upgrade() {
            Component { inner }.invalidate();
        }
    }
}

/// The component currently rendering, if any.
pub fn current_component() -> Option<Component> {
    CURRENT.with(|c| {
        c.borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Component { inner }))
    })
}

/// Keyed hook slot on the current component.
///
/// Outside a render there is nowhere to keep the value: a warning is logged
/// and a fresh value is returned every call.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let Some(component) = current_component() else {
        log::warn!("remember_with_key: '{key}' used outside a render; value is not kept");
        return Rc::new(init());
    };

    {
        let slots = component.inner.slots.borrow();
        if let Some(existing) = slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            }
            log::warn!("remember_with_key: key '{key}' reused with a different type; replacing.");
        }
    }

    // No borrow held: `init` may use hooks of its own.
    let rc: Rc<T> = Rc::new(init());
    component
        .inner
        .slots
        .borrow_mut()
        .insert(key, Box::new(rc.clone()));
    rc
}
