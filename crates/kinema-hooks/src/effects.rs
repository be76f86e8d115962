use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::remember_with_key;
use crate::scope::scoped_effect;

/// A cleanup callback that runs at most once.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// A cleanup with nothing to do.
    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.borrow().is_some()
    }
}

/// Helper to build the cleanup returned from an effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

struct EffectSlot<K> {
    last_key: RefCell<Option<K>>,
    cleanup: Rc<RefCell<Option<Dispose>>>,
}

/// Runs `effect` on first render and whenever `key` changes; the previous
/// cleanup runs first. The last cleanup runs on unmount.
///
/// `slot` names the effect within its component.
pub fn disposable_effect<K: PartialEq + 'static>(
    slot: &str,
    key: K,
    effect: impl FnOnce() -> Dispose,
) {
    let state = remember_with_key(format!("effect:{slot}"), || {
        let cleanup = Rc::new(RefCell::new(None::<Dispose>));
        let on_drop = cleanup.clone();
        scoped_effect(move || {
            on_unmount(move || {
                let d = on_drop.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            })
        });
        EffectSlot {
            last_key: RefCell::new(None::<K>),
            cleanup,
        }
    });

    if state.last_key.borrow().as_ref() == Some(&key) {
        return;
    }
    *state.last_key.borrow_mut() = Some(key);

    let previous = state.cleanup.borrow_mut().take();
    if let Some(d) = previous {
        d.run();
    }
    let d = effect();
    *state.cleanup.borrow_mut() = Some(d);
}
