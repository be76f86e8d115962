use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Identifies one registered change listener.
    pub struct ListenerId;
}

type Listener = Rc<dyn Fn()>;

/// Registry of payload-less change listeners.
///
/// Shared by [`SharedValue`], [`SharedGroup`](crate::SharedGroup) and the
/// [`Scheduler`](crate::Scheduler) so that every `on_change` in the crate hands
/// out the same [`Subscription`] type.
#[derive(Default)]
pub(crate) struct Listeners {
    slots: RefCell<SlotMap<ListenerId, Listener>>,
}

impl Listeners {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn add(self: &Rc<Self>, f: impl Fn() + 'static) -> Subscription {
        let id = self.slots.borrow_mut().insert(Rc::new(f));
        Subscription {
            id,
            owner: Rc::downgrade(self),
        }
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        self.slots.borrow_mut().remove(id).is_some()
    }

    /// Removes `sub` if it was handed out by this registry.
    pub(crate) fn unsubscribe(self: &Rc<Self>, sub: &Subscription) -> bool {
        std::ptr::eq(sub.owner.as_ptr(), Rc::as_ptr(self)) && self.remove(sub.id)
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.slots.borrow().contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub(crate) fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    /// Calls the listeners registered when the notification starts.
    ///
    /// No borrow is held while a listener runs: listeners may subscribe,
    /// unsubscribe or write again. A listener removed by an earlier one in the
    /// same round is skipped.
    pub(crate) fn notify(&self) {
        let ids: SmallVec<[ListenerId; 4]> = self.slots.borrow().keys().collect();
        for id in ids {
            let listener = self.slots.borrow().get(id).cloned();
            if let Some(f) = listener {
                f();
            }
        }
    }
}

/// Handle to a registered change listener.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::stop`].
#[derive(Clone)]
pub struct Subscription {
    id: ListenerId,
    owner: Weak<Listeners>,
}

impl Subscription {
    /// Removes the listener. Safe to call more than once.
    pub fn stop(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.contains(self.id))
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// A single observable cell.
///
/// Every write notifies, including writes of an equal value. Listeners get no
/// payload and read the value back themselves.
///
/// ```rust
/// use kinema_core::*;
///
/// let opacity = shared(0.0f64);
/// let seen = shared(0usize);
/// let sub = opacity.on_change({
///     let seen = seen.clone();
///     move || seen.update(|n| *n += 1)
/// });
/// opacity.set(0.5);
/// opacity.set(0.5);
/// assert_eq!(seen.get(), 2);
/// sub.stop();
/// ```
pub struct SharedValue<T: 'static>(Rc<Inner<T>>);

struct Inner<T> {
    value: RefCell<T>,
    listeners: Rc<Listeners>,
}

impl<T> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> SharedValue<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            value: RefCell::new(value),
            listeners: Listeners::new(),
        }))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Reads the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }

    pub fn set(&self, v: T) {
        *self.0.value.borrow_mut() = v;
        self.0.listeners.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.value.borrow_mut());
        self.0.listeners.notify();
    }

    pub fn on_change(&self, f: impl Fn() + 'static) -> Subscription {
        self.0.listeners.add(f)
    }

    /// Removes a listener previously returned by [`SharedValue::on_change`].
    pub fn off(&self, sub: &Subscription) -> bool {
        self.0.listeners.unsubscribe(sub)
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.len()
    }

    /// True when both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedValue")
            .field(&*self.0.value.borrow())
            .finish()
    }
}

pub fn shared<T>(value: T) -> SharedValue<T> {
    SharedValue::new(value)
}
