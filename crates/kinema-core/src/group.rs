//! Fixed sets of named shared values.
//!
//! A [`SharedGroup`] is the state an animation program writes to. Each field
//! is its own [`SharedValue`] of any `'static` type; the group forwards every
//! field write as one group-level change. Field names are fixed once the group
//! is built.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::MotionError;
use crate::shared::{Listeners, SharedValue, Subscription};

trait AnyShared {
    fn as_any(&self) -> &dyn Any;
    fn forward_to(&self, listeners: Weak<Listeners>) -> Subscription;
    fn type_name(&self) -> &'static str;
}

impl<T: 'static> AnyShared for SharedValue<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn forward_to(&self, listeners: Weak<Listeners>) -> Subscription {
        self.on_change(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.notify();
            }
        })
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

struct Field {
    name: Cow<'static, str>,
    value: Rc<dyn AnyShared>,
}

/// Collects the initial value of every field before the group is built.
#[derive(Default)]
pub struct SharedGroupBuilder {
    fields: Vec<Field>,
}

impl SharedGroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: 'static>(mut self, name: impl Into<Cow<'static, str>>, initial: T) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: Rc::new(SharedValue::new(initial)),
        });
        self
    }

    /// Field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_ref())
    }

    /// Names and value types, used to tell whether two builders describe the
    /// same state shape.
    pub fn shape(&self) -> Vec<(String, &'static str)> {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.value.type_name()))
            .collect()
    }

    pub fn build(self) -> Result<SharedGroup, MotionError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(MotionError::DuplicateField(field.name.to_string()));
            }
        }

        let listeners = Listeners::new();
        let forwards = self
            .fields
            .iter()
            .map(|f| f.value.forward_to(Rc::downgrade(&listeners)))
            .collect();

        Ok(SharedGroup(Rc::new(GroupInner {
            fields: GroupFields {
                fields: self.fields,
            },
            listeners,
            forwards,
        })))
    }
}

/// Read-only view of a group's field mapping.
pub struct GroupFields {
    fields: Vec<Field>,
}

impl GroupFields {
    /// Typed handle to one field.
    pub fn value<T: 'static>(&self, name: &str) -> Result<SharedValue<T>, MotionError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| MotionError::UnknownField(name.to_string()))?;
        field
            .value
            .as_any()
            .downcast_ref::<SharedValue<T>>()
            .cloned()
            .ok_or_else(|| MotionError::FieldType {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn type_of(&self, name: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.type_name())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct GroupInner {
    fields: GroupFields,
    listeners: Rc<Listeners>,
    forwards: Vec<Subscription>,
}

impl Drop for GroupInner {
    fn drop(&mut self) {
        for sub in &self.forwards {
            sub.stop();
        }
    }
}

/// A fixed-key aggregate of shared values with fan-in change notification.
///
/// ```rust
/// use kinema_core::*;
///
/// let group = SharedGroup::builder()
///     .field("opacity", 0.0f64)
///     .field("visible", false)
///     .build()
///     .unwrap();
///
/// let opacity = group.value::<f64>("opacity").unwrap();
/// opacity.set(1.0);
/// assert_eq!(group.value::<f64>("opacity").unwrap().get(), 1.0);
/// assert!(group.value::<f64>("visible").is_err());
/// ```
#[derive(Clone)]
pub struct SharedGroup(Rc<GroupInner>);

impl SharedGroup {
    pub fn builder() -> SharedGroupBuilder {
        SharedGroupBuilder::new()
    }

    /// The field mapping, for direct reads and writes.
    pub fn current(&self) -> &GroupFields {
        &self.0.fields
    }

    pub fn value<T: 'static>(&self, name: &str) -> Result<SharedValue<T>, MotionError> {
        self.0.fields.value(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.fields.keys()
    }

    /// Fires once for every write to any field.
    pub fn on_change(&self, f: impl Fn() + 'static) -> Subscription {
        self.0.listeners.add(f)
    }

    pub fn off(&self, sub: &Subscription) -> bool {
        self.0.listeners.unsubscribe(sub)
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.len()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.0
                    .fields
                    .fields
                    .iter()
                    .map(|field| (field.name.as_ref(), field.value.type_name())),
            )
            .finish()
    }
}
