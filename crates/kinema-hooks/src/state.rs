use kinema_core::SharedValue;

use crate::effects::on_unmount;
use crate::runtime::{current_component, remember_with_key};
use crate::scope::scoped_effect;

/// A shared value kept on the current component. Every write invalidates
/// the component; the subscription ends on unmount.
pub fn use_shared<T: 'static>(key: &str, init: impl FnOnce() -> T) -> SharedValue<T> {
    let value = remember_with_key(format!("shared:{key}"), || {
        let value = SharedValue::new(init());
        if let Some(component) = current_component() {
            let invalidator = component.invalidator();
            let sub = value.on_change(move || invalidator.invalidate());
            scoped_effect(move || on_unmount(move || sub.stop()));
        }
        value
    });
    (*value).clone()
}
