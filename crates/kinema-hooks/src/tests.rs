use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinema_core::*;

use crate::*;

fn fade(ms: f64) -> impl Fn(&Motion) -> Result<BoxStep, MotionError> + 'static {
    move |m: &Motion| Ok(m.animate("opacity", TimingConfig::new(1.0).duration(ms))?.boxed())
}

fn opacity() -> SharedGroupBuilder {
    SharedGroup::builder().field("opacity", 0.0f64)
}

#[test]
fn test_scope_explicit_dispose() {
    let cleaned_up = Rc::new(Cell::new(false));
    let scope = Scope::new();
    let c = cleaned_up.clone();
    scope.add_disposer(move || c.set(true));

    assert!(!cleaned_up.get());
    scope.dispose();
    assert!(cleaned_up.get());
}

#[test]
fn test_scope_disposes_children_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let parent = Scope::new();
    let child = parent.child();
    let o = order.clone();
    parent.add_disposer(move || o.borrow_mut().push("parent"));
    let o = order.clone();
    child.add_disposer(move || o.borrow_mut().push("child"));

    parent.dispose();
    assert_eq!(*order.borrow(), vec!["child", "parent"]);
}

#[test]
fn test_dispose_runs_once() {
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let d = Dispose::new(move || r.set(r.get() + 1));
    let d2 = d.clone();
    d.run();
    d2.run();
    assert_eq!(runs.get(), 1);
    assert!(!d.is_pending());
}

#[test]
fn test_remember_keeps_value_per_component() {
    let a = Component::new();
    let b = Component::new();

    let first = a.render(|| remember_with_key("n", || 42));
    let again = a.render(|| remember_with_key("n", || 100));
    let other = b.render(|| remember_with_key("n", || 7));

    assert_eq!(*first, 42);
    assert!(Rc::ptr_eq(&first, &again));
    assert_eq!(*other, 7);

    a.unmount();
    let fresh = a.render(|| remember_with_key("n", || 100));
    assert_eq!(*fresh, 100);
}

#[test]
fn test_remember_outside_render_is_fresh() {
    let a = remember_with_key("n", || 1);
    let b = remember_with_key("n", || 2);
    assert_eq!((*a, *b), (1, 2));
    assert!(current_component().is_none());
}

#[test]
fn test_remember_replaces_on_type_change() {
    let c = Component::new();
    c.render(|| remember_with_key("n", || 1u32));
    let s = c.render(|| remember_with_key("n", || "text"));
    assert_eq!(*s, "text");
    assert_eq!(c.slot_count(), 1);
}

#[test]
fn test_disposable_effect_reruns_on_key_change() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c = Component::new();
    let render = |key: u32| {
        let log = log.clone();
        c.render(|| {
            disposable_effect("sub", key, move || {
                log.borrow_mut().push(format!("start {key}"));
                on_unmount(move || log.borrow_mut().push(format!("stop {key}")))
            })
        })
    };

    render(1);
    render(1);
    render(2);
    c.unmount();
    assert_eq!(log.borrow().join(", "), "start 1, stop 1, start 2, stop 2");
}

#[test]
fn test_invalidate_calls_callback() {
    let c = Component::new();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    c.on_invalidate(move || h.set(h.get() + 1));

    c.render(|| ());
    assert!(!c.is_dirty());
    c.invalidator().invalidate();
    assert!(c.is_dirty());
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_use_shared_invalidates_on_write() {
    let c = Component::new();
    let count = c.render(|| use_shared("count", || 0u32));
    assert!(!c.is_dirty());

    count.set(1);
    assert!(c.is_dirty());
    let again = c.render(|| use_shared("count", || 0u32));
    assert!(again.ptr_eq(&count));
    assert_eq!(again.get(), 1);

    c.unmount();
    assert_eq!(count.listener_count(), 0);
}

#[test]
fn test_frame_loop_drives_animation() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let anim = c.render(|| use_animation("fade", (), opacity(), fade(100.0)).unwrap());
    let value = anim.value::<f64>("opacity").unwrap();
    assert_eq!(frames.len(), 1);

    assert_eq!(frames.frame(0.0).unwrap(), 1);
    assert!(c.is_dirty());
    c.render(|| ());
    assert_eq!(frames.frame(50.0).unwrap(), 1);
    assert!((value.get() - 0.5).abs() < 1e-9);
    assert!(c.is_dirty());

    assert_eq!(frames.frame(100.0).unwrap(), 0);
    assert_eq!(value.get(), 1.0);
    assert_eq!(anim.status(), SchedulerState::Finished);
}

#[test]
fn test_pump_reads_clock() {
    let frames = FrameLoop::new();
    let clock = ManualClock::new(5000.0);
    let c = Component::with_frame_loop(&frames);
    let anim = c.render(|| use_animation("fade", (), opacity(), fade(100.0)).unwrap());

    frames.pump(&clock).unwrap();
    clock.advance(40.0);
    frames.pump(&clock).unwrap();
    let value = anim.value::<f64>("opacity").unwrap().get();
    assert!((value - 0.4).abs() < 1e-9);
}

#[test]
fn test_use_animation_is_stable_across_renders() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let first = c.render(|| use_animation("fade", 1u32, opacity(), fade(100.0)).unwrap());
    frames.frame(0.0).unwrap();
    frames.frame(50.0).unwrap();

    let second = c.render(|| use_animation("fade", 1u32, opacity(), fade(100.0)).unwrap());
    assert!(first.ptr_eq(&second));
    assert_eq!(second.runs(), 1);
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_use_animation_recreates_on_deps_change() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let first = c.render(|| use_animation("fade", 1u32, opacity(), fade(100.0)).unwrap());
    frames.frame(0.0).unwrap();

    let second = c.render(|| use_animation("fade", 2u32, opacity(), fade(100.0)).unwrap());
    assert!(!first.ptr_eq(&second));
    assert_eq!(first.status(), SchedulerState::Destroyed);
    assert_eq!(second.status(), SchedulerState::Running);
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_use_animation_recreates_on_shape_change() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let first = c.render(|| use_animation("fade", (), opacity(), fade(100.0)).unwrap());

    let wider = || opacity().field("scale", 1.0f64);
    let second = c.render(|| use_animation("fade", (), wider(), fade(100.0)).unwrap());
    assert!(!first.ptr_eq(&second));
    assert!(second.state().current().contains("scale"));

    let retyped = || SharedGroup::builder().field("opacity", Color::BLACK);
    let third = c.render(|| {
        use_animation("fade", (), retyped(), |m: &Motion| Ok(m.wait(10.0)?.boxed())).unwrap()
    });
    assert!(!second.ptr_eq(&third));
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_unmount_destroys_animation() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let anim = c.render(|| use_animation("fade", (), opacity(), fade(100.0)).unwrap());
    frames.frame(0.0).unwrap();

    c.unmount();
    assert_eq!(anim.status(), SchedulerState::Destroyed);
    assert!(frames.is_empty());
    assert_eq!(frames.frame(16.0).unwrap(), 0);
}

#[test]
fn test_failing_animation_is_torn_down() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let ok = c.render(|| use_animation("ok", (), opacity(), fade(100.0)).unwrap());
    let bad = c.render(|| {
        use_animation("bad", (), SharedGroup::builder(), |m: &Motion| {
            Ok(m.custom(|_| Err(MotionError::step("boom"))).boxed())
        })
        .unwrap()
    });
    assert_eq!(frames.len(), 2);

    let err = frames.frame(0.0).unwrap_err();
    assert!(matches!(err, MotionError::Step(_)));
    assert_eq!(bad.status(), SchedulerState::Destroyed);
    assert_eq!(ok.status(), SchedulerState::Running);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames.frame(50.0).unwrap(), 1);
}

#[test]
fn test_program_error_surfaces_from_hook() {
    let c = Component::new();
    let result = c.render(|| {
        use_animation("bad", (), SharedGroup::builder(), |m: &Motion| {
            Ok(m.animate("missing", TimingConfig::new(1.0))?.boxed())
        })
    });
    assert!(matches!(result, Err(MotionError::UnknownField(_))));
}

#[test]
fn test_dropped_handles_are_pruned() {
    let frames = FrameLoop::new();
    let controller = AnimationController::create(fade(100.0), opacity()).unwrap();
    let handle = AnimationHandle::new(controller);
    let key = frames.register(&handle);
    assert!(frames.contains(key));

    drop(handle);
    assert_eq!(frames.frame(0.0).unwrap(), 0);
    assert!(!frames.contains(key));
}

#[test]
fn test_invalidation_trace() {
    let frames = FrameLoop::new();
    let c = Component::with_frame_loop(&frames);
    let trace = Rc::new(RefCell::new(Vec::new()));
    let t = trace.clone();
    c.on_invalidate(move || t.borrow_mut().push("invalidate"));

    let anim = c.render(|| use_animation("fade", (), opacity(), fade(20.0)).unwrap());
    let t = trace.clone();
    anim.state().on_change(move || t.borrow_mut().push("write"));

    let mut ts = 0.0;
    while frames.frame(ts).unwrap() > 0 {
        trace.borrow_mut().push("frame");
        ts += 10.0;
    }
    insta::assert_snapshot!(trace.borrow().join("\n"), @r"
    write
    invalidate
    frame
    write
    invalidate
    frame
    write
    invalidate
    invalidate
    ");
}
