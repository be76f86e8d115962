//! # Component bindings
//!
//! A small hook runtime connecting Kinema animations to a host UI that
//! renders components and re-renders them when invalidated.
//!
//! - [`Component`] owns keyed hook state and a [`Scope`] of teardown work.
//! - [`use_animation`] keeps one [`AnimationController`](kinema_core::AnimationController)
//!   per component and key, recreating it when its dependencies change.
//! - [`use_shared`] keeps a [`SharedValue`](kinema_core::SharedValue) whose
//!   writes invalidate the component.
//! - [`FrameLoop`] ticks every mounted animation from one frame callback.
//!
//! ```rust
//! use kinema_core::*;
//! use kinema_hooks::*;
//!
//! let frames = FrameLoop::new();
//! let clock = ManualClock::new(0.0);
//! let view = Component::with_frame_loop(&frames);
//!
//! let fade = |m: &Motion| -> Result<BoxStep, MotionError> {
//!     Ok(m.animate("opacity", TimingConfig::new(1.0).duration(100.0))?.boxed())
//! };
//! let render = || {
//!     let anim = use_animation("fade", (), SharedGroup::builder().field("opacity", 0.0f64), fade)
//!         .unwrap();
//!     anim.value::<f64>("opacity").unwrap().get()
//! };
//!
//! assert_eq!(view.render(&render), 0.0);
//! while frames.pump(&clock).unwrap() > 0 {
//!     clock.advance(16.0);
//! }
//! assert!(view.is_dirty());
//! assert_eq!(view.render(&render), 1.0);
//!
//! view.unmount();
//! assert!(frames.is_empty());
//! ```

pub mod animation;
pub mod effects;
pub mod frame_loop;
pub mod runtime;
pub mod scope;
pub mod state;
#[cfg(test)]
mod tests;

pub use animation::*;
pub use effects::*;
pub use frame_loop::*;
pub use runtime::*;
pub use scope::*;
pub use state::*;
