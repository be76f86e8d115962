//! # Shared values, steps, and the scheduler
//!
//! Kinema animations are small programs built from resumable steps. There are
//! four main pieces:
//!
//! - `SharedValue<T>` / `SharedGroup`: observable state the animation writes.
//! - `Easing`: curves shaping normalized time.
//! - Steps and combinators: `timing`, `wait`, `parallel`, `sequence`, ...
//! - `Scheduler` / `AnimationController`: drive a step tree from frame ticks.
//!
//! ## Shared values
//!
//! `SharedValue<T>` is a cloneable handle to one cell. Every write notifies,
//! even when the value did not change:
//!
//! ```rust
//! use kinema_core::*;
//!
//! let x = shared(0.0f64);
//! x.set(1.0);
//! x.update(|v| *v += 1.0);
//! assert_eq!(x.get(), 2.0);
//! ```
//!
//! A `SharedGroup` holds the named fields of one animation and turns every
//! field write into a group change.
//!
//! ## Programs
//!
//! A program receives a `Motion` toolkit and returns the root step. Children
//! of combinators are passed as factories so they can be rebuilt:
//!
//! ```rust
//! use kinema_core::*;
//!
//! let program = |m: &Motion| -> Result<BoxStep, MotionError> {
//!     let fade = {
//!         let m = m.clone();
//!         factory(move || m.animate("opacity", TimingConfig::new(1.0).duration(200.0)))
//!     };
//!     let slide = {
//!         let m = m.clone();
//!         factory(move || {
//!             m.animate(
//!                 "offset",
//!                 TimingConfig::new(0.0)
//!                     .from(40.0)
//!                     .duration(200.0)
//!                     .easing(Easing::out(Easing::cubic())),
//!             )
//!         })
//!     };
//!     Ok(m.sequence(100.0, [fade, slide])?.boxed())
//! };
//!
//! let mut anim = AnimationController::create(
//!     program,
//!     SharedGroup::builder()
//!         .field("opacity", 0.0f64)
//!         .field("offset", 40.0f64),
//! )
//! .unwrap();
//!
//! let mut t = 0.0;
//! while anim.tick(t).unwrap() == SchedulerState::Running {
//!     t += 50.0;
//! }
//! assert_eq!(t, 500.0);
//! assert_eq!(anim.value::<f64>("offset").unwrap().get(), 0.0);
//! ```
//!
//! ## Driving
//!
//! Nothing in this crate owns a frame loop or a global clock. Call `tick`
//! with a monotonic millisecond timestamp from whatever frame callback the
//! host provides; see `kinema-hooks` for a frame loop bound to components.

pub mod bezier;
pub mod clock;
pub mod color;
pub mod combinators;
pub mod controller;
pub mod easing;
pub mod error;
pub mod group;
pub mod interpolate;
pub mod motion;
pub mod prelude;
pub mod scheduler;
pub mod shared;
pub mod step;
pub mod steps;

pub use bezier::CubicBezier;
pub use clock::*;
pub use color::*;
pub use combinators::*;
pub use controller::*;
pub use easing::*;
pub use error::MotionError;
pub use group::*;
pub use interpolate::*;
pub use motion::Motion;
pub use scheduler::*;
pub use shared::*;
pub use step::*;
pub use steps::*;
