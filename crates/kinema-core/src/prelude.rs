pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::color::Color;
pub use crate::combinators::{all, any, chain, parallel, repeat, repeat_n, sequence, stagger};
pub use crate::controller::{AnimationController, Program};
pub use crate::easing::Easing;
pub use crate::error::MotionError;
pub use crate::group::{SharedGroup, SharedGroupBuilder};
pub use crate::interpolate::Interpolate;
pub use crate::motion::Motion;
pub use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerState};
pub use crate::shared::{SharedValue, Subscription, shared};
pub use crate::step::{
    BoxStep, SharedFactory, Step, StepExt, StepFactory, StepKind, StepState, Tick, factory,
};
pub use crate::steps::{
    Target, TimingConfig, custom, delay, next_frame, timing, wait, wait_until,
};
