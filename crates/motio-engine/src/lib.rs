//! Per-element tween engine.
//!
//! Interpolates numeric, color, and composite-transform style properties
//! over time, composes simultaneous transform channels into one consistent
//! value, infers starting values when no prior animation state exists, and
//! exposes declarative interaction triggers built on top.
//!
//! ```text
//!  triggers (click / double-click / hover / viewport / throttle)
//!      |
//!  animator -- PropertyKind dispatch, per-element side table
//!      |               \
//!  tween (state machine) transform (channel cache + renderer)
//!      |               /
//!  scheduler + clock  style + value (parsing, interpolation)
//! ```
//!
//! Scheduling is single-threaded and cooperative: the host drives a
//! [`scheduler::FrameQueue`] once per frame with a [`clock::Clock`] reading,
//! and every tween is an independent frame task. Nothing blocks, and nothing
//! here is fatal: malformed inputs degrade to defined defaults instead of
//! failing the animation call.

pub mod animator;
pub mod clock;
pub mod easing;
pub mod scheduler;
pub mod style;
pub mod transform;
pub mod triggers;
pub mod tween;
pub mod value;

pub use animator::{AnimateOptions, AnimationHandle, Animator, PropertyKind, PropertyMap};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use easing::Easing;
pub use scheduler::{FrameQueue, FrameScheduler, FrameTask, TaskId, TaskState};
pub use style::StyleParseError;
pub use transform::{ChannelCache, ParsedTransform, TransformChannel};
pub use triggers::{
    Target, ViewportRegistration, on_click, on_double_click, on_double_click_within,
    on_enter_viewport, on_hover, throttle, throttle_within,
};
pub use tween::{Tween, TweenState};
pub use value::{Interpolate, Rgba, TweenValue};
