//! Single timed interpolation task.
//!
//! A [`Tween`] interpolates one value from `from` to `to` over `duration_ms`,
//! after an optional delay, firing an update callback every frame and a
//! completion callback exactly once after the final update. Progress is
//! anchored to the first frame the tween sees: `anchor = first_now + delay`,
//! and frames before the anchor reschedule without advancing progress.
//!
//! Lifecycle: Pending(delay) -> Running -> Finished | Stopped. Terminal
//! states never resume, and `stop()` guarantees no callback fires after it
//! returns.

use std::cell::RefCell;
use std::rc::Rc;

use crate::easing::Easing;
use crate::scheduler::{FrameScheduler, TaskId, TaskState};
use crate::value::{Interpolate, TweenValue};

/// Per-frame update callback: interpolated value, eased progress, raw
/// progress, and the tween's channel tag.
pub type UpdateFn = Box<dyn FnMut(TweenValue, f32, f32, Option<&str>)>;

/// Completion callback, fired once after the final update.
pub type CompleteFn = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    /// Created or started, anchor tick not yet reached.
    Pending,
    /// Past the anchor, progress advancing.
    Running,
    Finished,
    Stopped,
}

struct TweenInner {
    from: TweenValue,
    to: TweenValue,
    duration_ms: f64,
    delay_ms: f64,
    easing: Easing,
    tag: Option<String>,
    state: TweenState,
    anchor_ms: Option<f64>,
    on_update: Option<UpdateFn>,
    on_complete: Option<CompleteFn>,
}

/// One timed interpolation task. Clones share state, so the animator can
/// keep a handle for cancellation while the scheduler drives the task.
#[derive(Clone)]
pub struct Tween {
    inner: Rc<RefCell<TweenInner>>,
}

impl Tween {
    pub fn new(from: impl Into<TweenValue>, to: impl Into<TweenValue>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TweenInner {
                from: from.into(),
                to: to.into(),
                duration_ms: 400.0,
                delay_ms: 0.0,
                easing: Easing::Linear,
                tag: None,
                state: TweenState::Pending,
                anchor_ms: None,
                on_update: None,
                on_complete: None,
            })),
        }
    }

    pub fn with_duration(self, duration_ms: f64) -> Self {
        self.inner.borrow_mut().duration_ms = duration_ms;
        self
    }

    pub fn with_delay(self, delay_ms: f64) -> Self {
        self.inner.borrow_mut().delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(self, easing: Easing) -> Self {
        self.inner.borrow_mut().easing = easing;
        self
    }

    /// Opaque tag passed through to every update, used by transform tweens to
    /// name their channel.
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        self.inner.borrow_mut().tag = Some(tag.into());
        self
    }

    pub fn on_update(self, f: impl FnMut(TweenValue, f32, f32, Option<&str>) + 'static) -> Self {
        self.inner.borrow_mut().on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(self, f: impl FnOnce() + 'static) -> Self {
        self.inner.borrow_mut().on_complete = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> TweenState {
        self.inner.borrow().state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state(), TweenState::Finished | TweenState::Stopped)
    }

    /// Whether two handles drive the same underlying tween.
    pub fn ptr_eq(&self, other: &Tween) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stop the tween. No callback fires after this returns; a tween stopped
    /// before its anchor tick never fires any callback at all.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != TweenState::Finished {
            inner.state = TweenState::Stopped;
        }
        inner.on_update = None;
        inner.on_complete = None;
    }

    /// Arm the tween against the scheduler. The task stays scheduled through
    /// the delay window and unschedules itself on completion or stop.
    pub fn start<S: FrameScheduler + ?Sized>(&self, scheduler: &S) -> TaskId {
        let shared = self.inner.clone();
        scheduler.schedule(Box::new(move |now_ms| Self::tick(&shared, now_ms)))
    }

    fn tick(shared: &Rc<RefCell<TweenInner>>, now_ms: f64) -> TaskState {
        let (value, eased, raw, tag, mut update) = {
            let mut inner = shared.borrow_mut();
            if matches!(inner.state, TweenState::Finished | TweenState::Stopped) {
                return TaskState::Done;
            }
            let delay_ms = inner.delay_ms;
            let anchor = *inner.anchor_ms.get_or_insert(now_ms + delay_ms);
            if now_ms < anchor {
                return TaskState::Again;
            }
            inner.state = TweenState::Running;
            let raw = if inner.duration_ms <= 0.0 {
                1.0
            } else {
                (((now_ms - anchor) / inner.duration_ms).clamp(0.0, 1.0)) as f32
            };
            let eased = inner.easing.evaluate(raw);
            let value = inner.from.interpolate(&inner.to, eased);
            // Callbacks run without the borrow held; they may stop this tween
            // or start new ones.
            (value, eased, raw, inner.tag.clone(), inner.on_update.take())
        };

        if let Some(f) = update.as_mut() {
            f(value, eased, raw, tag.as_deref());
        }

        let complete = {
            let mut inner = shared.borrow_mut();
            if inner.state == TweenState::Stopped {
                return TaskState::Done;
            }
            if inner.on_update.is_none() {
                inner.on_update = update;
            }
            if raw < 1.0 {
                return TaskState::Again;
            }
            inner.state = TweenState::Finished;
            inner.on_update = None;
            inner.on_complete.take()
        };

        if let Some(f) = complete {
            f();
        }
        TaskState::Done
    }
}
