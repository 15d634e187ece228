//! Per-frame task scheduling.
//!
//! The host is expected to own a frame loop (animation callback, vsync tick,
//! or a plain test loop) and call [`FrameQueue::run_frame`] once per frame
//! with the current clock reading. Tasks are cooperative: each one runs once
//! per frame and decides whether to stay scheduled. Cancellation is a flag
//! honored before the task's next run, so a cancelled task never runs again
//! after `cancel` returns.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Identifier of a scheduled frame task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// What a frame task wants after running for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Run again next frame.
    Again,
    /// Done; drop the task.
    Done,
}

/// A task run once per frame with the frame's timestamp in milliseconds.
pub type FrameTask = Box<dyn FnMut(f64) -> TaskState>;

/// Scheduling seam: `schedule` arms a task, `cancel` guarantees it will not
/// run again.
pub trait FrameScheduler {
    fn schedule(&self, task: FrameTask) -> TaskId;
    fn cancel(&self, id: TaskId);
}

struct QueueInner {
    tasks: Vec<(TaskId, FrameTask)>,
    /// Tasks scheduled while a frame is running; armed from the next frame.
    incoming: Vec<(TaskId, FrameTask)>,
    cancelled: HashSet<TaskId>,
    running: bool,
    next_id: u64,
}

/// Deterministic frame-task queue.
///
/// Clones share the same queue, so the animator, triggers, and the frame loop
/// can all hold handles.
#[derive(Clone)]
pub struct FrameQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                tasks: Vec::new(),
                incoming: Vec::new(),
                cancelled: HashSet::new(),
                running: false,
                next_id: 1,
            })),
        }
    }

    /// Number of tasks armed for the next frame.
    pub fn pending(&self) -> usize {
        let inner = self.inner.borrow();
        inner.tasks.len() + inner.incoming.len()
    }

    /// Run every armed task once. Tasks scheduled during the frame run
    /// starting with the next frame. Returns the number of tasks that ran.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let mut current = {
            let mut inner = self.inner.borrow_mut();
            inner.running = true;
            std::mem::take(&mut inner.tasks)
        };

        let mut ran = 0;
        let mut kept: Vec<(TaskId, FrameTask)> = Vec::with_capacity(current.len());
        for (id, mut task) in current.drain(..) {
            let is_cancelled = self.inner.borrow().cancelled.contains(&id);
            if is_cancelled {
                continue;
            }
            ran += 1;
            // The task body may schedule or cancel; no borrow is held here.
            if task(now_ms) == TaskState::Again {
                kept.push((id, task));
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.running = false;
        // Drop tasks cancelled from within their own frame.
        let cancelled = std::mem::take(&mut inner.cancelled);
        kept.retain(|(id, _)| !cancelled.contains(id));
        let mut incoming = std::mem::take(&mut inner.incoming);
        incoming.retain(|(id, _)| !cancelled.contains(id));
        kept.extend(incoming);
        inner.tasks = kept;
        ran
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&self, task: FrameTask) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let id = TaskId(inner.next_id);
        inner.next_id += 1;
        if inner.running {
            inner.incoming.push((id, task));
        } else {
            inner.tasks.push((id, task));
        }
        id
    }

    fn cancel(&self, id: TaskId) {
        self.inner.borrow_mut().cancelled.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn task_runs_until_done() {
        let queue = FrameQueue::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        queue.schedule(Box::new(move |_| {
            c.set(c.get() + 1);
            if c.get() < 3 { TaskState::Again } else { TaskState::Done }
        }));

        for frame in 0..5 {
            queue.run_frame(frame as f64 * 16.0);
        }
        assert_eq!(count.get(), 3);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let queue = FrameQueue::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = queue.schedule(Box::new(move |_| {
            c.set(c.get() + 1);
            TaskState::Again
        }));
        queue.cancel(id);
        queue.run_frame(0.0);
        queue.run_frame(16.0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn task_scheduled_during_frame_starts_next_frame() {
        let queue = FrameQueue::new();
        let inner_runs = Rc::new(Cell::new(0));

        let q = queue.clone();
        let ir = inner_runs.clone();
        queue.schedule(Box::new(move |_| {
            let ir = ir.clone();
            q.schedule(Box::new(move |_| {
                ir.set(ir.get() + 1);
                TaskState::Done
            }));
            TaskState::Done
        }));

        queue.run_frame(0.0);
        assert_eq!(inner_runs.get(), 0);
        queue.run_frame(16.0);
        assert_eq!(inner_runs.get(), 1);
    }

    #[test]
    fn cancel_from_within_frame_takes_effect_before_next_tick() {
        let queue = FrameQueue::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let victim = queue.schedule(Box::new(move |_| {
            c.set(c.get() + 1);
            TaskState::Again
        }));

        let q = queue.clone();
        queue.schedule(Box::new(move |_| {
            q.cancel(victim);
            TaskState::Done
        }));

        // Victim runs at most this frame, never after.
        queue.run_frame(0.0);
        let after_first = count.get();
        queue.run_frame(16.0);
        queue.run_frame(32.0);
        assert_eq!(count.get(), after_first);
    }
}
