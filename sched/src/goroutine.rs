// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The goroutine (G) type: identity, status, task, and scheduling metadata.
//!
//! See `spec.md` §3 ("Goroutine (G)") and §4.1.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A parameterless, one-shot callable. Goroutines are not `Send`: the whole
/// runtime is single-threaded (`spec.md` §5).
pub type Task = Box<dyn FnOnce()>;

/// A goroutine's scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GStatus {
    Ready,
    Running,
    Done,
}

/// Why a goroutine last yielded instead of running to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldReason {
    TimeSlice,
    Preempt,
    Syscall,
    Io,
    Unknown,
}

/// Shared handle to a goroutine.
///
/// A G is referenced from at most one chain at a time (runnext, a local
/// queue, the global queue, the timer list, or the current dispatch frame —
/// `spec.md` I-G1). Using `Rc<RefCell<_>>` lets the borrow checker enforce
/// "one mutable access at a time" instead of the teacher's raw intrusive
/// pointers, which only pays for itself under real concurrency (see
/// `DESIGN.md` OQ-1).
pub type GoroutineRef = Rc<RefCell<Goroutine>>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates the next monotonic goroutine id (start value 1, stride 1).
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
pub(crate) fn reset_id_sequence_for_tests() {
    NEXT_ID.store(1, Ordering::Relaxed);
}

/// A goroutine: identity, status, task, and scheduling metadata.
#[derive(Debug)]
pub struct Goroutine {
    id: u64,
    status: GStatus,
    task: Option<Task>,
    link: Option<GoroutineRef>,
    preempt_requested: bool,
    last_yield_reason: YieldReason,
}

impl Goroutine {
    /// Creates a new, `Ready` goroutine wrapping `task`, assigning it `id`.
    pub fn new(id: u64, task: Task) -> GoroutineRef {
        Rc::new(RefCell::new(Goroutine {
            id,
            status: GStatus::Ready,
            task: Some(task),
            link: None,
            preempt_requested: false,
            last_yield_reason: YieldReason::Unknown,
        }))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> GStatus {
        self.status
    }

    pub fn set_status(&mut self, status: GStatus) {
        self.status = status;
    }

    /// A G is ready to run iff it is `Ready` and still holds a task. A G
    /// without a task is malformed and must be treated as immediately Done.
    pub fn is_execution_ready(&self) -> bool {
        self.status == GStatus::Ready && self.task.is_some()
    }

    /// Takes the task out, consuming it (it is called at most once).
    pub fn take_task(&mut self) -> Option<Task> {
        self.task.take()
    }

    pub fn has_task(&self) -> bool {
        self.task.is_some()
    }

    /// Scheduling link, used to chain this G into the global queue or a
    /// transfer batch. Null (`None`) in every other state (I-G2).
    pub fn link(&self) -> Option<GoroutineRef> {
        self.link.clone()
    }

    pub fn set_link(&mut self, link: Option<GoroutineRef>) {
        self.link = link;
    }

    pub fn take_link(&mut self) -> Option<GoroutineRef> {
        self.link.take()
    }

    /// Requests that this goroutine yield at its next safepoint.
    pub fn request_preempt(&mut self) {
        self.preempt_requested = true;
    }

    pub fn preempt_requested(&self) -> bool {
        self.preempt_requested
    }

    /// Returns `true` iff a preempt request was pending, clearing it and
    /// recording `Preempt` as the last-yield reason. Otherwise returns
    /// `false` and leaves state untouched.
    pub fn consume_preempt(&mut self) -> bool {
        if self.preempt_requested {
            self.preempt_requested = false;
            self.last_yield_reason = YieldReason::Preempt;
            true
        } else {
            false
        }
    }

    pub fn last_yield_reason(&self) -> YieldReason {
        self.last_yield_reason
    }

    pub fn set_last_yield_reason(&mut self, reason: YieldReason) {
        self.last_yield_reason = reason;
    }
}

impl YieldReason {
    /// Lowercase token used in the debug text interface (`spec.md` §6).
    pub fn as_str(self) -> &'static str {
        match self {
            YieldReason::TimeSlice => "timeslice",
            YieldReason::Preempt => "preempt",
            YieldReason::Syscall => "syscall",
            YieldReason::Io => "io",
            YieldReason::Unknown => "unknown",
        }
    }
}
