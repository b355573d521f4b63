// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The processor (P): a logical scheduler lane owning a runnext slot and a
//! local run queue (`spec.md` §3, §4.2).

use crate::goroutine::GoroutineRef;
use crate::queue::LocalRunQueue;

/// A processor's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PStatus {
    Idle,
    Running,
    Parked,
}

/// A logical processor: id, status, runnext fast path, and local queue.
///
/// Idle-stack membership (`spec.md`'s pidle) is tracked out-of-line by
/// [`crate::idle::IdleStack`] as a plain stack of processor ids rather than
/// an intrusive link field on `Processor` itself — the teacher's own
/// `scheduler2::scheduler::idle::Synced` does the same
/// (`available_cores: Vec<Box<Core>>`) rather than threading a pointer
/// through `Core`. See `DESIGN.md` OQ-2.
#[derive(Debug)]
pub struct Processor {
    id: usize,
    status: PStatus,
    local: LocalRunQueue,
    runnext: Option<GoroutineRef>,
}

impl Processor {
    pub fn new(id: usize) -> Self {
        Processor {
            id,
            status: PStatus::Idle,
            local: LocalRunQueue::new(),
            runnext: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn status(&self) -> PStatus {
        self.status
    }

    pub fn set_status(&mut self, status: PStatus) {
        self.status = status;
    }

    pub fn local(&self) -> &LocalRunQueue {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut LocalRunQueue {
        &mut self.local
    }

    pub fn runnext(&self) -> Option<GoroutineRef> {
        self.runnext.clone()
    }

    pub fn has_runnext(&self) -> bool {
        self.runnext.is_some()
    }

    pub fn set_runnext(&mut self, g: GoroutineRef) -> Option<GoroutineRef> {
        self.runnext.replace(g)
    }

    pub fn take_runnext(&mut self) -> Option<GoroutineRef> {
        self.runnext.take()
    }

    /// `true` iff the runnext slot is occupied or the local queue is
    /// non-empty.
    pub fn has_work(&self) -> bool {
        self.runnext.is_some() || !self.local.is_empty()
    }

    /// Local-queue size plus one if runnext is occupied.
    pub fn total_goroutines(&self) -> usize {
        self.local.len() + usize::from(self.runnext.is_some())
    }

    /// Peeks at the next local candidate (runnext, else the local queue's
    /// front) without consuming it. Used by the preemption pass
    /// (`spec.md` §4.13).
    pub fn preview_local_next(&self) -> Option<GoroutineRef> {
        self.runnext.clone().or_else(|| self.local.front().cloned())
    }

    /// Demotes `Running` to `Idle` when there is no local work. Never
    /// touches `Parked`, never promotes `Idle` to `Running` (`spec.md`
    /// I-P3).
    pub fn sync_status(&mut self) {
        if self.status == PStatus::Running && !self.has_work() {
            self.status = PStatus::Idle;
        }
    }
}
