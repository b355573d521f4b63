// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The idle-processor stack (pidle): a LIFO of parked processor ids, plus a
//! count mirrored in an atomic for parity with the teacher's multi-threaded
//! contract (`spec.md` §3, §4.5, §4.9).
//!
//! Modeled as a plain `Vec<usize>` used as a stack, the same substitution
//! the teacher itself makes in `scheduler2::scheduler::idle::Synced`
//! (`available_cores: Vec<Box<worker::Core>>`, pushed/popped rather than
//! linked through an intrusive pointer).

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::processor::{PStatus, Processor};

/// LIFO stack of parked processor ids.
#[derive(Debug, Default)]
pub struct IdleStack {
    stack: Vec<usize>,
    count: AtomicUsize,
}

impl IdleStack {
    pub fn new() -> Self {
        IdleStack {
            stack: Vec::new(),
            count: AtomicUsize::new(0),
        }
    }

    /// Number of processors currently parked.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes `pid` onto the idle stack. The caller is responsible for
    /// having already set the processor's status to `Parked`.
    pub fn pidle_put(&mut self, pid: usize) {
        self.stack.push(pid);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Pops the most-recently-parked processor id, if any, transitioning it
    /// to `Running` (`spec.md` §4.9: a processor popped via `pidle_get` is
    /// about to actively look for work itself).
    pub fn pidle_get(&mut self, processors: &mut [Processor]) -> Option<usize> {
        let pid = self.stack.pop()?;
        self.count.fetch_sub(1, Ordering::Relaxed);
        if let Some(p) = processors.get_mut(pid) {
            p.set_status(PStatus::Running);
        }
        Some(pid)
    }

    /// Wakes up to `n` idle processors, transitioning each to `Idle` (not
    /// `Running` — a woken processor re-enters the dispatch loop on its own
    /// next turn and decides what to do there). Returns the ids woken, in
    /// wake order.
    pub fn try_wake(&mut self, n: usize, processors: &mut [Processor]) -> Vec<usize> {
        let mut woken = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(pid) = self.stack.pop() else {
                break;
            };
            self.count.fetch_sub(1, Ordering::Relaxed);
            if let Some(p) = processors.get_mut(pid) {
                p.set_status(PStatus::Idle);
            }
            woken.push(pid);
        }
        woken
    }

    /// Wakes at most one idle processor per unit of newly-arrived work, up
    /// to `new_work_count` (`spec.md` §4.5's "wake at most one P per
    /// runnable G introduced").
    pub fn wake_for_new_work(&mut self, new_work_count: usize, processors: &mut [Processor]) -> Vec<usize> {
        self.try_wake(new_work_count, processors)
    }
}
