// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Executes one scheduling slice of a goroutine (`spec.md` §4.11).

use tracing::trace;

use crate::debug;
use crate::goroutine::GStatus;
use crate::lifecycle;
use crate::processor::PStatus;
use crate::scheduler::{Scheduler, WorkItem};

/// `execute_goroutine(p, g)`.
///
/// Runs at most one scheduling slice: a finished task is destroyed; a task
/// that yielded at the safepoint (a pending preempt request, consumed
/// without ever calling the task) is tail-requeued instead.
pub fn execute_goroutine(sched: &mut Scheduler, pid: usize, item: WorkItem) {
    sched.processors_mut()[pid].set_status(PStatus::Running);
    // Dispatch-time preempt-injection hook: reserved for future
    // observability-driven preemption policy, currently a no-op
    // (`spec.md` §4.11 step 2).

    let WorkItem { g, source } = item;
    let gid = g.borrow().id();
    debug::dispatch(sched.debug_mode(), pid, gid, source.as_str());
    trace!(pid, gid, source = source.as_str(), "dispatching goroutine");

    let finished = if !g.borrow().is_execution_ready() {
        g.borrow_mut().set_status(GStatus::Done);
        true
    } else if g.borrow_mut().consume_preempt() {
        false
    } else {
        g.borrow_mut().set_status(GStatus::Running);
        let task = g
            .borrow_mut()
            .take_task()
            .expect("is_execution_ready() just confirmed a task is present");
        task();
        g.borrow_mut().set_status(GStatus::Done);
        true
    };

    if finished {
        debug::done(sched.debug_mode(), pid, gid);
        trace!(pid, gid, "goroutine finished");
        lifecycle::destroyproc(&g);
    } else {
        let reason = g.borrow().last_yield_reason();
        debug::yielded(sched.debug_mode(), pid, gid, reason.as_str());
        sched.runqput_tail_with_reason(pid, g);
    }
    sched.processors_mut()[pid].sync_status();
}
