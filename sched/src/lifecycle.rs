// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Goroutine creation and destruction (`spec.md` §4.14).

use crate::goroutine::{next_id, Goroutine, GoroutineRef, Task};
use crate::scheduler::Scheduler;

/// Creates a new goroutine wrapping `task` and installs it on processor
/// `pid` via `runqput(.., to_runnext=true)`. If the scheduler has already
/// started its dispatch loop, wakes one idle processor.
pub fn newproc(sched: &mut Scheduler, pid: usize, task: Task) -> GoroutineRef {
    let g = Goroutine::new(next_id(), task);
    sched.runqput(pid, g.clone(), true);
    if sched.main_started() {
        sched.wakep();
    }
    g
}

/// Creates a new goroutine, choosing its target processor via the
/// scheduler's round-robin cursor, then delegates to [`newproc`].
pub fn newproc_auto(sched: &mut Scheduler, task: Task) -> GoroutineRef {
    let pid = sched.next_round_robin_processor();
    newproc(sched, pid, task)
}

/// Creates a new goroutine and immediately parks it on the timer list,
/// without ever installing it into a run queue or runnext (demo-only
/// convenience built on `timer_park`, `spec.md` §6). Keeps I-T1 intact: a
/// timer-listed G is never simultaneously present in a queue or runnext,
/// which a `newproc` followed by a separate `timer_park` call could not
/// guarantee.
pub fn newproc_timer(sched: &mut Scheduler, task: Task, delay_ticks: u64) -> GoroutineRef {
    let g = Goroutine::new(next_id(), task);
    sched.timer_park(g.clone(), delay_ticks);
    g
}

/// Clears the scheduling link and drops the goroutine (`destroyproc`).
/// Every other holder (runnext, a local queue cell, a global-queue chain
/// position, a timer entry) must already have released `g` before this is
/// called — this function only severs the link field per I-G2.
pub fn destroyproc(g: &GoroutineRef) {
    g.borrow_mut().set_link(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goroutine::reset_id_sequence_for_tests;

    #[test]
    fn newproc_installs_into_runnext() {
        reset_id_sequence_for_tests();
        let mut sched = Scheduler::new(1, false).unwrap();
        let g = newproc(&mut sched, 0, Box::new(|| {}));
        assert_eq!(sched.processors()[0].runnext().unwrap().borrow().id(), g.borrow().id());
    }

    #[test]
    fn newproc_auto_round_robins_across_processors() {
        reset_id_sequence_for_tests();
        let mut sched = Scheduler::new(3, false).unwrap();
        newproc_auto(&mut sched, Box::new(|| {}));
        newproc_auto(&mut sched, Box::new(|| {}));
        newproc_auto(&mut sched, Box::new(|| {}));
        assert!(sched.processors()[0].has_runnext());
        assert!(sched.processors()[1].has_runnext());
        assert!(sched.processors()[2].has_runnext());
    }
}
