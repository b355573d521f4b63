// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The work finder and the main dispatch loop (`spec.md` §4.8, §4.12).

use tracing::{info, trace};

use crate::debug;
use crate::processor::PStatus;
use crate::runner;
use crate::scheduler::{Scheduler, WorkItem};

/// `find_runnable(p)`: fast path + local, then global batch intake, then
/// stealing, in that fixed order (`spec.md` §4.8).
pub fn find_runnable(sched: &mut Scheduler, pid: usize) -> Option<WorkItem> {
    if let Some(item) = sched.runqget(pid) {
        return Some(item);
    }
    if let Some(item) = sched.globrunqget(pid, None) {
        return Some(item);
    }
    let attempt = sched.steal_for(pid);
    match attempt.result {
        Some(result) => {
            debug::steal_hit(sched.debug_mode(), pid, result.moved, result.victim);
            trace!(pid, victim = result.victim, moved = result.moved, "stole work");
            sched.runqget(pid)
        }
        None => {
            debug::steal_scan_empty(sched.debug_mode(), pid, attempt.start);
            None
        }
    }
}

/// `try_run_from_finder(p)`: on a hit, runs the goroutine and returns
/// `true`; otherwise `false`.
pub fn try_run_from_finder(sched: &mut Scheduler, pid: usize) -> bool {
    match find_runnable(sched, pid) {
        Some(item) => {
            runner::execute_goroutine(sched, pid, item);
            true
        }
        None => false,
    }
}

fn any_other_has_work(sched: &Scheduler, pid: usize) -> bool {
    sched
        .processors()
        .iter()
        .enumerate()
        .any(|(i, p)| i != pid && p.has_work())
}

/// Runs the dispatch loop to termination (`spec.md` §4.12).
///
/// Terminates when the global queue is empty and every processor is
/// parked; at that point every goroutine ever created has reached `Done`
/// and been destroyed (`spec.md`'s termination invariant, property P4).
pub fn schedule(sched: &mut Scheduler) {
    sched.set_main_started(true);
    let mut round: u64 = 1;
    loop {
        sched.on_round_tick();
        debug::round_header(sched.debug_mode(), round);

        if sched.global_is_empty() && sched.idle_count() == sched.nproc() {
            info!(rounds = round, ticks = sched.ticks(), "dispatch loop terminated");
            break;
        }

        for pid in 0..sched.nproc() {
            match sched.processors()[pid].status() {
                PStatus::Parked => continue,
                PStatus::Idle => {
                    if !try_run_from_finder(sched, pid) {
                        sched.pidle_put(pid);
                    }
                }
                PStatus::Running => {
                    if !try_run_from_finder(sched, pid)
                        && !(any_other_has_work(sched, pid) && try_run_from_finder(sched, pid))
                    {
                        sched.pidle_put(pid);
                    }
                }
            }
        }
        round += 1;
    }
}
