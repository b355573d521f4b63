// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A miniature, single-threaded, cooperative reimplementation of Go's GMP
//! scheduler: goroutines (G) dispatched across a fixed pool of logical
//! processors (P), each with a single-slot fast path and a bounded local
//! run queue, backed by a shared global run queue, a LIFO idle-processor
//! stack, randomized work stealing, and a tick-driven preemption timeline.

pub mod debug;
pub mod dispatch;
pub mod error;
pub mod goroutine;
pub mod idle;
pub mod lifecycle;
pub mod processor;
pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod steal;
pub mod timer;

pub use error::SchedError;
pub use goroutine::{GStatus, Goroutine, GoroutineRef, Task, YieldReason};
pub use processor::{PStatus, Processor};
pub use scheduler::{Scheduler, WorkItem, WorkSource};

/// `init(allocator, debug_mode)`: constructs a scheduler with `n` logical
/// processors (`spec.md` §6).
///
/// This educational runtime has no pluggable allocator; the `Scheduler`
/// owns its processor array on the Rust global allocator, so `init` takes
/// only the processor count and the debug-mode switch.
pub fn init(n: u32, debug_mode: bool) -> Result<Scheduler, SchedError> {
    Scheduler::new(n, debug_mode)
}

/// `deinit(state)`: destroys all residual goroutines and frees the
/// processor array.
pub fn deinit(sched: &mut Scheduler) {
    sched.deinit();
}

/// `newproc(state, p, task)`.
pub fn newproc(sched: &mut Scheduler, pid: usize, task: goroutine::Task) -> GoroutineRef {
    lifecycle::newproc(sched, pid, task)
}

/// `newproc_auto(state, task)`.
pub fn newproc_auto(sched: &mut Scheduler, task: goroutine::Task) -> GoroutineRef {
    lifecycle::newproc_auto(sched, task)
}

/// Demo convenience: creates a goroutine already parked on the timer list
/// (see [`lifecycle::newproc_timer`]).
pub fn newproc_timer(sched: &mut Scheduler, task: goroutine::Task, delay_ticks: u64) -> GoroutineRef {
    lifecycle::newproc_timer(sched, task, delay_ticks)
}

/// `schedule(state)`: runs the dispatch loop to termination.
pub fn schedule(sched: &mut Scheduler) {
    dispatch::schedule(sched)
}

/// `timer_park(state, g, delay_ticks)`: optional demo hook (`spec.md` §6).
pub fn timer_park(sched: &mut Scheduler, g: GoroutineRef, delay_ticks: u64) {
    sched.timer_park(g, delay_ticks)
}
