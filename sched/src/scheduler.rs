// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Scheduler state root: aggregates the processor array, the queue network,
//! the idle stack, the timer list, and the tick clock, and hosts the
//! operations that need cross-cutting context (`runqput`/`runqget`,
//! `globrunqput`/`globrunqget`, wakeups) — `spec.md` §3 "Scheduler state",
//! §4.6, §4.7, §4.9.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::debug;
use crate::error::SchedError;
use crate::goroutine::GoroutineRef;
use crate::idle::IdleStack;
use crate::processor::{PStatus, Processor};
use crate::queue::{self, GlobalRunQueue};
use crate::steal;
use crate::timer::{Clock, TimerList, DEFAULT_PREEMPT_PERIOD};

/// Capacity of the overflow-spill staging buffer: half the local queue plus
/// the one goroutine that overflowed it (`spec.md` §4.6 "a stack buffer of
/// capacity (N_local/2 + 1)").
const SPILL_STAGING_CAPACITY: usize = queue::local::CAPACITY / 2 + 1;

/// Where a dispatched goroutine came from, for the debug trace and the
/// finder's ordering contract (`spec.md` §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkSource {
    Runnext,
    Runq,
    Global,
}

impl WorkSource {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkSource::Runnext => "runnext",
            WorkSource::Runq => "runq",
            WorkSource::Global => "global",
        }
    }
}

/// A goroutine paired with where it was found.
#[derive(Debug)]
pub struct WorkItem {
    pub g: GoroutineRef,
    pub source: WorkSource,
}

/// The aggregate scheduler state (`spec.md`'s "Scheduler state").
pub struct Scheduler {
    processors: Vec<Processor>,
    global: GlobalRunQueue,
    idle: IdleStack,
    clock: Clock,
    timers: TimerList,
    main_started: bool,
    debug_mode: bool,
    rng: fastrand::Rng,
    rr_cursor: usize,
}

impl Scheduler {
    /// Constructs a scheduler with `n` processors, `n` in `[1, 64]`
    /// (`spec.md` §6 "Configuration input").
    pub fn new(n: u32, debug_mode: bool) -> Result<Self, SchedError> {
        if n == 0 || n > 64 {
            return Err(SchedError::InvalidProcessorCount(n));
        }
        let processors = (0..n as usize).map(Processor::new).collect();
        Ok(Scheduler {
            processors,
            global: GlobalRunQueue::new(),
            idle: IdleStack::new(),
            clock: Clock::new(DEFAULT_PREEMPT_PERIOD),
            timers: TimerList::new(),
            main_started: false,
            debug_mode,
            rng: fastrand::Rng::new(),
            rr_cursor: 0,
        })
    }

    pub fn nproc(&self) -> usize {
        self.processors.len()
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processors_mut(&mut self) -> &mut [Processor] {
        &mut self.processors
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn main_started(&self) -> bool {
        self.main_started
    }

    pub fn set_main_started(&mut self, started: bool) {
        self.main_started = started;
    }

    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn global_is_empty(&self) -> bool {
        self.global.is_empty()
    }

    pub fn global_len(&self) -> usize {
        self.global.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Round-robins across processors for `newproc_auto` (`spec.md` §4.14).
    /// Single-context only; a multi-context variant must move this cursor
    /// into synchronized state (`spec.md` §9).
    pub fn next_round_robin_processor(&mut self) -> usize {
        let pid = self.rr_cursor;
        self.rr_cursor = (self.rr_cursor + 1) % self.processors.len();
        pid
    }

    // ---- local-queue operations (§4.6) ----

    /// `runqput(p, g, to_runnext)`.
    pub fn runqput(&mut self, pid: usize, g: GoroutineRef, to_runnext: bool) {
        if to_runnext {
            if !self.processors[pid].has_runnext() {
                self.processors[pid].set_runnext(g);
                return;
            }
            let demoted = self.processors[pid]
                .set_runnext(g)
                .expect("has_runnext() just confirmed the slot is occupied");
            if self.processors[pid].local_mut().push_back(demoted.clone()).is_err() {
                self.runqputslow(pid, demoted);
            }
            return;
        }
        if self.processors[pid].local_mut().push_back(g.clone()).is_err() {
            self.runqputslow(pid, g);
        }
    }

    /// `runqget(p)`.
    pub fn runqget(&mut self, pid: usize) -> Option<WorkItem> {
        if let Some(g) = self.processors[pid].take_runnext() {
            return Some(WorkItem {
                g,
                source: WorkSource::Runnext,
            });
        }
        self.processors[pid]
            .local_mut()
            .pop_front()
            .map(|g| WorkItem {
                g,
                source: WorkSource::Runq,
            })
    }

    /// Thin wrapper named for the runner's call site (`spec.md` §4.11 step
    /// 5): a tail re-enqueue that records why the G yielded.
    pub fn runqput_tail_with_reason(&mut self, pid: usize, g: GoroutineRef) {
        self.runqput(pid, g, false);
    }

    /// `runqputslow(p, new_g)`.
    fn runqputslow(&mut self, pid: usize, new_g: GoroutineRef) {
        let size = self.processors[pid].local().len();
        let h = size / 2;
        if h == 0 {
            self.globrunqput(new_g);
            return;
        }
        let mut batch: ArrayVec<GoroutineRef, SPILL_STAGING_CAPACITY> = ArrayVec::new();
        for _ in 0..h {
            if let Some(g) = self.processors[pid].local_mut().pop_front() {
                batch.push(g);
            }
        }
        batch.push(new_g);
        if self.debug_mode {
            shuffle(&mut batch, &self.rng);
        }
        let count = batch.len();
        trace!(pid, count, "spilling local queue overflow to global queue");
        self.global.enqueue_many(batch);
        self.wake_for_new_work(count);
    }

    // ---- global-queue operations (§4.7) ----

    /// `globrunqput(g)`.
    pub fn globrunqput(&mut self, g: GoroutineRef) {
        self.global.enqueue(g);
        self.wake_for_new_work(1);
    }

    /// `globrunqget(p, cap_hint)`. `cap_hint` is `None` when the caller has
    /// no external bound to suggest (the finder's own call, §4.8, passes
    /// `None`).
    pub fn globrunqget(&mut self, pid: usize, cap_hint: Option<usize>) -> Option<WorkItem> {
        if self.global.is_empty() {
            return None;
        }
        let gsize = self.global.len();
        let mut k = gsize / self.processors.len() + 1;
        k = k.min(gsize / 2);
        if let Some(hint) = cap_hint {
            k = k.min(hint);
        }
        k = k.min(queue::local::CAPACITY / 2);
        let avail = self.processors[pid].local().available_capacity();
        k = k.min(avail);
        if k == 0 {
            if avail == 0 {
                return None;
            }
            k = 1;
        }

        let cut = self.global.batch_dequeue(k)?;
        if cut.chain_head.is_some() {
            self.processors[pid]
                .local_mut()
                .enqueue_chain(cut.chain_head)
                .expect("available capacity was clamped for above");
        }
        Some(WorkItem {
            g: cut.immediate_g,
            source: WorkSource::Global,
        })
    }

    // ---- idle stack / wakeups (§4.5, §4.9) ----

    /// `pidle_put(p)`.
    pub fn pidle_put(&mut self, pid: usize) {
        self.processors[pid].set_status(PStatus::Parked);
        self.idle.pidle_put(pid);
        debug::pidle_put(self.debug_mode, pid, self.idle.len());
        debug!(pid, idle = self.idle.len(), "processor parked");
    }

    /// `wake_for_new_work(k)`.
    pub fn wake_for_new_work(&mut self, k: usize) -> Vec<usize> {
        if k == 0 {
            return Vec::new();
        }
        let woken = self.idle.wake_for_new_work(k, &mut self.processors);
        for &pid in &woken {
            debug::pidle_get(self.debug_mode, pid, self.idle.len());
        }
        woken
    }

    /// `wakep()`: wakes exactly one idle processor, called by `newproc`
    /// once the dispatch loop has started (`spec.md` §4.14).
    pub fn wakep(&mut self) {
        self.wake_for_new_work(1);
    }

    /// Runs `steal_work` for `pid` against the full processor array.
    pub fn steal_for(&mut self, pid: usize) -> steal::StealAttempt {
        steal::steal_work(pid, &mut self.processors, &self.rng)
    }

    // ---- timer / preemption timeline (§4.13) ----

    /// `on_round_tick()`.
    pub fn on_round_tick(&mut self) {
        self.clock.tick();
        self.process_expired_timers();
        self.maybe_preempt_pass();
    }

    fn process_expired_timers(&mut self) {
        let expired = self.timers.drain_expired(self.clock.ticks());
        for g in expired {
            self.globrunqput(g);
        }
    }

    fn maybe_preempt_pass(&mut self) {
        if !self.clock.take_preempt_due() {
            return;
        }
        for p in &self.processors {
            let Some(g) = p.preview_local_next() else {
                continue;
            };
            if g.borrow().preempt_requested() {
                continue;
            }
            let location = if p.has_runnext() { "runnext" } else { "runq-front" };
            g.borrow_mut().request_preempt();
            debug::preempt_mark(self.debug_mode, g.borrow().id(), p.id(), location);
        }
    }

    /// `timer_park(g, delay_ticks)`.
    pub fn timer_park(&mut self, g: GoroutineRef, delay_ticks: u64) {
        self.timers.park(g, self.clock.ticks() + delay_ticks);
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Destroys all residual goroutines (runnext slots, local queues, the
    /// global queue, the timer list) and drops the processor array
    /// (`spec.md` §6 `deinit`, §5 "Memory ownership").
    pub fn deinit(&mut self) {
        for p in &mut self.processors {
            p.take_runnext();
            p.local_mut().clear();
        }
        while self.global.dequeue().is_some() {}
        self.timers = TimerList::new();
        self.processors.clear();
    }
}

fn shuffle(items: &mut [GoroutineRef], rng: &fastrand::Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(0..=i);
        items.swap(i, j);
    }
}
