// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Property tests for the universal invariants P1-P8 from `spec.md` §8.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use std::sync::atomic::{AtomicU64, Ordering};

use gmp_sched::dispatch::try_run_from_finder;
use gmp_sched::goroutine::Goroutine;
use gmp_sched::processor::{PStatus, Processor};
use gmp_sched::queue::local::CAPACITY as LOCAL_CAPACITY;
use gmp_sched::steal::{steal_work, STEAL_TRIES};
use gmp_sched::{newproc_auto, schedule, GStatus, Scheduler, Task};

fn counting_task(counter: &Rc<RefCell<usize>>) -> Task {
    let counter = counter.clone();
    Box::new(move || *counter.borrow_mut() += 1)
}

/// A test-local id source, independent of the library's internal
/// monotonic generator (`goroutine::next_id` is crate-private).
static TEST_NEXT_ID: AtomicU64 = AtomicU64::new(1_000_000);

fn test_next_id() -> u64 {
    TEST_NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Replays `dispatch::schedule`'s loop one round at a time via the public
/// per-processor primitives, returning the number of rounds it took to
/// reach termination. Used to test the liveness bound in P3 without
/// needing an internal round counter in the library itself.
fn schedule_counting_rounds(sched: &mut Scheduler) -> u64 {
    let mut round: u64 = 0;
    loop {
        sched.on_round_tick();
        round += 1;
        if sched.global_is_empty() && sched.idle_count() == sched.nproc() {
            return round;
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
                    let has_other_work = sched
                        .processors()
                        .iter()
                        .enumerate()
                        .any(|(i, p)| i != pid && p.has_work());
                    if !try_run_from_finder(sched, pid) && !(has_other_work && try_run_from_finder(sched, pid)) {
                        sched.pidle_put(pid);
                    }
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// P4: every goroutine created reaches `Done`, is destroyed, the
    /// global queue ends empty, and every processor ends parked.
    #[test]
    fn p4_termination_runs_every_goroutine_exactly_once(
        nproc in 1u32..9,
        ntasks in 0usize..250,
    ) {
        let mut sched = Scheduler::new(nproc, false).unwrap();
        let completed = Rc::new(RefCell::new(0usize));
        for _ in 0..ntasks {
            newproc_auto(&mut sched, counting_task(&completed));
        }

        schedule(&mut sched);

        prop_assert_eq!(*completed.borrow(), ntasks);
        prop_assert!(sched.global_is_empty());
        prop_assert_eq!(sched.idle_count(), sched.nproc());
        for p in sched.processors() {
            prop_assert_eq!(p.status(), PStatus::Parked);
            prop_assert!(!p.has_work());
        }
    }

    /// P2: `idle_count()` (backed by `npidle`) always equals the number of
    /// processors whose status is `Parked`, both mid-run and at
    /// termination.
    #[test]
    fn p2_idle_count_matches_parked_processors(
        nproc in 1u32..9,
        ntasks in 0usize..120,
    ) {
        let mut sched = Scheduler::new(nproc, false).unwrap();
        let completed = Rc::new(RefCell::new(0usize));
        for _ in 0..ntasks {
            newproc_auto(&mut sched, counting_task(&completed));
        }

        for _ in 0..2000 {
            sched.on_round_tick();
            let parked = sched.processors().iter().filter(|p| p.status() == PStatus::Parked).count();
            prop_assert_eq!(sched.idle_count(), parked);
            if sched.global_is_empty() && sched.idle_count() == sched.nproc() {
                break;
            }
            for pid in 0..sched.nproc() {
                match sched.processors()[pid].status() {
                    PStatus::Parked => continue,
                    _ => {
                        if !try_run_from_finder(&mut sched, pid) {
                            sched.pidle_put(pid);
                        }
                    }
                }
            }
            let parked = sched.processors().iter().filter(|p| p.status() == PStatus::Parked).count();
            prop_assert_eq!(sched.idle_count(), parked);
        }
    }

    /// P3 (liveness): when all outstanding work is serialized behind a
    /// single processor, termination never takes dramatically more rounds
    /// than the work itself demands — bounded by the task count plus the
    /// fixed per-processor steal-scan overhead the spec's formula names.
    #[test]
    fn p3_bounded_progress_when_work_is_concentrated(
        nproc in 1u32..7,
        ntasks in 0usize..60,
    ) {
        let mut sched = Scheduler::new(nproc, false).unwrap();
        let completed = Rc::new(RefCell::new(0usize));
        for _ in 0..ntasks {
            gmp_sched::newproc(&mut sched, 0, counting_task(&completed));
        }

        let rounds = schedule_counting_rounds(&mut sched);

        let n = u64::from(nproc);
        let bound = ntasks as u64 + n * STEAL_TRIES as u64 + n + 2;
        prop_assert!(rounds <= bound, "rounds={rounds} bound={bound}");
        prop_assert_eq!(*completed.borrow(), ntasks);
    }

    /// P6: a steal moves exactly `min(victim_local_size/2, thief_available)`
    /// goroutines in FIFO order, and never touches the victim's runnext.
    #[test]
    fn p6_steal_moves_exact_half_and_spares_runnext(
        victim_size in 0usize..200,
        thief_headroom in 0usize..200,
    ) {
        let mut ps: Vec<Processor> = (0..2).map(Processor::new).collect();
        for _ in 0..victim_size {
            ps[1].local_mut().push_back(Goroutine::new(test_next_id(), Box::new(|| {}))).unwrap();
        }
        ps[1].set_runnext(Goroutine::new(test_next_id(), Box::new(|| {})));
        let runnext_id = ps[1].runnext().unwrap().borrow().id();

        // Pre-fill the thief so its available capacity is `thief_headroom`.
        let prefill = LOCAL_CAPACITY.saturating_sub(thief_headroom);
        for _ in 0..prefill {
            ps[0].local_mut().push_back(Goroutine::new(test_next_id(), Box::new(|| {}))).unwrap();
        }

        let expected = (victim_size / 2).min(ps[0].local().available_capacity());
        let rng = fastrand::Rng::with_seed(1234);
        let attempt = steal_work(0, &mut ps, &rng);

        prop_assert_eq!(ps[1].runnext().unwrap().borrow().id(), runnext_id);
        match attempt.result {
            Some(result) => {
                prop_assert_eq!(result.victim, 1);
                prop_assert_eq!(result.moved, expected);
                prop_assert!(expected > 0);
            }
            None => prop_assert_eq!(expected, 0),
        }
    }

    /// P7: batch dequeue of size 1 matches a single dequeue; batch dequeue
    /// of the full size empties the queue via the O(1) take-all path.
    #[test]
    fn p7_batch_dequeue_matches_single_and_take_all(size in 1usize..500) {
        use gmp_sched::queue::GlobalRunQueue;

        let mut q1 = GlobalRunQueue::new();
        let mut q2 = GlobalRunQueue::new();
        let mut ids = Vec::with_capacity(size);
        for _ in 0..size {
            let id = test_next_id();
            ids.push(id);
            q1.enqueue(Goroutine::new(id, Box::new(|| {})));
            q2.enqueue(Goroutine::new(id, Box::new(|| {})));
        }

        let single = q1.dequeue().unwrap();
        let batch_of_one = q2.batch_dequeue(1).unwrap();
        prop_assert_eq!(single.borrow().id(), batch_of_one.immediate_g.borrow().id());
        prop_assert_eq!(batch_of_one.chain_len, 0);
        prop_assert_eq!(q1.len(), q2.len());

        let mut q3 = GlobalRunQueue::new();
        for &id in &ids {
            q3.enqueue(Goroutine::new(id, Box::new(|| {})));
        }
        let cut = q3.batch_dequeue(size).unwrap();
        prop_assert_eq!(cut.immediate_g.borrow().id(), ids[0]);
        prop_assert_eq!(cut.chain_len, size - 1);
        prop_assert!(q3.is_empty());
    }

    /// P8: passive replenishment. `runqget` returns runnext when occupied
    /// without consuming or reordering the local queue.
    #[test]
    fn p8_runqget_prefers_runnext_without_touching_local(local_len in 0usize..50) {
        let mut sched = Scheduler::new(1, false).unwrap();
        let mut local_ids = Vec::with_capacity(local_len);
        for _ in 0..local_len {
            let id = test_next_id();
            local_ids.push(id);
            sched.runqput(0, Goroutine::new(id, Box::new(|| {})), false);
        }
        let runnext_id = test_next_id();
        sched.runqput(0, Goroutine::new(runnext_id, Box::new(|| {})), true);

        let item = sched.runqget(0).unwrap();
        prop_assert_eq!(item.g.borrow().id(), runnext_id);
        prop_assert_eq!(sched.processors()[0].local().len(), local_len);
        if let Some(front) = sched.processors()[0].local().front() {
            prop_assert_eq!(front.borrow().id(), local_ids[0]);
        }
    }
}

/// P5: a goroutine marked by the preemption pass yields on its very next
/// dispatch (finished=false, tail-requeue, reason=Preempt) without the
/// task ever running, regardless of how it was reached.
#[test]
fn p5_marked_goroutine_yields_before_task_runs() {
    let mut sched = Scheduler::new(1, false).unwrap();
    let ran = Rc::new(RefCell::new(false));
    let ran_clone = ran.clone();
    let g = gmp_sched::newproc(&mut sched, 0, Box::new(move || *ran_clone.borrow_mut() = true));
    g.borrow_mut().request_preempt();

    assert!(try_run_from_finder(&mut sched, 0));
    assert!(!*ran.borrow());
    assert_eq!(g.borrow().status(), GStatus::Ready);
    assert_eq!(g.borrow().last_yield_reason(), gmp_sched::YieldReason::Preempt);

    assert!(try_run_from_finder(&mut sched, 0));
    assert!(*ran.borrow());
    assert_eq!(g.borrow().status(), GStatus::Done);
}
