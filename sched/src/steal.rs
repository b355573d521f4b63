// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Randomized work stealing from a victim's local queue (`spec.md` §4.10).
//!
//! Mirrors the shape of the teacher's `multi_thread::worker::search_for_work`
//! ring scan (`const ROUNDS`, a randomized starting offset via `FastRand`,
//! skip-self), minus the atomics and the half-steal CAS protocol in
//! `async_rt::queue::Local::steal_into`, since only one context ever touches
//! a queue here.

use crate::processor::Processor;

/// Number of randomized ring-scan attempts before a steal gives up
/// (`spec.md` §4.10, mirrors the teacher's `search_for_work` round count).
pub const STEAL_TRIES: usize = 4;

/// Outcome of a successful steal.
#[derive(Debug)]
pub struct StealResult {
    /// The processor id of the victim that was robbed.
    pub victim: usize,
    /// Number of goroutines moved into the thief's local queue.
    pub moved: usize,
}

/// The full outcome of one `steal_work` call, including the randomized
/// scan's starting index (used for the debug scan-summary line even on a
/// miss).
#[derive(Debug)]
pub struct StealAttempt {
    pub start: usize,
    pub result: Option<StealResult>,
}

/// Attempts to steal work for processor `thief_id`, trying up to
/// [`STEAL_TRIES`] full ring rounds; each round scans every other
/// processor once (`spec.md` §4.10: "ring-scan from s ... on budget
/// exhaustion or after one full round with no successful move, return
/// none"). Mirrors the teacher's `search_for_work` (outer `for i in
/// 0..ROUNDS`) calling `steal_one_round` (inner `for i in 0..num`) — the
/// round count bounds how many full scans are attempted, not the length
/// of a single scan.
///
/// Never touches a victim's runnext slot (I-S1). Moves
/// `min(victim.local.len() / 2, thief.local.available_capacity())`
/// goroutines; aborts immediately (without touching any victim) if the
/// thief has zero available local-queue capacity. After a successful
/// move, the caller is expected to immediately `runqget` the thief as the
/// immediate next-to-run (`spec.md` §4.10, "a steal always leaves the
/// thief with a G in hand").
pub fn steal_work(
    thief_id: usize,
    processors: &mut [Processor],
    rng: &fastrand::Rng,
) -> StealAttempt {
    let n = processors.len();
    if n < 2 || processors[thief_id].local().available_capacity() == 0 {
        return StealAttempt {
            start: thief_id,
            result: None,
        };
    }

    let start = rng.usize(0..n);
    for _round in 0..STEAL_TRIES {
        if let Some(result) = steal_one_round(thief_id, start, processors) {
            return StealAttempt {
                start,
                result: Some(result),
            };
        }
    }
    StealAttempt { start, result: None }
}

/// One full ring scan over every processor other than `thief_id`, starting
/// at `start` (`spec.md` §4.10's "ring-scan from s"; the teacher's
/// `steal_one_round`).
fn steal_one_round(thief_id: usize, start: usize, processors: &mut [Processor]) -> Option<StealResult> {
    let n = processors.len();
    for i in 0..n {
        let candidate = (start + i) % n;
        if candidate == thief_id {
            continue;
        }
        let available = processors[thief_id].local().available_capacity();
        if available == 0 {
            return None;
        }
        let victim_half = processors[candidate].local().len() / 2;
        if victim_half == 0 {
            continue;
        }
        let want = victim_half.min(available);
        let moved_gs = processors[candidate].local_mut().drain_half(want);
        if moved_gs.is_empty() {
            continue;
        }
        let moved = moved_gs.len();
        for g in moved_gs {
            processors[thief_id]
                .local_mut()
                .push_back(g)
                .expect("capacity pre-checked above");
        }
        return Some(StealResult {
            victim: candidate,
            moved,
        });
    }
    None
}
