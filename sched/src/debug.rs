// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The exact-format debug text interface (`spec.md` §6).
//!
//! This is a separate channel from the ambient `tracing` instrumentation
//! scattered through the scheduler: these lines are a snapshot-tested
//! contract with a fixed wording, not a log level a caller can tune. Every
//! function here is a no-op unless `enabled` is `true`, so callers gate the
//! whole channel on the scheduler's `debug_mode` flag rather than on a
//! `tracing` filter.

use std::cell::RefCell;

thread_local! {
    static SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Test hook: runs `f` with the debug text channel redirected into an
/// in-memory buffer instead of stdout, returning `f`'s result paired with
/// the captured lines in emission order. Used by scenario tests to assert
/// the exact trace S1-S6 specify (`spec.md` §6, §8).
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    let result = f();
    let lines = SINK.with(|s| s.borrow_mut().take()).unwrap_or_default();
    (result, lines)
}

fn emit(line: String) {
    let captured = SINK.with(|s| {
        let mut s = s.borrow_mut();
        match s.as_mut() {
            Some(buf) => {
                buf.push(line.clone());
                true
            }
            None => false,
        }
    });
    if !captured {
        println!("{line}");
    }
}

pub fn round_header(enabled: bool, round: u64) {
    if enabled {
        emit(format!("--- Round {round} ---"));
    }
}

pub fn dispatch(enabled: bool, pid: usize, gid: u64, source: &str) {
    if enabled {
        emit(format!("P{pid}: Executing G{gid} (from {source})"));
    }
}

pub fn done(enabled: bool, pid: usize, gid: u64) {
    if enabled {
        emit(format!("P{pid}: G{gid} done"));
    }
}

pub fn yielded(enabled: bool, pid: usize, gid: u64, reason: &str) {
    if enabled {
        emit(format!("[yield] P{pid}: G{gid} ({reason}) -> tail"));
    }
}

pub fn pidle_put(enabled: bool, pid: usize, idle: usize) {
    if enabled {
        emit(format!("[pidle] +P{pid} (idle={idle})"));
    }
}

pub fn pidle_get(enabled: bool, pid: usize, idle: usize) {
    if enabled {
        emit(format!("[pidle] -P{pid} (idle={idle})"));
    }
}

pub fn steal_scan_empty(enabled: bool, pid: usize, start: usize) {
    if enabled {
        emit(format!("[steal] P{pid} scan(start={start}): (all empty)"));
    }
}

pub fn steal_hit(enabled: bool, thief: usize, moved: usize, victim: usize) {
    if enabled {
        emit(format!("[steal] P{thief} <- {moved} from P{victim}"));
    }
}

pub fn preempt_mark(enabled: bool, gid: u64, pid: usize, location: &str) {
    if enabled {
        emit(format!("[preemptor] mark G{gid} (P{pid} {location})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_redirects_emitted_lines_and_restores_after() {
        let (_, lines) = capture(|| {
            round_header(true, 1);
            dispatch(true, 0, 7, "runnext");
            done(true, 0, 7);
        });
        assert_eq!(
            lines,
            vec![
                "--- Round 1 ---",
                "P0: Executing G7 (from runnext)",
                "P0: G7 done",
            ]
        );
    }

    #[test]
    fn disabled_channel_emits_nothing_even_while_capturing() {
        let (_, lines) = capture(|| {
            round_header(false, 1);
            dispatch(false, 0, 7, "runnext");
        });
        assert!(lines.is_empty());
    }
}
