// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Processor-count policy resolution and the sample task-function
//! providers the demo harness feeds into the scheduler core
//! (`spec.md` §6, §7 "external collaborators").

use std::num::NonZeroUsize;

use color_eyre::eyre::{bail, Result};
use gmp_sched::Task;
use tracing::info;

use crate::cli::{Cli, ProcessorPolicy, Workload};

/// Resolves a processor-count policy against the host's detected core
/// count, clamped to the scheduler's accepted range `[1, 64]`.
pub fn resolve_processor_count(policy: ProcessorPolicy, custom: u32) -> u32 {
    let cores = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let cores = u32::try_from(cores).unwrap_or(u32::MAX);

    let n = match policy {
        ProcessorPolicy::OnePerCore => cores,
        ProcessorPolicy::HalfCores => cores.div_ceil(2),
        ProcessorPolicy::QuarterCores => cores.div_ceil(4),
        ProcessorPolicy::DoubleCores => cores.saturating_mul(2),
        ProcessorPolicy::Custom => custom,
    };
    n.clamp(1, 64)
}

/// A factory producing a fresh, one-shot task for goroutine `id`. Providers
/// are ordered and selected round-robin (`spec.md` §6 "Task input").
pub type TaskFactory = Box<dyn Fn(u64) -> Task>;

fn hello_factory() -> TaskFactory {
    Box::new(|id| -> Task { Box::new(move || println!("hello from G{id}")) })
}

/// A bounded, synchronous busy-loop — long enough to straddle a few
/// preemption passes in spirit, but still a single scheduling slice: there
/// is no in-task yield primitive (`spec.md` §5 "Suspension points").
fn busy_factory() -> TaskFactory {
    Box::new(|id| -> Task {
        Box::new(move || {
            let mut acc: u64 = 0;
            for i in 0..50_000u64 {
                acc = acc.wrapping_add(i ^ id);
            }
            std::hint::black_box(acc);
        })
    })
}

/// Returns the ordered task-function provider for `workload`.
pub fn task_factories(workload: Workload) -> Vec<TaskFactory> {
    match workload {
        Workload::Hello => vec![hello_factory()],
        Workload::Busy => vec![busy_factory()],
        Workload::Mixed => vec![hello_factory(), busy_factory()],
    }
}

/// Runs the full demo: resolves the processor count, validates the task
/// configuration, creates goroutines round-robin from the workload's task
/// factories, optionally parks a subset on timers, and runs the dispatch
/// loop to termination.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.tasks == 0 {
        bail!(RED_NO_TASKS);
    }

    let nproc = resolve_processor_count(cli.processors, cli.processors_custom);
    info!(nproc, tasks = cli.tasks, workload = ?cli.workload, "starting scheduler demo");

    let mut sched = gmp_sched::init(nproc, cli.debug)?;
    let factories = task_factories(cli.workload);

    for i in 0..cli.tasks {
        let id = u64::from(i);
        let factory_idx = (i as usize) % factories.len();
        let task = factories[factory_idx](id);

        if cli.timer_every > 0 && i % cli.timer_every == 0 {
            gmp_sched::newproc_timer(&mut sched, task, cli.timer_delay);
        } else {
            gmp_sched::newproc_auto(&mut sched, task);
        }
    }

    gmp_sched::schedule(&mut sched);
    gmp_sched::deinit(&mut sched);

    info!("scheduler demo finished");
    Ok(())
}

const RED_NO_TASKS: &str = "\u{1b}[31merror: no task functions supplied (--tasks 0)\u{1b}[0m";
