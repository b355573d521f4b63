// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Command-line surface for the scheduler demo harness.

use clap::{Parser, ValueEnum};

/// A logical-processor-count policy, resolved against the host's detected
/// core count (`spec.md` §6 "Configuration input").
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProcessorPolicy {
    /// One logical processor per detected CPU core.
    OnePerCore,
    /// Half the detected core count, rounded up, minimum 1.
    HalfCores,
    /// A quarter of the detected core count, rounded up, minimum 1.
    QuarterCores,
    /// Twice the detected core count.
    DoubleCores,
    /// Use the exact count given by `--processors-custom`.
    Custom,
}

/// A named demo workload: the ordered sequence of task functions goroutines
/// are created from round-robin (`spec.md` §6 "Task input").
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Workload {
    /// Every goroutine prints a one-line greeting and finishes immediately.
    Hello,
    /// Every goroutine spins through a bounded counting loop, long enough
    /// to straddle a few preemption passes.
    Busy,
    /// A mix of `hello`-style and `busy`-style goroutines, alternating.
    Mixed,
}

#[derive(Debug, Parser)]
#[command(name = "gmp-sched", about = "Educational GMP scheduler demo harness")]
pub struct Cli {
    /// Processor-count policy.
    #[arg(long, value_enum, default_value_t = ProcessorPolicy::OnePerCore)]
    pub processors: ProcessorPolicy,

    /// Exact processor count when `--processors custom` is selected.
    #[arg(long, default_value_t = 4)]
    pub processors_custom: u32,

    /// Number of goroutines to create before starting the scheduler.
    #[arg(long, default_value_t = 8)]
    pub tasks: u32,

    /// Which demo workload to draw task functions from.
    #[arg(long, value_enum, default_value_t = Workload::Hello)]
    pub workload: Workload,

    /// Emit the exact-format scheduler debug trace (`spec.md` §6).
    #[arg(long)]
    pub debug: bool,

    /// Park every Nth created goroutine on a timer instead of running it
    /// immediately (0 disables timer demo goroutines).
    #[arg(long, default_value_t = 0)]
    pub timer_every: u32,

    /// Tick delay used for timer-parked demo goroutines.
    #[arg(long, default_value_t = 3)]
    pub timer_delay: u64,

    /// Overrides the ambient `tracing` subscriber's filter directives
    /// (`RUST_LOG` syntax), independent of `--debug`'s exact-format trace.
    #[arg(long)]
    pub log_filter: Option<String>,
}
