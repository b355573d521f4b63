// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error taxonomy for the scheduler core (see `spec.md` §7).
//!
//! Recoverable capacity signals are handled at the one well-defined overflow
//! site; everything else that reaches [`SchedError`] is a configuration
//! error surfaced to the host before the scheduler is entered.

use thiserror::Error;

/// Errors the core can report to a caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedError {
    /// A local run queue batch-intake could not fit every element.
    ///
    /// Already-enqueued elements from the same batch are left in the queue;
    /// this is only ever observed at the overflow-spill call site, where it
    /// indicates an invariant violation (the capacity clamp should have
    /// prevented it).
    #[error("local run queue is full")]
    LocalQueueFull,
    /// The host supplied no task functions to create goroutines from.
    #[error("no task functions supplied")]
    NoTaskFunctions,
    /// The host asked for an invalid processor count.
    #[error("processor count {0} out of range [1, 64]")]
    InvalidProcessorCount(u32),
}
