// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Ambient structured logging setup, separate from the scheduler's exact
//! `--debug` text trace. Grounded on the teacher's `xtask` logger
//! (`tracing-subscriber` + `EnvFilter`, defaulting quiet unless
//! `RUST_LOG` is set).

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. `filter_override` (from
/// `--log-filter`) takes precedence over `RUST_LOG`, which takes precedence
/// over a `warn` default.
pub fn init_tracing(filter_override: Option<&str>) -> Result<()> {
    let filter = match filter_override {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| eyre!("invalid --log-filter directives {directives:?}: {e}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))
}
