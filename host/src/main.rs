// Copyright 2026 gmp-sched contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Demo harness binary: parses CLI configuration, resolves the processor
//! count, and drives the `gmp-sched` scheduler core to completion.

mod cli;
mod demo;
mod logging;

use clap::Parser;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    logging::init_tracing(cli.log_filter.as_deref())?;

    demo::run(&cli)?;
    Ok(())
}
