// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! smtest-report: translate recorded test runs into TeamCity service messages
//!
//! Reads a recorded run (or libtest JSON) from a file or stdin and writes the
//! matching `##teamcity[...]` lines to stdout or a file.
//!
//! ```text
//! cargo nextest run --message-format libtest-json | smtest-report --format libtest
//! ```

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use smtest_report::config::Config;
use smtest_report::run::run;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Service messages own stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(config.log_level().into()),
        )
        .init();

    config.validate().context("Invalid configuration")?;

    let result = run(&config).context("Failed to translate test run")?;
    if !result.was_successful() {
        warn!(failed = result.failure_count, "Run contained failing tests");
    }
    Ok(())
}
