//! Print Quote Example
//!
//! Prices a single print order against a fixture set and prints the quote sheet.
//!
//! Use `-c`, `-m`, `-W` and `-H` for the category, material and size in inches
//! Use `-a` (repeatable) for add-ons and `--design` for design services
//! Use `-f` to load a fixture set by name
//! Set `RUST_LOG=printquote=debug` to trace each resolution step

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use printquote::{estimate::estimate, tables::RuleTables, utils::ExampleQuoteArgs};

/// Print Quote Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = ExampleQuoteArgs::parse();
    let tables = RuleTables::from_set(&args.fixture)?;
    let request = args.request();

    let start = Instant::now();
    let response = estimate(&tables, &request)?;
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if let Some(line_name) = response.line_name() {
        writeln!(handle, "\n {line_name}")?;
    }

    response.write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
