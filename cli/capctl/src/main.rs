//! capctl - CLI for the capalloc allocation engine
//!
//! Normalizes capacity documents, allocates shared and private pools,
//! validates and diffs the resulting artifacts.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod io;
mod logging;
mod output;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
