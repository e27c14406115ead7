//! CLI commands.

mod allocate;
mod combine;
mod diff;
mod extract;
mod normalize;
mod run;
mod summary;
mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::io::write_json;
use crate::logging;
use crate::output::{print_json, OutputFormat};

/// capctl - Allocate and validate multi-tenant datacenter capacity.
#[derive(Debug, Parser)]
#[command(name = "capctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the JSON document to this file instead of stdout.
    #[arg(long, global = true, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Config file path. Defaults to the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Tracing filter, overriding the configured level.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize a raw capacity document.
    Normalize(normalize::NormalizeCommand),

    /// Allocate the shared or private pools.
    Allocate(allocate::AllocateCommand),

    /// Project allocations down to one domain.
    Extract(extract::ExtractCommand),

    /// Bundle a descriptor with its allocations.
    Combine(combine::CombineCommand),

    /// Validate a combined allocation artifact.
    Validate(validate::ValidateCommand),

    /// Diff two snapshots.
    Diff(diff::DiffCommand),

    /// Summarize a combined allocation artifact.
    Summary(summary::SummaryCommand),

    /// Normalize, allocate and validate in one pass.
    Run(run::RunCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        let level = self.log_level.as_deref().unwrap_or(&config.log_level);
        logging::init(level, self.log_json);

        let ctx = CommandContext {
            config,
            format: self.format,
            output: self.output,
        };

        match self.command {
            Commands::Normalize(cmd) => cmd.run(ctx),
            Commands::Allocate(cmd) => cmd.run(ctx),
            Commands::Extract(cmd) => cmd.run(ctx),
            Commands::Combine(cmd) => cmd.run(ctx),
            Commands::Validate(cmd) => cmd.run(ctx),
            Commands::Diff(cmd) => cmd.run(ctx),
            Commands::Summary(cmd) => cmd.run(ctx),
            Commands::Run(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("capctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl CommandContext {
    /// Emit a command's document.
    ///
    /// With `--output` the JSON goes to the file. Otherwise JSON format
    /// prints it to stdout. Table format always calls `render_table`.
    pub fn emit<T, F>(&self, data: &T, render_table: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(),
    {
        if let Some(path) = &self.output {
            write_json(path, data)?;
        }
        match self.format {
            OutputFormat::Json if self.output.is_none() => print_json(data)?,
            OutputFormat::Json => {}
            OutputFormat::Table => render_table(),
        }
        Ok(())
    }
}
