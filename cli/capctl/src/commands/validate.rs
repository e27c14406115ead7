//! Validate command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use capalloc_validate::{CombinedArtifact, ValidationReport, Validator};
use clap::Args;
use tabled::Tabled;

use crate::error::CliError;
use crate::io::read_json;
use crate::output::{print_failure, print_info, print_success, print_table};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Combined allocation artifact.
    #[arg(long, env = "ALLOCATION_FILE", value_name = "PATH")]
    allocation: PathBuf,

    /// Override the isolation ceiling.
    #[arg(long)]
    isolation_ceiling: Option<f64>,

    /// Enable the per-entry shared CPU ceiling.
    #[arg(long)]
    domain_share_ceiling: Option<f64>,
}

#[derive(Debug, Tabled)]
struct ViolationRow {
    #[tabled(rename = "#")]
    index: usize,

    #[tabled(rename = "Violation")]
    message: String,
}

impl ValidateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let config = ctx
            .config
            .clone()
            .with_overrides(self.isolation_ceiling, self.domain_share_ceiling)?;

        let value = read_json(&self.allocation)?;
        let artifact = CombinedArtifact::from_value(&value)
            .with_context(|| format!("Failed to load {}", self.allocation.display()))?;

        let report = Validator::new(config.validator_config()).validate(&artifact);
        report_outcome(&ctx, &report)
    }
}

/// Emit a report, failing when it holds violations.
pub(super) fn report_outcome(ctx: &CommandContext, report: &ValidationReport) -> Result<()> {
    ctx.emit(report, || render_report(report))?;
    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed {
            violations: report.violations().len(),
        }
        .into())
    }
}

fn render_report(report: &ValidationReport) {
    if report.is_ok() {
        print_success("Allocation is valid");
    } else {
        print_failure(&format!("{} violation(s)", report.violations().len()));
        let rows: Vec<ViolationRow> = report
            .violations()
            .iter()
            .enumerate()
            .map(|(i, message)| ViolationRow {
                index: i + 1,
                message: message.clone(),
            })
            .collect();
        print_table(&rows);
    }
    for note in report.notes() {
        print_info(note);
    }
}
