//! Run command: the whole pipeline in one process.
//!
//! Writes `discovered.json`, `shared.json`, `private.json`,
//! `allocation.json` and `validation.json` to the output directory. The
//! validation report is written even when it fails.

use std::path::{Path, PathBuf};

use anyhow::Result;
use capalloc_allocator::PoolAllocator;
use capalloc_capacity::normalize;
use capalloc_validate::{CombinedArtifact, ValidationReport, Validator};
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::io::{read_json, write_json};

use super::validate::report_outcome;
use super::CommandContext;

pub const DISCOVERED_FILE: &str = "discovered.json";
pub const SHARED_FILE: &str = "shared.json";
pub const PRIVATE_FILE: &str = "private.json";
pub const ALLOCATION_FILE: &str = "allocation.json";
pub const VALIDATION_FILE: &str = "validation.json";

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Raw capacity document.
    #[arg(long, env = "CAPACITY_FILE", value_name = "PATH")]
    capacity_file: PathBuf,

    /// Directory for the pipeline's documents.
    #[arg(long, value_name = "DIR", default_value = "allocation-out")]
    out_dir: PathBuf,

    /// Override the isolation ceiling.
    #[arg(long)]
    isolation_ceiling: Option<f64>,

    /// Enable the per-entry shared CPU ceiling.
    #[arg(long)]
    domain_share_ceiling: Option<f64>,
}

impl RunCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let config = ctx
            .config
            .clone()
            .with_overrides(self.isolation_ceiling, self.domain_share_ceiling)?;
        let raw = read_json(&self.capacity_file)?;

        let validator = Validator::new(config.validator_config());
        let report = run_pipeline(&raw, &self.out_dir, &validator)?;
        report_outcome(&ctx, &report)
    }
}

/// Normalize, allocate, combine and validate `raw`, writing each stage.
///
/// Normalization or allocation failures stop the run before any later
/// document is written.
pub(crate) fn run_pipeline(
    raw: &Value,
    out_dir: &Path,
    validator: &Validator,
) -> Result<ValidationReport> {
    let discovered = normalize(raw)?;
    write_json(&out_dir.join(DISCOVERED_FILE), &discovered)?;

    let allocator = PoolAllocator::new(&discovered);
    let shared = allocator.allocate_shared()?;
    write_json(&out_dir.join(SHARED_FILE), &shared)?;

    let private = allocator.allocate_private()?;
    write_json(&out_dir.join(PRIVATE_FILE), &private)?;

    let artifact = CombinedArtifact::new(discovered, shared, private);
    write_json(&out_dir.join(ALLOCATION_FILE), &artifact)?;

    let report = validator.validate(&artifact);
    write_json(&out_dir.join(VALIDATION_FILE), &report)?;

    info!(out_dir = %out_dir.display(), status = %report.status(), "Pipeline finished");
    Ok(report)
}
