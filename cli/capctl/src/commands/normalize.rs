//! Normalize command.
//!
//! Reads a raw capacity document and writes the canonical descriptor,
//! the `discovered.json` of the pipeline.

use std::path::PathBuf;

use anyhow::Result;
use capalloc_capacity::{normalize, CapacityDescriptor};
use clap::Args;
use tabled::Tabled;
use tracing::info;

use crate::io::read_json;
use crate::output::{print_info, print_success, print_table};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct NormalizeCommand {
    /// Raw capacity document.
    #[arg(long, env = "CAPACITY_FILE", value_name = "PATH")]
    capacity_file: PathBuf,
}

#[derive(Debug, Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    pool: String,

    #[tabled(rename = "DC")]
    dc: String,

    #[tabled(rename = "CPU")]
    cpu: u64,

    #[tabled(rename = "Memory")]
    mem: u64,

    #[tabled(rename = "Storage")]
    storage: u64,
}

impl NormalizeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let raw = read_json(&self.capacity_file)?;
        let descriptor = normalize(&raw)?;
        info!(
            datacenters = descriptor.datacenters().len(),
            customers = descriptor.private_pools().len(),
            domains = descriptor.domains().len(),
            units = descriptor.paired_units().len(),
            "Capacity normalized"
        );

        ctx.emit(&descriptor, || {
            print_success(&format!(
                "Capacity is valid: {}",
                self.capacity_file.display()
            ));
            print_table(&pool_rows(&descriptor));
            print_info(&format!(
                "{} domain(s), {} paired unit(s)",
                descriptor.domains().len(),
                descriptor.paired_units().len()
            ));
        })
    }
}

fn pool_rows(descriptor: &CapacityDescriptor) -> Vec<PoolRow> {
    let shared = std::iter::once(("shared".to_string(), descriptor.shared_pool()));
    let private = descriptor
        .private_pools()
        .iter()
        .map(|(customer, pool)| (format!("private:{customer}"), pool));

    shared
        .chain(private)
        .flat_map(|(pool, capacity)| {
            descriptor.datacenters().iter().map(move |dc| {
                let quantity = capacity.get(dc).copied().unwrap_or_default();
                PoolRow {
                    pool: pool.clone(),
                    dc: dc.to_string(),
                    cpu: quantity.cpu,
                    mem: quantity.mem,
                    storage: quantity.storage,
                }
            })
        })
        .collect()
}
