//! Summary command.
//!
//! Condenses a combined artifact into the document downstream notifiers
//! consume. Nothing is sent anywhere.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use capalloc_capacity::ResourceQuantity;
use capalloc_id::{CustomerId, DatacenterId, DomainName};
use capalloc_validate::CombinedArtifact;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::io::read_json;
use crate::output::{print_info, print_table};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Combined allocation artifact.
    #[arg(long, env = "ALLOCATION_FILE", value_name = "PATH")]
    allocation: PathBuf,
}

/// Granted totals across every datacenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTotals {
    pub shared: ResourceQuantity,
    pub private: BTreeMap<CustomerId, ResourceQuantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub generated_at: String,
    pub datacenters: Vec<DatacenterId>,
    pub domains: Vec<DomainName>,
    pub shared_entries: BTreeMap<DatacenterId, usize>,
    pub customers: Vec<CustomerId>,
    pub totals: SummaryTotals,
}

impl AllocationSummary {
    pub fn new(artifact: &CombinedArtifact, generated_at: DateTime<Utc>) -> Self {
        let descriptor = &artifact.discovered;
        let shared = &artifact.shared.shared_allocations;

        let shared_entries: BTreeMap<_, _> = descriptor
            .datacenters()
            .iter()
            .map(|dc| (dc.clone(), shared.get(dc).map_or(0, BTreeMap::len)))
            .collect();

        let private: BTreeMap<_, _> = artifact
            .private
            .private_allocations
            .iter()
            .map(|(customer, records)| {
                let total: ResourceQuantity = records.values().flat_map(BTreeMap::values).sum();
                (customer.clone(), total)
            })
            .collect();

        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            datacenters: descriptor.datacenters().to_vec(),
            domains: descriptor.domains().keys().cloned().collect(),
            shared_entries,
            customers: descriptor.customers().cloned().collect(),
            totals: SummaryTotals {
                shared: shared.values().flat_map(BTreeMap::values).sum(),
                private,
            },
        }
    }
}

#[derive(Debug, Tabled)]
struct TotalRow {
    #[tabled(rename = "Pool")]
    pool: String,

    #[tabled(rename = "CPU")]
    cpu: u64,

    #[tabled(rename = "Memory")]
    mem: u64,

    #[tabled(rename = "Storage")]
    storage: u64,
}

impl TotalRow {
    fn new(pool: String, quantity: &ResourceQuantity) -> Self {
        Self {
            pool,
            cpu: quantity.cpu,
            mem: quantity.mem,
            storage: quantity.storage,
        }
    }
}

impl SummaryCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let value = read_json(&self.allocation)?;
        let artifact = CombinedArtifact::from_value(&value)
            .with_context(|| format!("Failed to load {}", self.allocation.display()))?;
        let summary = AllocationSummary::new(&artifact, Utc::now());

        ctx.emit(&summary, || {
            print_info(&format!(
                "{} datacenter(s), {} domain(s), {} customer(s)",
                summary.datacenters.len(),
                summary.domains.len(),
                summary.customers.len()
            ));
            let mut rows = vec![TotalRow::new("shared".to_string(), &summary.totals.shared)];
            rows.extend(
                summary
                    .totals
                    .private
                    .iter()
                    .map(|(customer, total)| TotalRow::new(format!("private:{customer}"), total)),
            );
            print_table(&rows);
        })
    }
}
