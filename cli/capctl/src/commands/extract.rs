//! Extract command.

use std::path::PathBuf;

use anyhow::Result;
use capalloc_allocator::{DomainExtractor, DomainSelector, PrivateAllocations, SharedAllocations};
use capalloc_capacity::CapacityDescriptor;
use clap::Args;
use tracing::info;

use crate::error::CliError;
use crate::io::read_typed;
use crate::output::{allocation_rows, print_table};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Domain to extract: a flat domain name, `pod` or `pairpod`.
    domain: String,

    /// Shared allocator output.
    #[arg(long, env = "SHARED_ALLOC", value_name = "PATH")]
    shared: PathBuf,

    /// Private allocator output.
    #[arg(long, env = "PRIVATE_ALLOC", value_name = "PATH")]
    private: PathBuf,

    /// Normalized descriptor. When given, paired units are matched by
    /// name instead of by naming convention.
    #[arg(long, env = "DISCOVERED_CAPACITY", value_name = "PATH")]
    discovered: Option<PathBuf>,
}

impl ExtractCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let selector = DomainSelector::parse(&self.domain)
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        let shared: SharedAllocations = read_typed(&self.shared)?;
        let private: PrivateAllocations = read_typed(&self.private)?;

        let extractor = match &self.discovered {
            Some(path) => {
                let descriptor: CapacityDescriptor = read_typed(path)?;
                DomainExtractor::for_descriptor(&descriptor)
            }
            None => DomainExtractor::by_convention(),
        };

        let extraction = extractor.extract(&selector, &shared, &private);
        info!(domain = %self.domain, entries = extraction.entry_count(), "Domain extracted");

        ctx.emit(&extraction.to_document(), || {
            let mut rows = allocation_rows("shared", &extraction.shared);
            for (customer, records) in &extraction.private {
                rows.extend(allocation_rows(&format!("private:{customer}"), records));
            }
            print_table(&rows);
        })
    }
}
