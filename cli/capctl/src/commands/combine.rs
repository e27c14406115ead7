//! Combine command.

use std::path::PathBuf;

use anyhow::Result;
use capalloc_allocator::{PrivateAllocations, SharedAllocations};
use capalloc_capacity::CapacityDescriptor;
use capalloc_validate::CombinedArtifact;
use clap::Args;

use crate::io::read_typed;
use crate::output::print_success;

use super::CommandContext;

#[derive(Debug, Args)]
pub struct CombineCommand {
    /// Normalized capacity descriptor.
    #[arg(long, env = "DISCOVERED_CAPACITY", value_name = "PATH")]
    discovered: PathBuf,

    /// Shared allocator output.
    #[arg(long, env = "SHARED_ALLOC", value_name = "PATH")]
    shared: PathBuf,

    /// Private allocator output.
    #[arg(long, env = "PRIVATE_ALLOC", value_name = "PATH")]
    private: PathBuf,
}

impl CombineCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let discovered: CapacityDescriptor = read_typed(&self.discovered)?;
        let shared: SharedAllocations = read_typed(&self.shared)?;
        let private: PrivateAllocations = read_typed(&self.private)?;
        let artifact = CombinedArtifact::new(discovered, shared, private);

        ctx.emit(&artifact, || {
            print_success("Allocation artifact assembled");
        })
    }
}
