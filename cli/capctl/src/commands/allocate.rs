//! Allocate commands.

use std::path::PathBuf;

use anyhow::Result;
use capalloc_allocator::{PoolAllocator, PrivateAllocations};
use capalloc_capacity::CapacityDescriptor;
use clap::{Args, Subcommand};

use crate::io::read_typed;
use crate::output::{allocation_rows, print_table};

use super::CommandContext;

/// Allocate commands.
#[derive(Debug, Args)]
pub struct AllocateCommand {
    #[command(subcommand)]
    command: AllocateSubcommand,
}

#[derive(Debug, Subcommand)]
enum AllocateSubcommand {
    /// Allocate the shared pool.
    Shared(DiscoveredArgs),

    /// Allocate every customer's private pool.
    Private(PrivateArgs),
}

#[derive(Debug, Args)]
struct DiscoveredArgs {
    /// Normalized capacity descriptor.
    #[arg(long, env = "DISCOVERED_CAPACITY", value_name = "PATH")]
    discovered: PathBuf,
}

#[derive(Debug, Args)]
struct PrivateArgs {
    #[command(flatten)]
    discovered: DiscoveredArgs,

    /// Allocate only this customer.
    #[arg(long)]
    customer: Option<String>,
}

impl AllocateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            AllocateSubcommand::Shared(args) => allocate_shared(ctx, args),
            AllocateSubcommand::Private(args) => allocate_private(ctx, args),
        }
    }
}

fn allocate_shared(ctx: CommandContext, args: DiscoveredArgs) -> Result<()> {
    let descriptor: CapacityDescriptor = read_typed(&args.discovered)?;
    let shared = PoolAllocator::new(&descriptor).allocate_shared()?;

    ctx.emit(&shared, || {
        print_table(&allocation_rows("shared", &shared.shared_allocations));
    })
}

fn allocate_private(ctx: CommandContext, args: PrivateArgs) -> Result<()> {
    let descriptor: CapacityDescriptor = read_typed(&args.discovered.discovered)?;
    let allocator = PoolAllocator::new(&descriptor);

    let private = match args.customer.as_deref() {
        Some(customer) => PrivateAllocations::from_ledgers([allocator.allocate_customer(customer)?]),
        None => allocator.allocate_private()?,
    };

    ctx.emit(&private, || {
        let rows: Vec<_> = private
            .private_allocations
            .iter()
            .flat_map(|(customer, records)| {
                allocation_rows(&format!("private:{customer}"), records)
            })
            .collect();
        print_table(&rows);
    })
}
