//! Pool allocation primitives.
//!
//! This library turns a [`CapacityDescriptor`] into allocation ledgers.
//! Key concepts:
//!
//! - **Pool**: the shared pool, or one customer's private pool. Both are
//!   allocated by the same [`PoolAllocator`]; the only pool-specific input
//!   is the starting capacity per datacenter.
//! - **Ledger**: remaining capacity plus the records granted so far.
//! - **Extraction**: a read-only projection of finished ledgers down to
//!   one domain.
//!
//! # Invariants
//!
//! - Records never exceed the pool total in any datacenter or component
//! - A failed consume aborts the run; no partial ledger escapes
//! - Output is identical across runs for the same descriptor
//!
//! [`CapacityDescriptor`]: capalloc_capacity::CapacityDescriptor

mod allocator;
mod error;
mod extract;
mod ledger;
mod output;

pub use allocator::PoolAllocator;
pub use error::AllocationError;
pub use extract::{DomainExtraction, DomainExtractor, DomainSelector, EntryMap};
pub use ledger::{AllocationLedger, PoolScope, Records};
pub use output::{PrivateAllocations, SharedAllocations};
