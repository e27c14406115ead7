//! Serialized allocator outputs.
//!
//! These are the documents written as `shared.json` and `private.json`
//! and read back by the validator, the extractor and the differ.

use std::collections::BTreeMap;

use capalloc_id::CustomerId;
use serde::{Deserialize, Serialize};

use crate::ledger::{AllocationLedger, PoolScope, Records};

/// Shared pool output: `{"shared_allocations": {dc: {entry: quantity}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedAllocations {
    pub shared_allocations: Records,
}

impl SharedAllocations {
    /// Freeze a finished shared ledger.
    pub fn from_ledger(ledger: AllocationLedger) -> Self {
        Self {
            shared_allocations: ledger.into_records(),
        }
    }
}

/// Private pool output: `{"private_allocations": {customer: {dc: {entry: quantity}}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateAllocations {
    pub private_allocations: BTreeMap<CustomerId, Records>,
}

impl PrivateAllocations {
    /// Merge finished private ledgers, keyed and ordered by customer.
    ///
    /// Ledgers with a shared scope are ignored.
    pub fn from_ledgers<I>(ledgers: I) -> Self
    where
        I: IntoIterator<Item = AllocationLedger>,
    {
        let mut private_allocations = BTreeMap::new();
        for ledger in ledgers {
            let PoolScope::Private(customer) = ledger.scope().clone() else {
                continue;
            };
            private_allocations.insert(customer, ledger.into_records());
        }
        Self {
            private_allocations,
        }
    }
}
