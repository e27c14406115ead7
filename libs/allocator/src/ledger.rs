//! Allocation ledgers.

use std::collections::BTreeMap;

use capalloc_capacity::{PoolCapacity, ResourceQuantity};
use capalloc_id::{CustomerId, DatacenterId, EntryName};
use serde::{Deserialize, Serialize};

use crate::error::AllocationError;

/// Granted quantities per datacenter per entry.
pub type Records = BTreeMap<DatacenterId, BTreeMap<EntryName, ResourceQuantity>>;

/// Which pool a ledger draws from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolScope {
    Shared,
    Private(CustomerId),
}

impl PoolScope {
    /// The customer for a private scope.
    pub fn customer(&self) -> Option<&CustomerId> {
        match self {
            PoolScope::Shared => None,
            PoolScope::Private(customer) => Some(customer),
        }
    }
}

impl std::fmt::Display for PoolScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolScope::Shared => f.write_str("shared"),
            PoolScope::Private(customer) => write!(f, "private:{customer}"),
        }
    }
}

/// Remaining capacity and granted records for one pool during one run.
///
/// Only the allocator mutates a ledger. Once a run completes the ledger
/// is handed off by value and read, never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationLedger {
    scope: PoolScope,
    total: PoolCapacity,
    remaining: PoolCapacity,
    records: Records,
}

impl AllocationLedger {
    /// Create a ledger whose remaining capacity equals the pool total.
    pub(crate) fn new(scope: PoolScope, capacity: &PoolCapacity) -> Self {
        let records = capacity
            .keys()
            .map(|dc| (dc.clone(), BTreeMap::new()))
            .collect();
        Self {
            scope,
            total: capacity.clone(),
            remaining: capacity.clone(),
            records,
        }
    }

    /// Take `amount` out of a datacenter's remaining capacity.
    ///
    /// Fails without changing the ledger if any component would go
    /// negative.
    pub(crate) fn consume(
        &mut self,
        dc: &DatacenterId,
        amount: &ResourceQuantity,
    ) -> Result<(), AllocationError> {
        let remaining = self
            .remaining
            .get_mut(dc)
            .ok_or_else(|| AllocationError::UnknownDatacenter {
                scope: self.scope.clone(),
                datacenter: dc.clone(),
            })?;

        match remaining.checked_sub(amount) {
            Ok(left) => {
                *remaining = left;
                Ok(())
            }
            Err(resource) => Err(AllocationError::CapacityExhausted {
                scope: self.scope.clone(),
                datacenter: dc.clone(),
                resource,
                requested: amount.get(resource),
                remaining: remaining.get(resource),
            }),
        }
    }

    /// Set the record for an entry, replacing any previous grant.
    pub(crate) fn record(&mut self, dc: &DatacenterId, entry: EntryName, amount: ResourceQuantity) {
        self.records.entry(dc.clone()).or_default().insert(entry, amount);
    }

    /// Add to an existing record (or start one at `amount`).
    pub(crate) fn increment(&mut self, dc: &DatacenterId, entry: &EntryName, amount: &ResourceQuantity) {
        let slot = self
            .records
            .entry(dc.clone())
            .or_default()
            .entry(entry.clone())
            .or_default();
        *slot = slot.saturating_add(amount);
    }

    /// The pool this ledger draws from.
    pub fn scope(&self) -> &PoolScope {
        &self.scope
    }

    /// Pool total per datacenter.
    pub fn total(&self) -> &PoolCapacity {
        &self.total
    }

    /// Remaining capacity in one datacenter.
    pub fn remaining(&self, dc: &str) -> ResourceQuantity {
        self.remaining.get(dc).copied().unwrap_or_default()
    }

    /// Remaining capacity per datacenter.
    pub fn remaining_all(&self) -> &PoolCapacity {
        &self.remaining
    }

    /// Granted records.
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// One entry's grant in one datacenter.
    pub fn granted(&self, dc: &str, entry: &str) -> Option<ResourceQuantity> {
        self.records.get(dc).and_then(|entries| entries.get(entry)).copied()
    }

    /// Sum of all grants in one datacenter.
    pub fn granted_total(&self, dc: &str) -> ResourceQuantity {
        self.records
            .get(dc)
            .map(|entries| entries.values().sum())
            .unwrap_or_default()
    }

    /// Consume the ledger, keeping only its records.
    pub fn into_records(self) -> Records {
        self.records
    }
}
