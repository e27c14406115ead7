//! Error types for pool allocation.

use capalloc_capacity::Resource;
use capalloc_id::DatacenterId;
use thiserror::Error;

use crate::ledger::PoolScope;

/// Errors that abort an allocator run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// A consume would drive a component of a datacenter's remaining
    /// capacity below zero.
    #[error(
        "insufficient {resource} in {datacenter} for {scope} pool: \
         requested {requested}, remaining {remaining}"
    )]
    CapacityExhausted {
        scope: PoolScope,
        datacenter: DatacenterId,
        resource: Resource,
        requested: u64,
        remaining: u64,
    },

    /// A consume targeted a datacenter the pool does not define.
    #[error("{scope} pool has no capacity defined for DC: {datacenter}")]
    UnknownDatacenter {
        scope: PoolScope,
        datacenter: DatacenterId,
    },

    /// Paired units exist but a reserved template domain is not defined.
    #[error("paired units require the '{0}' domain template")]
    MissingTemplate(&'static str),

    /// A customer named for private allocation has no private pool.
    #[error("no private pool defined for customer: {0}")]
    UnknownCustomer(String),
}

impl AllocationError {
    /// Returns true if the run failed for lack of capacity.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, AllocationError::CapacityExhausted { .. })
    }
}
