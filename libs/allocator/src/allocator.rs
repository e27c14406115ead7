//! The pool allocator.
//!
//! Allocation runs in two phases, always in this order:
//!
//! - **Phase A**: every flat domain's minimums are split evenly (floor
//!   division) across all datacenters and granted under the domain name.
//!   The division remainder is dropped.
//! - **Phase B**: every paired unit receives the `pod` template at its
//!   primary DC and the `pairpod` template at its pair DC, then both are
//!   topped up by half of the smaller remaining capacity of the two DCs.
//!
//! Domains and units are visited in lexicographic order; datacenters in
//! declared order.

use std::collections::BTreeMap;

use capalloc_capacity::{CapacityDescriptor, DomainSpec, PoolCapacity};
use capalloc_id::{EntryName, PAIRPOD_DOMAIN, POD_DOMAIN};
use tracing::{debug, info, instrument};

use crate::error::AllocationError;
use crate::ledger::{AllocationLedger, PoolScope};
use crate::output::{PrivateAllocations, SharedAllocations};

/// Allocates pools for one capacity descriptor.
#[derive(Debug, Clone, Copy)]
pub struct PoolAllocator<'a> {
    descriptor: &'a CapacityDescriptor,
}

impl<'a> PoolAllocator<'a> {
    /// Create an allocator over a normalized descriptor.
    pub fn new(descriptor: &'a CapacityDescriptor) -> Self {
        Self { descriptor }
    }

    /// Allocate one pool from its starting capacity.
    ///
    /// Returns the finished ledger, or the first consume that failed.
    #[instrument(skip_all, fields(scope = %scope))]
    pub fn allocate(
        &self,
        scope: PoolScope,
        capacity: &PoolCapacity,
    ) -> Result<AllocationLedger, AllocationError> {
        let mut ledger = AllocationLedger::new(scope, capacity);

        self.allocate_flat_domains(&mut ledger)?;
        self.allocate_paired_units(&mut ledger)?;

        info!(
            entries = ledger.records().values().map(BTreeMap::len).sum::<usize>(),
            "Pool allocated"
        );
        Ok(ledger)
    }

    /// Allocate the shared pool.
    pub fn allocate_shared(&self) -> Result<SharedAllocations, AllocationError> {
        let ledger = self.allocate(PoolScope::Shared, self.descriptor.shared_pool())?;
        Ok(SharedAllocations::from_ledger(ledger))
    }

    /// Allocate one customer's private pool.
    pub fn allocate_customer(&self, customer: &str) -> Result<AllocationLedger, AllocationError> {
        let (customer, capacity) = self
            .descriptor
            .private_pools()
            .get_key_value(customer)
            .ok_or_else(|| AllocationError::UnknownCustomer(customer.to_string()))?;
        self.allocate(PoolScope::Private(customer.clone()), capacity)
    }

    /// Allocate every private pool, each customer on its own ledger.
    ///
    /// Customers are processed and merged in sorted order. The first
    /// failing customer aborts the whole run.
    pub fn allocate_private(&self) -> Result<PrivateAllocations, AllocationError> {
        let mut ledgers = Vec::new();
        for customer in self.descriptor.customers() {
            ledgers.push(self.allocate_customer(customer.as_str())?);
        }
        Ok(PrivateAllocations::from_ledgers(ledgers))
    }

    fn allocate_flat_domains(&self, ledger: &mut AllocationLedger) -> Result<(), AllocationError> {
        let datacenters = self.descriptor.datacenters();
        let parts = datacenters.len() as u64;

        for (domain, spec) in self.descriptor.flat_domains() {
            let per_dc = spec.minimum().split(parts);
            debug!(domain = %domain, ?per_dc, "Allocating domain minimum");

            for dc in datacenters {
                ledger.consume(dc, &per_dc)?;
                ledger.record(dc, EntryName::from(domain), per_dc);
            }
        }

        Ok(())
    }

    fn allocate_paired_units(&self, ledger: &mut AllocationLedger) -> Result<(), AllocationError> {
        let units = self.descriptor.paired_units();
        if units.is_empty() {
            return Ok(());
        }

        let pod_min = template(self.descriptor.pod_template(), POD_DOMAIN)?.minimum();
        let pair_min = template(self.descriptor.pairpod_template(), PAIRPOD_DOMAIN)?.minimum();

        for (unit, placement) in units {
            let (primary, pair) = (&placement.primary_dc, &placement.pair_dc);
            let (primary_entry, pair_entry) = (unit.primary_entry(), unit.pair_entry());

            ledger.consume(primary, &pod_min)?;
            ledger.consume(pair, &pair_min)?;
            ledger.record(primary, primary_entry.clone(), pod_min);
            ledger.record(pair, pair_entry.clone(), pair_min);

            // Best-effort balancing: both sides grow by the same amount.
            let extra = ledger.remaining(primary.as_str()).min(&ledger.remaining(pair.as_str()));
            let half = extra.half();

            ledger.consume(primary, &half)?;
            ledger.consume(pair, &half)?;
            ledger.increment(primary, &primary_entry, &half);
            ledger.increment(pair, &pair_entry, &half);

            debug!(unit = %unit, primary = %primary, pair = %pair, ?half, "Paired unit balanced");
        }

        Ok(())
    }
}

fn template<'d>(
    spec: Option<&'d DomainSpec>,
    name: &'static str,
) -> Result<&'d DomainSpec, AllocationError> {
    spec.ok_or(AllocationError::MissingTemplate(name))
}
