//! The normalized capacity descriptor.

use std::collections::BTreeMap;

use capalloc_id::{CustomerId, DatacenterId, DomainName, UnitName, PAIRPOD_DOMAIN, POD_DOMAIN};
use serde::{Deserialize, Deserializer, Serialize};

use crate::quantity::ResourceQuantity;

/// Capacity of one pool, per datacenter.
pub type PoolCapacity = BTreeMap<DatacenterId, ResourceQuantity>;

/// Guaranteed minimums for a workload domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub min_cpu: u64,
    pub min_mem: u64,
    pub min_storage: u64,
}

impl DomainSpec {
    /// Create a domain spec from its minimums.
    pub const fn new(min_cpu: u64, min_mem: u64, min_storage: u64) -> Self {
        Self {
            min_cpu,
            min_mem,
            min_storage,
        }
    }

    /// The minimums as a quantity.
    pub fn minimum(&self) -> ResourceQuantity {
        ResourceQuantity::new(self.min_cpu, self.min_mem, self.min_storage)
    }
}

/// Placement of a paired unit: the primary DC and its DR pair DC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedUnit {
    /// Datacenter hosting the primary.
    #[serde(rename = "dc")]
    pub primary_dc: DatacenterId,

    /// Datacenter hosting the pair.
    pub pair_dc: DatacenterId,
}

/// Immutable, validated capacity model for one run.
///
/// Serializes to the same document shape it was normalized from, so a
/// descriptor can be written out as `discovered.json` and read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityDescriptor {
    #[serde(rename = "data_centers")]
    pub(crate) datacenters: Vec<DatacenterId>,

    pub(crate) shared_pool: PoolCapacity,

    pub(crate) private_pools: BTreeMap<CustomerId, PoolCapacity>,

    pub(crate) domains: BTreeMap<DomainName, DomainSpec>,

    #[serde(rename = "pods")]
    pub(crate) paired_units: BTreeMap<UnitName, PairedUnit>,
}

impl CapacityDescriptor {
    /// Datacenters in declared order.
    pub fn datacenters(&self) -> &[DatacenterId] {
        &self.datacenters
    }

    /// Returns true if the datacenter is part of this descriptor.
    pub fn has_datacenter(&self, dc: &str) -> bool {
        self.datacenters.iter().any(|d| d.as_str() == dc)
    }

    /// Shared pool capacity per datacenter.
    pub fn shared_pool(&self) -> &PoolCapacity {
        &self.shared_pool
    }

    /// All private pools, ordered by customer.
    pub fn private_pools(&self) -> &BTreeMap<CustomerId, PoolCapacity> {
        &self.private_pools
    }

    /// One customer's private pool.
    pub fn private_pool(&self, customer: &str) -> Option<&PoolCapacity> {
        self.private_pools.get(customer)
    }

    /// Customers in sorted order.
    pub fn customers(&self) -> impl Iterator<Item = &CustomerId> {
        self.private_pools.keys()
    }

    /// All domains, including the reserved templates.
    pub fn domains(&self) -> &BTreeMap<DomainName, DomainSpec> {
        &self.domains
    }

    /// Domains allocated as flat minimums (everything but `pod`/`pairpod`),
    /// in lexicographic order.
    pub fn flat_domains(&self) -> impl Iterator<Item = (&DomainName, &DomainSpec)> {
        self.domains.iter().filter(|(name, _)| !name.is_reserved())
    }

    /// The primary template applied to every paired unit.
    pub fn pod_template(&self) -> Option<&DomainSpec> {
        self.domains.get(POD_DOMAIN)
    }

    /// The pair template applied to every paired unit.
    pub fn pairpod_template(&self) -> Option<&DomainSpec> {
        self.domains.get(PAIRPOD_DOMAIN)
    }

    /// Paired units in lexicographic order.
    pub fn paired_units(&self) -> &BTreeMap<UnitName, PairedUnit> {
        &self.paired_units
    }
}

impl<'de> Deserialize<'de> for CapacityDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        crate::normalize(&raw).map_err(serde::de::Error::custom)
    }
}
