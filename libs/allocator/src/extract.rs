//! Per-domain projections of finished allocations.
//!
//! Extraction never fails: a domain with no records yields an empty
//! projection. Every customer in the private output appears in the
//! projection, with an empty map when nothing matched.

use std::collections::{BTreeMap, BTreeSet};

use capalloc_capacity::{CapacityDescriptor, ResourceQuantity};
use capalloc_id::{
    CustomerId, DatacenterId, DomainName, EntryName, NameError, PAIRPOD_DOMAIN, PAIR_SUFFIX,
    POD_DOMAIN,
};
use serde_json::{json, Value};

use crate::ledger::Records;
use crate::output::{PrivateAllocations, SharedAllocations};

/// Matched entries in one datacenter.
pub type EntryMap = BTreeMap<EntryName, ResourceQuantity>;

/// Which entries an extraction selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSelector {
    /// Entries named exactly after a flat domain.
    Flat(DomainName),
    /// Paired-unit primaries.
    Pod,
    /// Paired-unit pairs.
    PairPod,
}

impl DomainSelector {
    /// Parse a domain name; `pod` and `pairpod` select paired-unit roles.
    pub fn parse(name: &str) -> Result<Self, NameError> {
        match name {
            POD_DOMAIN => Ok(Self::Pod),
            PAIRPOD_DOMAIN => Ok(Self::PairPod),
            other => Ok(Self::Flat(other.parse()?)),
        }
    }

    /// The domain name this selector extracts.
    pub fn label(&self) -> &str {
        match self {
            Self::Flat(domain) => domain.as_str(),
            Self::Pod => POD_DOMAIN,
            Self::PairPod => PAIRPOD_DOMAIN,
        }
    }
}

/// One domain's slice of the shared and private allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainExtraction {
    pub domain: String,

    pub shared: BTreeMap<DatacenterId, EntryMap>,

    pub private: BTreeMap<CustomerId, BTreeMap<DatacenterId, EntryMap>>,
}

impl DomainExtraction {
    /// Wrap as `{"<domain>_allocations": {"shared": .., "private": ..}}`.
    ///
    /// Flat domains place the quantity directly under each DC. Paired-unit
    /// domains key the quantities by entry name.
    pub fn to_document(&self) -> Value {
        let private: BTreeMap<&CustomerId, Value> = self
            .private
            .iter()
            .map(|(customer, dcs)| (customer, self.pool_value(dcs)))
            .collect();
        let mut doc = serde_json::Map::new();
        doc.insert(
            format!("{}_allocations", self.domain),
            json!({ "shared": self.pool_value(&self.shared), "private": private }),
        );
        Value::Object(doc)
    }

    /// Returns true if this is a flat domain's projection.
    pub fn is_flat(&self) -> bool {
        self.domain != POD_DOMAIN && self.domain != PAIRPOD_DOMAIN
    }

    fn pool_value(&self, dcs: &BTreeMap<DatacenterId, EntryMap>) -> Value {
        if self.is_flat() {
            // A flat selector matches at most one entry per DC.
            let quantities: BTreeMap<&DatacenterId, &ResourceQuantity> = dcs
                .iter()
                .filter_map(|(dc, entries)| entries.values().next().map(|q| (dc, q)))
                .collect();
            json!(quantities)
        } else {
            json!(dcs)
        }
    }

    /// Number of matched entries across every pool and datacenter.
    pub fn entry_count(&self) -> usize {
        let shared: usize = self.shared.values().map(BTreeMap::len).sum();
        let private: usize = self
            .private
            .values()
            .flat_map(|dcs| dcs.values())
            .map(BTreeMap::len)
            .sum();
        shared + private
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

/// Projects allocations down to one domain.
///
/// Paired-unit roles are decided by the unit list when one is known,
/// otherwise by naming convention: a pair entry ends in `-pair`, and a
/// primary is an entry whose name begins with `pod` (case-insensitive)
/// and nowhere contains `-pair`.
#[derive(Debug, Clone, Default)]
pub struct DomainExtractor {
    units: Option<BTreeSet<String>>,
}

impl DomainExtractor {
    /// Extractor relying on entry naming conventions only.
    pub fn by_convention() -> Self {
        Self { units: None }
    }

    /// Extractor that recognizes exactly the descriptor's paired units.
    pub fn for_descriptor(descriptor: &CapacityDescriptor) -> Self {
        let units = descriptor
            .paired_units()
            .keys()
            .map(|u| u.as_str().to_string())
            .collect();
        Self { units: Some(units) }
    }

    /// Project the shared and private outputs onto `selector`.
    pub fn extract(
        &self,
        selector: &DomainSelector,
        shared: &SharedAllocations,
        private: &PrivateAllocations,
    ) -> DomainExtraction {
        let private = private
            .private_allocations
            .iter()
            .map(|(customer, records)| (customer.clone(), self.project(selector, records)))
            .collect();

        DomainExtraction {
            domain: selector.label().to_string(),
            shared: self.project(selector, &shared.shared_allocations),
            private,
        }
    }

    fn project(
        &self,
        selector: &DomainSelector,
        records: &Records,
    ) -> BTreeMap<DatacenterId, EntryMap> {
        let mut out = BTreeMap::new();
        for (dc, entries) in records {
            let matched: EntryMap = entries
                .iter()
                .filter(|(name, _)| self.matches(selector, name))
                .map(|(name, quantity)| (name.clone(), *quantity))
                .collect();
            if !matched.is_empty() {
                out.insert(dc.clone(), matched);
            }
        }
        out
    }

    fn matches(&self, selector: &DomainSelector, entry: &EntryName) -> bool {
        match selector {
            DomainSelector::Flat(domain) => entry.as_str() == domain.as_str(),
            DomainSelector::Pod => match &self.units {
                Some(units) => units.contains(entry.as_str()),
                None => {
                    !entry.as_str().contains(PAIR_SUFFIX)
                        && entry.as_str().to_lowercase().starts_with(POD_DOMAIN)
                }
            },
            DomainSelector::PairPod => match &self.units {
                Some(units) => entry
                    .as_str()
                    .strip_suffix(PAIR_SUFFIX)
                    .is_some_and(|unit| units.contains(unit)),
                None => entry.is_pair(),
            },
        }
    }
}
