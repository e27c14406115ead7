//! The allocation validator.

use capalloc_allocator::Records;
use capalloc_capacity::{CapacityDescriptor, PoolCapacity, Resource, ResourceQuantity};
use capalloc_id::{EntryName, UnitName};
use tracing::{debug, info, instrument, warn};

use crate::artifact::CombinedArtifact;
use crate::policy::{exceeds, percent, ValidatorConfig};
use crate::report::ValidationReport;

/// Pool label used in notes.
const SHARED: &str = "shared";

/// Checks a combined artifact against capacity bounds and policy.
///
/// Validation never mutates its input and running it twice yields the
/// same report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every check and collect the results in a fixed order.
    #[instrument(skip_all)]
    pub fn validate(&self, artifact: &CombinedArtifact) -> ValidationReport {
        let mut report = ValidationReport::default();
        let descriptor = &artifact.discovered;
        let shared = &artifact.shared.shared_allocations;
        let private = &artifact.private.private_allocations;

        check_unknown_datacenters(descriptor, shared, &mut report, |dc| {
            format!("Shared allocations reference unknown DC: {dc}")
        });
        check_capacity(descriptor, descriptor.shared_pool(), shared, &mut report, |dc, r| {
            format!("Shared pool exceeded in {dc}: {}", r.as_str())
        });

        for (customer, records) in private {
            let Some(pool) = descriptor.private_pool(customer.as_str()) else {
                report.violation(format!(
                    "Private allocations reference unknown customer: {customer}"
                ));
                continue;
            };
            check_unknown_datacenters(descriptor, records, &mut report, |dc| {
                format!("Private allocations for {customer} reference unknown DC: {dc}")
            });
            check_capacity(descriptor, pool, records, &mut report, |dc, r| {
                format!("Private pool exceeded for {customer} in {dc}: {}", r.as_str())
            });
        }

        check_domain_minimums(descriptor, shared, &mut report);

        check_separation(descriptor, shared, &mut report);
        for records in private.values() {
            check_separation(descriptor, records, &mut report);
        }

        if let Some(ceiling) = self.config.domain_share_ceiling {
            self.check_domain_share(descriptor, shared, ceiling, &mut report);
        }
        self.check_isolation(artifact, &mut report);

        note_imbalance(descriptor, SHARED, shared, &mut report);
        for (customer, records) in private {
            note_imbalance(descriptor, customer.as_str(), records, &mut report);
        }

        if report.is_ok() {
            info!(notes = report.notes().len(), "Allocation valid");
        } else {
            for violation in report.violations() {
                warn!(%violation, "Validation violation");
            }
            info!(violations = report.violations().len(), "Allocation invalid");
        }
        report
    }

    fn check_domain_share(
        &self,
        descriptor: &CapacityDescriptor,
        shared: &Records,
        ceiling: f64,
        report: &mut ValidationReport,
    ) {
        let pct = percent(ceiling);
        for dc in descriptor.datacenters() {
            let capacity = descriptor.shared_pool().get(dc).copied().unwrap_or_default();
            let Some(entries) = shared.get(dc) else {
                continue;
            };
            for (entry, granted) in entries {
                if exceeds(u128::from(granted.cpu), capacity.cpu, ceiling) {
                    report.violation(format!("{entry} exceeds {pct}% CPU policy in {dc}."));
                }
            }
        }
    }

    fn check_isolation(&self, artifact: &CombinedArtifact, report: &mut ValidationReport) {
        let descriptor = &artifact.discovered;
        let ceiling = self.config.isolation_ceiling;
        let pct = percent(ceiling);

        for (customer, records) in &artifact.private.private_allocations {
            let Some(pool) = descriptor.private_pool(customer.as_str()) else {
                continue;
            };
            for dc in descriptor.datacenters() {
                let capacity = pool.get(dc).copied().unwrap_or_default();
                let used = granted_total(records, dc.as_str(), Resource::Cpu);
                if exceeds(used, capacity.cpu, ceiling) {
                    report.violation(format!(
                        "{customer} exceeds {pct}% private CPU policy in {dc}."
                    ));
                }
            }
        }
    }
}

/// Sum of one resource over a DC's entries, widened so it cannot clamp.
fn granted_total(records: &Records, dc: &str, resource: Resource) -> u128 {
    records
        .get(dc)
        .map(|entries| entries.values().map(|q| u128::from(q.get(resource))).sum())
        .unwrap_or_default()
}

fn check_unknown_datacenters<F>(
    descriptor: &CapacityDescriptor,
    records: &Records,
    report: &mut ValidationReport,
    message: F,
) where
    F: Fn(&str) -> String,
{
    for dc in records.keys() {
        if !descriptor.has_datacenter(dc.as_str()) {
            report.violation(message(dc.as_str()));
        }
    }
}

/// Capacity bound per declared DC and resource.
fn check_capacity<F>(
    descriptor: &CapacityDescriptor,
    pool: &PoolCapacity,
    records: &Records,
    report: &mut ValidationReport,
    message: F,
) where
    F: Fn(&str, Resource) -> String,
{
    for dc in descriptor.datacenters() {
        let capacity = pool.get(dc).copied().unwrap_or_default();
        debug!(dc = %dc, ?capacity, "Checking capacity bound");
        for resource in Resource::ALL {
            let used = granted_total(records, dc.as_str(), resource);
            if used > u128::from(capacity.get(resource)) {
                report.violation(message(dc.as_str(), resource));
            }
        }
    }
}

/// Shared-pool grants per flat domain, summed across declared DCs.
fn check_domain_minimums(
    descriptor: &CapacityDescriptor,
    shared: &Records,
    report: &mut ValidationReport,
) {
    for (domain, spec) in descriptor.flat_domains() {
        let entry = EntryName::from(domain);
        let total: ResourceQuantity = descriptor
            .datacenters()
            .iter()
            .filter_map(|dc| shared.get(dc).and_then(|entries| entries.get(&entry)))
            .sum();
        let minimum = spec.minimum();
        for resource in Resource::ALL {
            if total.get(resource) < minimum.get(resource) {
                report.violation(format!(
                    "Domain {domain} {} below minimum.",
                    resource.label()
                ));
            }
        }
    }
}

/// A unit violates separation when one DC holds both its primary and
/// its pair entry.
fn check_separation(descriptor: &CapacityDescriptor, records: &Records, report: &mut ValidationReport) {
    for unit in descriptor.paired_units().keys() {
        let (primary, pair) = (unit.primary_entry(), unit.pair_entry());
        let colocated = records
            .values()
            .any(|entries| entries.contains_key(&primary) && entries.contains_key(&pair));
        if colocated {
            report.violation(format!("POD {unit} violates DC separation policy."));
        }
    }
}

fn note_imbalance(
    descriptor: &CapacityDescriptor,
    pool: &str,
    records: &Records,
    report: &mut ValidationReport,
) {
    for (unit, placement) in descriptor.paired_units() {
        let Some((primary, pair)) = unit_grants(
            records,
            unit,
            placement.primary_dc.as_str(),
            placement.pair_dc.as_str(),
        ) else {
            continue;
        };
        let gap = primary.cpu.abs_diff(pair.cpu);
        if gap > 0 {
            report.note(format!(
                "POD {unit} CPU differs from its pair by {gap} in {pool} pool."
            ));
        }
    }
}

fn unit_grants(
    records: &Records,
    unit: &UnitName,
    primary_dc: &str,
    pair_dc: &str,
) -> Option<(ResourceQuantity, ResourceQuantity)> {
    let lookup = |dc: &str, entry: &EntryName| records.get(dc)?.get(entry).copied();
    Some((
        lookup(primary_dc, &unit.primary_entry())?,
        lookup(pair_dc, &unit.pair_entry())?,
    ))
}
