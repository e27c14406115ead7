//! Raw capacity document normalization.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. required top-level keys
//! 2. `data_centers` is a list of at least two unique names
//! 3. the shared pool defines every datacenter
//! 4. every private pool defines every datacenter
//! 5. every domain carries `min_cpu`, `min_mem` and `min_storage`
//! 6. every pod references two known, distinct datacenters
//! 7. pods have their `pod`/`pairpod` templates
//! 8. ledger entry names do not collide
//!
//! Quantity shape (`cpu`/`mem`/`storage` as non-negative integers) is
//! checked as each owning entry is visited.

use std::collections::{BTreeMap, BTreeSet};

use capalloc_id::{
    CustomerId, DatacenterId, DomainName, NameError, UnitName, PAIRPOD_DOMAIN, POD_DOMAIN,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::descriptor::{CapacityDescriptor, DomainSpec, PairedUnit, PoolCapacity};
use crate::error::NormalizeError;
use crate::quantity::{Resource, ResourceQuantity};

/// Top-level keys every capacity document must carry, in check order.
pub const REQUIRED_KEYS: [&str; 5] = [
    "data_centers",
    "shared_pool",
    "private_pools",
    "domains",
    "pods",
];

/// Domain minimum fields, in check order.
const DOMAIN_FIELDS: [&str; 3] = ["min_cpu", "min_mem", "min_storage"];

/// Parse and normalize a capacity document from JSON text.
pub fn normalize_str(input: &str) -> Result<CapacityDescriptor, NormalizeError> {
    let raw: Value = serde_json::from_str(input)?;
    normalize(&raw)
}

/// Normalize a parsed capacity document.
pub fn normalize(raw: &Value) -> Result<CapacityDescriptor, NormalizeError> {
    let root = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    for key in REQUIRED_KEYS {
        if !root.contains_key(key) {
            return Err(NormalizeError::MissingKey(key));
        }
    }

    let datacenters = parse_datacenters(&root["data_centers"])?;
    let shared_pool = parse_pool(&root["shared_pool"], "shared_pool", &datacenters, |dc| {
        NormalizeError::SharedPoolMissingDc(dc.to_string())
    })?;

    let private_obj = expect_object(&root["private_pools"], "private_pools")?;
    let mut private_pools = BTreeMap::new();
    for (customer_raw, pools) in private_obj {
        let customer: CustomerId = parse_name(customer_raw, "private_pools")?;
        let path = format!("private_pools.{customer}");
        let pool = parse_pool(pools, &path, &datacenters, |dc| {
            NormalizeError::PrivatePoolMissingDc {
                customer: customer.to_string(),
                dc: dc.to_string(),
            }
        })?;
        private_pools.insert(customer, pool);
    }

    let domains = parse_domains(&root["domains"])?;
    let paired_units = parse_units(&root["pods"], &datacenters)?;

    if !paired_units.is_empty() {
        for template in [POD_DOMAIN, PAIRPOD_DOMAIN] {
            if !domains.contains_key(template) {
                return Err(NormalizeError::MissingTemplate(template));
            }
        }
    }

    check_entry_collisions(&domains, &paired_units)?;

    debug!(
        datacenters = datacenters.len(),
        customers = private_pools.len(),
        domains = domains.len(),
        paired_units = paired_units.len(),
        "Capacity document normalized"
    );

    Ok(CapacityDescriptor {
        datacenters,
        shared_pool,
        private_pools,
        domains,
        paired_units,
    })
}

fn parse_datacenters(value: &Value) -> Result<Vec<DatacenterId>, NormalizeError> {
    let list = value.as_array().ok_or(NormalizeError::DatacentersNotList)?;

    let mut seen = BTreeSet::new();
    let mut datacenters = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        let path = format!("data_centers[{index}]");
        let raw = item
            .as_str()
            .ok_or_else(|| NormalizeError::ExpectedString { path: path.clone() })?;
        let dc: DatacenterId = parse_name(raw, &path)?;
        if !seen.insert(dc.clone()) {
            return Err(NormalizeError::DuplicateDatacenter(dc.into_inner()));
        }
        datacenters.push(dc);
    }

    if datacenters.len() < 2 {
        return Err(NormalizeError::TooFewDatacenters {
            count: datacenters.len(),
        });
    }

    Ok(datacenters)
}

/// Parse one pool, requiring an entry for every declared datacenter.
///
/// Keys for undeclared datacenters are dropped.
fn parse_pool<F>(
    value: &Value,
    path: &str,
    datacenters: &[DatacenterId],
    missing: F,
) -> Result<PoolCapacity, NormalizeError>
where
    F: Fn(&DatacenterId) -> NormalizeError,
{
    let obj = expect_object(value, path)?;

    let mut pool = PoolCapacity::new();
    for dc in datacenters {
        let Some(entry) = obj.get(dc.as_str()) else {
            return Err(missing(dc));
        };
        let quantity = parse_quantity(entry, &format!("{path}.{dc}"))?;
        pool.insert(dc.clone(), quantity);
    }

    for key in obj.keys() {
        if !datacenters.iter().any(|dc| dc.as_str() == key) {
            warn!(pool = %path, dc = %key, "Dropping capacity for undeclared datacenter");
        }
    }

    Ok(pool)
}

fn parse_quantity(value: &Value, path: &str) -> Result<ResourceQuantity, NormalizeError> {
    let obj = expect_object(value, path)?;

    let mut components = [0u64; 3];
    for (slot, resource) in components.iter_mut().zip(Resource::ALL) {
        let field = resource.as_str();
        let Some(raw) = obj.get(field) else {
            return Err(NormalizeError::InvalidQuantity {
                path: path.to_string(),
                reason: format!("missing field {field}"),
            });
        };
        *slot = parse_amount(raw, path, field)?;
    }

    Ok(ResourceQuantity::new(
        components[0],
        components[1],
        components[2],
    ))
}

fn parse_amount(value: &Value, path: &str, field: &str) -> Result<u64, NormalizeError> {
    value
        .as_u64()
        .ok_or_else(|| NormalizeError::InvalidQuantity {
            path: path.to_string(),
            reason: format!("{field} must be a non-negative integer, got {value}"),
        })
}

fn parse_domains(value: &Value) -> Result<BTreeMap<DomainName, DomainSpec>, NormalizeError> {
    let obj = expect_object(value, "domains")?;

    let mut domains = BTreeMap::new();
    for (raw_name, cfg) in obj {
        let name: DomainName = parse_name(raw_name, "domains")?;
        let path = format!("domains.{name}");
        let cfg = expect_object(cfg, &path)?;

        for field in DOMAIN_FIELDS {
            if !cfg.contains_key(field) {
                return Err(NormalizeError::DomainMissingField {
                    domain: name.to_string(),
                    field,
                });
            }
        }

        let spec = DomainSpec::new(
            parse_amount(&cfg["min_cpu"], &path, "min_cpu")?,
            parse_amount(&cfg["min_mem"], &path, "min_mem")?,
            parse_amount(&cfg["min_storage"], &path, "min_storage")?,
        );
        domains.insert(name, spec);
    }

    Ok(domains)
}

fn parse_units(
    value: &Value,
    datacenters: &[DatacenterId],
) -> Result<BTreeMap<UnitName, PairedUnit>, NormalizeError> {
    let obj = expect_object(value, "pods")?;

    let mut units = BTreeMap::new();
    for (raw_name, cfg) in obj {
        let name: UnitName = parse_name(raw_name, "pods")?;
        let cfg = expect_object(cfg, &format!("pods.{name}"))?;

        let primary_dc = parse_unit_dc(&name, cfg, "dc", datacenters)?;
        let pair_dc = parse_unit_dc(&name, cfg, "pair_dc", datacenters)?;

        if primary_dc == pair_dc {
            return Err(NormalizeError::UnitSameDc {
                unit: name.to_string(),
                dc: primary_dc.into_inner(),
            });
        }

        units.insert(
            name,
            PairedUnit {
                primary_dc,
                pair_dc,
            },
        );
    }

    Ok(units)
}

fn parse_unit_dc(
    unit: &UnitName,
    cfg: &Map<String, Value>,
    field: &'static str,
    datacenters: &[DatacenterId],
) -> Result<DatacenterId, NormalizeError> {
    let Some(raw) = cfg.get(field) else {
        return Err(NormalizeError::UnitMissingField {
            unit: unit.to_string(),
            field,
        });
    };
    let path = format!("pods.{unit}.{field}");
    let raw = raw
        .as_str()
        .ok_or_else(|| NormalizeError::ExpectedString { path })?;

    datacenters
        .iter()
        .find(|dc| dc.as_str() == raw)
        .cloned()
        .ok_or_else(|| NormalizeError::UnitUnknownDc {
            unit: unit.to_string(),
            field,
            dc: raw.to_string(),
        })
}

/// Flat domains, unit primaries and unit pairs share one entry namespace
/// per datacenter.
fn check_entry_collisions(
    domains: &BTreeMap<DomainName, DomainSpec>,
    units: &BTreeMap<UnitName, PairedUnit>,
) -> Result<(), NormalizeError> {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for name in domains.keys().filter(|d| !d.is_reserved()) {
        owners.insert(name.to_string(), format!("domain {name}"));
    }

    for unit in units.keys() {
        for (entry, owner) in [
            (unit.primary_entry(), format!("POD {unit}")),
            (unit.pair_entry(), format!("Pair-POD of {unit}")),
        ] {
            if let Some(first) = owners.get(entry.as_str()) {
                return Err(NormalizeError::EntryCollision {
                    entry: entry.into_inner(),
                    first: first.clone(),
                    second: owner,
                });
            }
            owners.insert(entry.into_inner(), owner);
        }
    }

    Ok(())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, NormalizeError> {
    value.as_object().ok_or_else(|| NormalizeError::ExpectedObject {
        path: path.to_string(),
    })
}

fn parse_name<T>(raw: &str, path: &str) -> Result<T, NormalizeError>
where
    T: std::str::FromStr<Err = NameError>,
{
    raw.parse().map_err(|source| NormalizeError::InvalidName {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use capalloc_testing::fixtures;
    use capalloc_testing::CapacityDocBuilder;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn with(mut doc: Value, key: &str, value: Value) -> Value {
        doc[key] = value;
        doc
    }

    fn without(mut doc: Value, key: &str) -> Value {
        doc.as_object_mut().unwrap().remove(key);
        doc
    }

    #[test]
    fn test_scenario_normalizes() {
        let descriptor = normalize(&fixtures::scenario_document()).unwrap();
        let dcs: Vec<&str> = descriptor.datacenters().iter().map(|d| d.as_str()).collect();
        assert_eq!(dcs, vec!["dc1", "dc2"]);
        assert_eq!(
            descriptor.shared_pool()["dc1"],
            ResourceQuantity::new(100, 100, 100)
        );
        assert_eq!(descriptor.paired_units()["podA"].primary_dc.as_str(), "dc1");
        assert_eq!(descriptor.paired_units()["podA"].pair_dc.as_str(), "dc2");
    }

    #[test]
    fn test_datacenter_order_is_preserved() {
        let doc = CapacityDocBuilder::new(&["west", "east", "central"])
            .shared_all(10, 10, 10)
            .build();
        let descriptor = normalize(&doc).unwrap();
        let dcs: Vec<&str> = descriptor.datacenters().iter().map(|d| d.as_str()).collect();
        assert_eq!(dcs, vec!["west", "east", "central"]);
    }

    #[rstest]
    #[case::not_object(json!([1, 2]), "capacity document must be a JSON object")]
    #[case::missing_dcs(
        without(fixtures::scenario_document(), "data_centers"),
        "missing required key: data_centers"
    )]
    #[case::missing_pods(
        without(fixtures::scenario_document(), "pods"),
        "missing required key: pods"
    )]
    #[case::dcs_not_list(
        with(fixtures::scenario_document(), "data_centers", json!("dc1")),
        "data_centers must be a list"
    )]
    #[case::one_dc(
        with(fixtures::scenario_document(), "data_centers", json!(["dc1"])),
        "data_centers must contain at least two DCs (got 1)"
    )]
    #[case::duplicate_dc(
        with(fixtures::scenario_document(), "data_centers", json!(["dc1", "dc1"])),
        "duplicate datacenter: dc1"
    )]
    #[case::shared_missing_dc(
        with(
            fixtures::scenario_document(),
            "shared_pool",
            json!({"dc1": {"cpu": 1, "mem": 1, "storage": 1}})
        ),
        "shared pool missing DC: dc2"
    )]
    #[case::private_missing_dc(
        with(
            fixtures::scenario_document(),
            "private_pools",
            json!({"acme": {"dc2": {"cpu": 1, "mem": 1, "storage": 1}}})
        ),
        "private pool for acme missing DC: dc1"
    )]
    #[case::domain_missing_field(
        with(
            fixtures::scenario_document(),
            "domains",
            json!({"db": {"min_cpu": 1, "min_storage": 1}})
        ),
        "domain db missing field: min_mem"
    )]
    #[case::unit_missing_dc(
        with(fixtures::scenario_document(), "pods", json!({"podA": {"pair_dc": "dc2"}})),
        "POD podA missing dc field"
    )]
    #[case::unit_unknown_dc(
        with(
            fixtures::scenario_document(),
            "pods",
            json!({"podA": {"dc": "dc1", "pair_dc": "dc9"}})
        ),
        "POD podA pair_dc references unknown DC: dc9"
    )]
    #[case::unit_same_dc(
        with(
            fixtures::scenario_document(),
            "pods",
            json!({"podA": {"dc": "dc2", "pair_dc": "dc2"}})
        ),
        "POD podA places primary and pair in the same DC: dc2"
    )]
    fn test_normalize_failures(#[case] doc: Value, #[case] expected: &str) {
        let err = normalize(&doc).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_checks_run_in_listed_order() {
        // Both the DC list and the pods are invalid; the DC list is reported.
        let doc = json!({
            "data_centers": ["dc1"],
            "shared_pool": {},
            "private_pools": {},
            "domains": {},
            "pods": {"podA": {"dc": "dc1", "pair_dc": "dc1"}}
        });
        assert_eq!(
            normalize(&doc).unwrap_err(),
            NormalizeError::TooFewDatacenters { count: 1 }
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
            .shared_all(10, 10, 10)
            .build();
        let doc = with(
            doc,
            "shared_pool",
            json!({
                "dc1": {"cpu": -1, "mem": 1, "storage": 1},
                "dc2": {"cpu": 1, "mem": 1, "storage": 1}
            }),
        );
        let err = normalize(&doc).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidQuantity { ref path, .. } if path == "shared_pool.dc1"));
    }

    #[test]
    fn test_quantity_missing_component() {
        let doc = with(
            fixtures::scenario_document(),
            "shared_pool",
            json!({
                "dc1": {"cpu": 1, "mem": 1},
                "dc2": {"cpu": 1, "mem": 1, "storage": 1}
            }),
        );
        assert_eq!(
            normalize(&doc).unwrap_err().to_string(),
            "invalid quantity at shared_pool.dc1: missing field storage"
        );
    }

    #[test]
    fn test_undeclared_dc_dropped() {
        let doc = with(
            fixtures::scenario_document(),
            "shared_pool",
            json!({
                "dc1": {"cpu": 1, "mem": 1, "storage": 1},
                "dc2": {"cpu": 1, "mem": 1, "storage": 1},
                "dc3": {"cpu": 1, "mem": 1, "storage": 1}
            }),
        );
        let descriptor = normalize(&doc).unwrap();
        assert_eq!(descriptor.shared_pool().len(), 2);
        assert!(!descriptor.shared_pool().contains_key("dc3"));
    }

    #[test]
    fn test_pods_require_templates() {
        let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
            .shared_all(100, 100, 100)
            .domain("pod", 1, 1, 1)
            .unit("podA", "dc1", "dc2")
            .build();
        assert_eq!(
            normalize(&doc).unwrap_err(),
            NormalizeError::MissingTemplate("pairpod")
        );
    }

    #[test]
    fn test_templates_optional_without_pods() {
        let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
            .shared_all(100, 100, 100)
            .domain("db", 1, 1, 1)
            .build();
        assert!(normalize(&doc).is_ok());
    }

    #[test]
    fn test_entry_collision_between_unit_and_domain() {
        let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
            .shared_all(100, 100, 100)
            .domain("db", 1, 1, 1)
            .domain("pod", 1, 1, 1)
            .domain("pairpod", 1, 1, 1)
            .unit("db", "dc1", "dc2")
            .build();
        let err = normalize(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "entry name 'db' is claimed by both domain db and POD db"
        );
    }

    #[test]
    fn test_entry_collision_with_pair_suffix() {
        let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
            .shared_all(100, 100, 100)
            .domain("pod", 1, 1, 1)
            .domain("pairpod", 1, 1, 1)
            .unit("x", "dc1", "dc2")
            .unit("x-pair", "dc2", "dc1")
            .build();
        assert!(matches!(
            normalize(&doc).unwrap_err(),
            NormalizeError::EntryCollision { .. }
        ));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let doc = with(
            fixtures::scenario_document(),
            "data_centers",
            json!(["dc1", " dc2"]),
        );
        let err = normalize(&doc).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidName { ref path, .. } if path == "data_centers[1]"));
    }

    #[test]
    fn test_normalize_str_malformed() {
        let err = normalize_str("{not json").unwrap_err();
        assert!(matches!(err, NormalizeError::Malformed(_)));
    }
}
