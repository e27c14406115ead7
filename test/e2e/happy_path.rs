//! End-to-end happy path test.
//!
//! This test drives the complete allocation flow over the libraries,
//! verifying:
//!
//! 1. Normalization of a raw capacity document
//! 2. Shared and private allocation
//! 3. Validation of the combined artifact, after a JSON round trip
//! 4. Extraction of flat and paired-unit domains
//! 5. Diffing two runs and replaying the diff
//!
//! ## Running
//!
//! ```bash
//! cargo test -p capalloc-e2e --test happy_path
//! ```

use capalloc_allocator::{DomainExtractor, DomainSelector, PoolAllocator};
use capalloc_capacity::{normalize, ResourceQuantity};
use capalloc_snapshot::{diff, SnapshotHash};
use capalloc_testing::{fixtures, CapacityDocBuilder};
use capalloc_validate::{CombinedArtifact, Validator, ValidatorConfig};
use serde_json::{json, Value};
use tracing::info;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Run normalize, allocate and combine, returning the artifact as JSON.
fn pipeline(raw: &Value) -> Value {
    let discovered = normalize(raw).expect("capacity document should normalize");
    let allocator = PoolAllocator::new(&discovered);
    let shared = allocator.allocate_shared().expect("shared pool should fit");
    let private = allocator.allocate_private().expect("private pools should fit");
    serde_json::to_value(CombinedArtifact::new(discovered, shared, private)).unwrap()
}

#[test]
fn happy_path() {
    init_tracing();

    // 1-2. Scenario run
    let artifact_json = pipeline(&fixtures::scenario_document());
    info!("scenario allocated");

    assert_eq!(
        artifact_json["shared"],
        json!({
            "shared_allocations": {
                "dc1": {
                    "db": {"cpu": 10, "mem": 10, "storage": 10},
                    "podA": {"cpu": 50, "mem": 50, "storage": 50}
                },
                "dc2": {
                    "db": {"cpu": 10, "mem": 10, "storage": 10},
                    "podA-pair": {"cpu": 50, "mem": 50, "storage": 50}
                }
            }
        })
    );
    assert_eq!(artifact_json["private"], json!({"private_allocations": {}}));

    // 3. Validation through the serialized artifact
    let artifact = CombinedArtifact::from_value(&artifact_json).expect("artifact should load");
    let report = Validator::default().validate(&artifact);
    assert_eq!(serde_json::to_value(&report).unwrap(), json!({"status": "ok"}));

    // 4. Extraction
    let db = DomainExtractor::by_convention().extract(
        &DomainSelector::parse("db").unwrap(),
        &artifact.shared,
        &artifact.private,
    );
    assert_eq!(db.entry_count(), 2);
    let pairs = DomainExtractor::for_descriptor(&artifact.discovered).extract(
        &DomainSelector::PairPod,
        &artifact.shared,
        &artifact.private,
    );
    assert_eq!(
        pairs.to_document()["pairpod_allocations"]["shared"],
        json!({"dc2": {"podA-pair": {"cpu": 50, "mem": 50, "storage": 50}}})
    );

    // 5. A second run with more capacity in dc2 only
    let grown = CapacityDocBuilder::new(&["dc1", "dc2"])
        .shared("dc1", 100, 100, 100)
        .shared("dc2", 140, 100, 100)
        .domain("db", 20, 20, 20)
        .domain("pod", 10, 10, 10)
        .domain("pairpod", 10, 10, 10)
        .unit("podA", "dc1", "dc2")
        .build();
    let grown_json = pipeline(&grown);

    assert!(diff(&artifact_json, &artifact_json).is_empty());
    let delta = diff(&artifact_json, &grown_json);
    assert_eq!(
        delta.changed.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["discovered.shared_pool.dc2.cpu"]
    );
    assert_eq!(delta.apply(&artifact_json), grown_json);
    assert_ne!(
        SnapshotHash::from_json(&artifact_json),
        SnapshotHash::from_json(&grown_json)
    );
}

#[test]
fn exhaustion_aborts_before_any_output() {
    init_tracing();

    let discovered = normalize(&fixtures::exhaustion_document()).unwrap();
    let err = PoolAllocator::new(&discovered).allocate_shared().unwrap_err();
    assert_eq!(
        err.to_string(),
        "insufficient cpu in dc1 for shared pool: requested 10, remaining 5"
    );
}

#[test]
fn multi_tenant_run_reports_isolation() {
    init_tracing();

    let artifact_json = pipeline(&fixtures::two_customer_document());
    let artifact = CombinedArtifact::from_value(&artifact_json).unwrap();

    // Private pools are isolated: globex never sees acme's capacity.
    let globex = &artifact.private.private_allocations["globex"];
    let granted: ResourceQuantity = globex["dc2"].values().sum();
    assert!(granted.cpu <= 60);

    let strict = Validator::default().validate(&artifact);
    assert!(strict
        .violations()
        .iter()
        .any(|v| v == "acme exceeds 50% private CPU policy in dc1."));

    // scv's odd minimums lose their remainder in the even split.
    let lenient = Validator::new(ValidatorConfig::default().with_isolation_ceiling(1.0))
        .validate(&artifact);
    assert_eq!(
        lenient.violations(),
        [
            "Domain scv CPU below minimum.",
            "Domain scv memory below minimum.",
            "Domain scv storage below minimum.",
        ]
    );
    assert!(!lenient.notes().is_empty());
}
