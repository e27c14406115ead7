//! Canonical capacity documents used across the test suites.

use serde_json::Value;

use crate::CapacityDocBuilder;

/// Two DCs with 100/100/100 shared each, a `db` domain of 20/20/20,
/// 10/10/10 pod templates and one unit `podA` placed dc1 -> dc2.
pub fn scenario_document() -> Value {
    CapacityDocBuilder::new(&["dc1", "dc2"])
        .shared_all(100, 100, 100)
        .domain("db", 20, 20, 20)
        .domain("pod", 10, 10, 10)
        .domain("pairpod", 10, 10, 10)
        .unit("podA", "dc1", "dc2")
        .build()
}

/// The shared pool in dc1 has 5 CPU; `db` needs 10 CPU per DC.
pub fn exhaustion_document() -> Value {
    CapacityDocBuilder::new(&["dc1", "dc2"])
        .shared("dc1", 5, 100, 100)
        .shared("dc2", 100, 100, 100)
        .domain("db", 20, 20, 20)
        .build()
}

/// The scenario plus two customers with private pools and a second unit.
pub fn two_customer_document() -> Value {
    CapacityDocBuilder::new(&["dc1", "dc2"])
        .shared_all(400, 800, 1000)
        .private_all("acme", 200, 400, 500)
        .private("globex", "dc1", 100, 100, 100)
        .private("globex", "dc2", 60, 100, 100)
        .domain("app", 30, 60, 90)
        .domain("db", 20, 20, 20)
        .domain("scv", 11, 7, 3)
        .domain("pod", 10, 10, 10)
        .domain("pairpod", 8, 8, 8)
        .unit("podA", "dc1", "dc2")
        .unit("podB", "dc2", "dc1")
        .build()
}
