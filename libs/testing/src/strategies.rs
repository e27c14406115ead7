//! Proptest strategies producing valid capacity documents.
//!
//! Capacities are drawn well above the minimums most of the time, but
//! the ranges overlap so that exhaustion is also exercised.

use proptest::prelude::*;
use serde_json::Value;

use crate::CapacityDocBuilder;

/// Capacity for one pool in one DC.
fn arb_quantity() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..5_000, 0u64..5_000, 0u64..5_000)
}

/// Minimums for one domain.
fn arb_minimum() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..600, 0u64..600, 0u64..600)
}

/// A valid raw capacity document with 2 to 4 datacenters.
pub fn arb_capacity_document() -> impl Strategy<Value = Value> {
    (2usize..=4)
        .prop_flat_map(|dc_count| {
            (
                Just(dc_count),
                prop::collection::vec(arb_quantity(), dc_count),
                prop::collection::vec(prop::collection::vec(arb_quantity(), dc_count), 0..3),
                prop::collection::vec(arb_minimum(), 0..4),
                arb_minimum(),
                arb_minimum(),
                prop::collection::vec((0..dc_count, 1..dc_count), 0..4),
            )
        })
        .prop_map(
            |(dc_count, shared, customers, flat, pod, pairpod, units)| {
                let names: Vec<String> = (0..dc_count).map(|i| format!("dc{i}")).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();

                let mut builder = CapacityDocBuilder::new(&refs);
                for (dc, (cpu, mem, storage)) in names.iter().zip(&shared) {
                    builder = builder.shared(dc, *cpu, *mem, *storage);
                }
                for (index, pools) in customers.iter().enumerate() {
                    let customer = format!("customer{index}");
                    for (dc, (cpu, mem, storage)) in names.iter().zip(pools) {
                        builder = builder.private(&customer, dc, *cpu, *mem, *storage);
                    }
                }
                for (index, (cpu, mem, storage)) in flat.iter().enumerate() {
                    builder = builder.domain(&format!("domain{index}"), *cpu, *mem, *storage);
                }
                builder = builder
                    .domain("pod", pod.0, pod.1, pod.2)
                    .domain("pairpod", pairpod.0, pairpod.1, pairpod.2);
                for (index, (primary, offset)) in units.iter().enumerate() {
                    // offset is in 1..dc_count, so pair never equals primary
                    let pair = (primary + offset) % dc_count;
                    builder = builder.unit(&format!("unit{index}"), &names[*primary], &names[pair]);
                }
                builder.build()
            },
        )
}
