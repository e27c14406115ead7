//! # capalloc-capacity
//!
//! The canonical capacity model and its normalizer.
//!
//! A raw capacity document (the snapshot written by the inventory
//! collector) is validated once by [`normalize`] and turned into an
//! immutable [`CapacityDescriptor`]. Everything downstream (allocation,
//! validation, extraction) reads the descriptor and never the raw document.
//!
//! ## Invariants
//!
//! - A descriptor always has at least two unique datacenters
//! - Every pool (shared and per customer) defines every datacenter
//! - Every paired unit spans two distinct, known datacenters
//! - Maps are ordered by name, so iteration order is a total order

mod descriptor;
mod error;
mod normalize;
mod quantity;

pub use descriptor::{CapacityDescriptor, DomainSpec, PairedUnit, PoolCapacity};
pub use error::NormalizeError;
pub use normalize::{normalize, normalize_str, REQUIRED_KEYS};
pub use quantity::{Resource, ResourceQuantity};
