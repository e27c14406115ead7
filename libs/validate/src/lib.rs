//! Validation of allocation artifacts.
//!
//! The validator re-checks a combined artifact (descriptor plus shared and
//! private outputs) independently of the allocator that produced it:
//!
//! - **Capacity bound**: grants never exceed a pool's total in any
//!   datacenter or resource.
//! - **Domain minimums**: every flat domain's shared-pool grants add up to
//!   at least its minimums.
//! - **Isolation**: a customer's grants stay under a ceiling fraction of
//!   its private pool in each datacenter.
//! - **Policy**: DC separation of paired units and an optional per-entry
//!   share ceiling on the shared pool.
//!
//! Paired-unit imbalance is informational and only ever produces notes.

mod artifact;
mod error;
mod policy;
mod report;
mod validator;

pub use artifact::CombinedArtifact;
pub use error::ArtifactError;
pub use policy::{ValidatorConfig, DEFAULT_ISOLATION_CEILING};
pub use report::{ValidationReport, ValidationStatus};
pub use validator::Validator;
