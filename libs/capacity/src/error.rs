//! Error types for capacity normalization.

use capalloc_id::NameError;
use thiserror::Error;

/// Errors that can occur when normalizing a raw capacity document.
///
/// Each variant names the offending key, datacenter, customer, domain or
/// unit. Normalization stops at the first failure so messages are stable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The document is not valid JSON.
    #[error("malformed capacity document: {0}")]
    Malformed(String),

    /// The document root is not a JSON object.
    #[error("capacity document must be a JSON object")]
    NotAnObject,

    /// A required top-level key is absent.
    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    /// A value that must be a JSON object is something else.
    #[error("{path} must be a JSON object")]
    ExpectedObject { path: String },

    /// A value that must be a string is something else.
    #[error("{path} must be a string")]
    ExpectedString { path: String },

    /// `data_centers` is not a list.
    #[error("data_centers must be a list")]
    DatacentersNotList,

    /// A datacenter appears more than once.
    #[error("duplicate datacenter: {0}")]
    DuplicateDatacenter(String),

    /// Fewer than two datacenters were declared.
    #[error("data_centers must contain at least two DCs (got {count})")]
    TooFewDatacenters { count: usize },

    /// A name failed validation.
    #[error("invalid name at {path}: {source}")]
    InvalidName {
        path: String,
        #[source]
        source: NameError,
    },

    /// The shared pool does not define a datacenter.
    #[error("shared pool missing DC: {0}")]
    SharedPoolMissingDc(String),

    /// A customer's private pool does not define a datacenter.
    #[error("private pool for {customer} missing DC: {dc}")]
    PrivatePoolMissingDc { customer: String, dc: String },

    /// A domain spec lacks one of its minimum fields.
    #[error("domain {domain} missing field: {field}")]
    DomainMissingField { domain: String, field: &'static str },

    /// A paired unit lacks its `dc` or `pair_dc` field.
    #[error("POD {unit} missing {field} field")]
    UnitMissingField { unit: String, field: &'static str },

    /// A paired unit references a datacenter that was not declared.
    #[error("POD {unit} {field} references unknown DC: {dc}")]
    UnitUnknownDc {
        unit: String,
        field: &'static str,
        dc: String,
    },

    /// A paired unit places its primary and pair in the same datacenter.
    #[error("POD {unit} places primary and pair in the same DC: {dc}")]
    UnitSameDc { unit: String, dc: String },

    /// A quantity or minimum is missing or not a non-negative integer.
    #[error("invalid quantity at {path}: {reason}")]
    InvalidQuantity { path: String, reason: String },

    /// Paired units exist but a reserved template domain is not defined.
    #[error("pods require the '{0}' domain template")]
    MissingTemplate(&'static str),

    /// Two ledger entries would share a name.
    #[error("entry name '{entry}' is claimed by both {first} and {second}")]
    EntryCollision {
        entry: String,
        first: String,
        second: String,
    },
}

impl NormalizeError {
    /// Returns true if the error concerns datacenter references.
    pub fn is_datacenter_error(&self) -> bool {
        matches!(
            self,
            NormalizeError::DuplicateDatacenter(_)
                | NormalizeError::TooFewDatacenters { .. }
                | NormalizeError::SharedPoolMissingDc(_)
                | NormalizeError::PrivatePoolMissingDc { .. }
                | NormalizeError::UnitUnknownDc { .. }
                | NormalizeError::UnitSameDc { .. }
        )
    }
}

impl From<serde_json::Error> for NormalizeError {
    fn from(err: serde_json::Error) -> Self {
        NormalizeError::Malformed(err.to_string())
    }
}
