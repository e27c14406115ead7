//! Error types for reading allocation artifacts.

use capalloc_capacity::NormalizeError;
use thiserror::Error;

/// Errors that can occur when loading a combined artifact.
///
/// These are structural problems only. Capacity or policy breaches are
/// reported through a [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// The artifact is not valid JSON.
    #[error("malformed allocation artifact: {0}")]
    Malformed(String),

    /// The artifact root is not a JSON object.
    #[error("allocation artifact must be a JSON object")]
    NotAnObject,

    /// A required section is absent.
    #[error("allocation artifact missing section: {0}")]
    MissingSection(&'static str),

    /// The `discovered` section is not a valid capacity descriptor.
    #[error("invalid discovered capacity: {0}")]
    Descriptor(#[from] NormalizeError),

    /// The `shared` or `private` section has the wrong shape.
    #[error("invalid {section} section: {reason}")]
    InvalidSection {
        section: &'static str,
        reason: String,
    },
}
