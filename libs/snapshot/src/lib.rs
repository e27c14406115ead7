//! Snapshot comparison primitives.
//!
//! A snapshot is any JSON document the pipeline writes: a normalized
//! descriptor, an allocator output or a combined artifact. This library
//! compares two snapshots structurally. Key concepts:
//!
//! - **Canonical form**: sorted keys, no whitespace, integral floats
//!   written as integers.
//! - **Fingerprint**: SHA-256 over the canonical form.
//! - **Diff**: added, removed and changed values keyed by dotted path.
//!
//! # Invariants
//!
//! - `diff(x, x)` is empty for every document
//! - Applying `diff(old, new)` to `old` reproduces `new` when no key
//!   contains a `.`
//! - Output maps are ordered by path

mod canonical;
mod diff;

use sha2::{Digest, Sha256};

pub use canonical::{canonical_json, normalize_numbers};
pub use diff::{diff, AllocationDiff, Change};

/// A content fingerprint for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotHash(String);

impl SnapshotHash {
    /// Fingerprint a document's canonical JSON as `sha256:<hex>`.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let canonical = canonical_json(json);
        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("sha256:{}", hex::encode(digest)))
    }

    /// Get the hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SnapshotHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
