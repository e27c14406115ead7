//! Typed name definitions for the capacity model.

use crate::define_name;
use crate::NameError;

// =============================================================================
// Topology
// =============================================================================

define_name!(DatacenterId, "datacenter");
define_name!(CustomerId, "customer");

// =============================================================================
// Workloads
// =============================================================================

define_name!(DomainName, "domain");
define_name!(UnitName, "paired unit");
define_name!(EntryName, "entry");

/// Suffix appended to a paired unit's name for its pair entry.
pub const PAIR_SUFFIX: &str = "-pair";

/// Reserved domain holding the paired-unit primary template.
pub const POD_DOMAIN: &str = "pod";

/// Reserved domain holding the paired-unit pair template.
pub const PAIRPOD_DOMAIN: &str = "pairpod";

impl DomainName {
    /// Returns true for the reserved `pod` / `pairpod` template names.
    pub fn is_reserved(&self) -> bool {
        self.0 == POD_DOMAIN || self.0 == PAIRPOD_DOMAIN
    }
}

impl UnitName {
    /// Entry name for this unit's primary record.
    #[must_use]
    pub fn primary_entry(&self) -> EntryName {
        EntryName(self.0.clone())
    }

    /// Entry name for this unit's pair record (`<unit>-pair`).
    #[must_use]
    pub fn pair_entry(&self) -> EntryName {
        EntryName(format!("{}{}", self.0, PAIR_SUFFIX))
    }
}

impl EntryName {
    /// Returns true if this entry is a paired-unit pair record.
    pub fn is_pair(&self) -> bool {
        self.0.ends_with(PAIR_SUFFIX)
    }
}

impl From<&DomainName> for EntryName {
    fn from(domain: &DomainName) -> Self {
        EntryName(domain.0.clone())
    }
}

/// Shared validation for every name type.
#[doc(hidden)]
pub fn validate_name(kind: &'static str, s: &str) -> Result<(), NameError> {
    if s.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if s.trim() != s {
        return Err(NameError::SurroundingWhitespace {
            kind,
            value: s.to_string(),
        });
    }
    if s.chars().any(char::is_control) {
        return Err(NameError::ControlCharacter {
            kind,
            value: s.escape_debug().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
