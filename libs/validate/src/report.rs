//! Validation results.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Ok,
    Failed,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Ordered violations plus informational notes.
///
/// Serializes as `{"status": "ok"}` or
/// `{"status": "failed", "errors": [..]}`. Notes are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<String>,
    notes: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    pub(crate) fn note(&mut self, message: String) {
        self.notes.push(message);
    }

    pub fn status(&self) -> ValidationStatus {
        if self.violations.is_empty() {
            ValidationStatus::Ok
        } else {
            ValidationStatus::Failed
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status() == ValidationStatus::Ok
    }

    /// Violations in check order.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Paired-unit imbalance notes.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failed = !self.violations.is_empty();
        let mut map = serializer.serialize_map(Some(if failed { 2 } else { 1 }))?;
        map.serialize_entry("status", &self.status())?;
        if failed {
            map.serialize_entry("errors", &self.violations)?;
        }
        map.end()
    }
}
