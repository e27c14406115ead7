//! The combined allocation artifact.

use capalloc_allocator::{PrivateAllocations, SharedAllocations};
use capalloc_capacity::{normalize, CapacityDescriptor};
use serde::Serialize;
use serde_json::Value;

use crate::error::ArtifactError;

/// `{"discovered": .., "shared": .., "private": ..}` as written by the
/// pipeline to `allocation.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedArtifact {
    pub discovered: CapacityDescriptor,
    pub shared: SharedAllocations,
    pub private: PrivateAllocations,
}

impl CombinedArtifact {
    pub fn new(
        discovered: CapacityDescriptor,
        shared: SharedAllocations,
        private: PrivateAllocations,
    ) -> Self {
        Self {
            discovered,
            shared,
            private,
        }
    }

    /// Parse an artifact from JSON text.
    pub fn parse(input: &str) -> Result<Self, ArtifactError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| ArtifactError::Malformed(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Load an artifact from a parsed document.
    ///
    /// The `discovered` section is normalized again, so a hand-edited
    /// descriptor is held to the same rules as a fresh one.
    pub fn from_value(value: &Value) -> Result<Self, ArtifactError> {
        let root = value.as_object().ok_or(ArtifactError::NotAnObject)?;
        let section = |name: &'static str| root.get(name).ok_or(ArtifactError::MissingSection(name));

        let discovered = normalize(section("discovered")?)?;
        let shared = serde_json::from_value(section("shared")?.clone()).map_err(|e| {
            ArtifactError::InvalidSection {
                section: "shared",
                reason: e.to_string(),
            }
        })?;
        let private = serde_json::from_value(section("private")?.clone()).map_err(|e| {
            ArtifactError::InvalidSection {
                section: "private",
                reason: e.to_string(),
            }
        })?;

        Ok(Self::new(discovered, shared, private))
    }
}

#[cfg(test)]
mod tests {
    use capalloc_allocator::PoolAllocator;
    use capalloc_testing::fixtures;
    use serde_json::json;

    use super::*;

    fn scenario() -> CombinedArtifact {
        let discovered = normalize(&fixtures::scenario_document()).unwrap();
        let allocator = PoolAllocator::new(&discovered);
        let shared = allocator.allocate_shared().unwrap();
        let private = allocator.allocate_private().unwrap();
        CombinedArtifact::new(discovered, shared, private)
    }

    #[test]
    fn test_artifact_reads_back_its_own_output() {
        let artifact = scenario();
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(CombinedArtifact::from_value(&value).unwrap(), artifact);
    }

    #[test]
    fn test_missing_section() {
        let mut value = serde_json::to_value(scenario()).unwrap();
        value.as_object_mut().unwrap().remove("private");
        assert_eq!(
            CombinedArtifact::from_value(&value).unwrap_err(),
            ArtifactError::MissingSection("private")
        );
    }

    #[test]
    fn test_invalid_shared_section() {
        let mut value = serde_json::to_value(scenario()).unwrap();
        value["shared"] = json!({"shared_allocations": {"dc1": {"db": {"cpu": -1, "mem": 0, "storage": 0}}}});
        let err = CombinedArtifact::from_value(&value).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidSection { section: "shared", .. }));
    }

    #[test]
    fn test_discovered_is_renormalized() {
        let mut value = serde_json::to_value(scenario()).unwrap();
        value["discovered"]["pods"]["podA"]["pair_dc"] = json!("dc1");
        let err = CombinedArtifact::from_value(&value).unwrap_err();
        assert!(matches!(err, ArtifactError::Descriptor(_)));
    }

    #[test]
    fn test_malformed_and_non_object() {
        assert!(matches!(
            CombinedArtifact::parse("{"),
            Err(ArtifactError::Malformed(_))
        ));
        assert_eq!(
            CombinedArtifact::parse("[]").unwrap_err(),
            ArtifactError::NotAnObject
        );
    }
}
