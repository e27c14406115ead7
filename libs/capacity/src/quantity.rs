//! Resource quantities.

use serde::{Deserialize, Serialize};

/// One component of a [`ResourceQuantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Cpu,
    Mem,
    Storage,
}

impl Resource {
    /// All components in canonical order.
    pub const ALL: [Resource; 3] = [Resource::Cpu, Resource::Mem, Resource::Storage];

    /// Wire name of the component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Cpu => "cpu",
            Resource::Mem => "mem",
            Resource::Storage => "storage",
        }
    }

    /// Human label used in report messages.
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Cpu => "CPU",
            Resource::Mem => "memory",
            Resource::Storage => "storage",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bundle of cpu, memory and storage in caller-chosen units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceQuantity {
    pub cpu: u64,
    pub mem: u64,
    pub storage: u64,
}

impl ResourceQuantity {
    /// The empty quantity.
    pub const ZERO: Self = Self {
        cpu: 0,
        mem: 0,
        storage: 0,
    };

    /// Create a quantity from its components.
    pub const fn new(cpu: u64, mem: u64, storage: u64) -> Self {
        Self { cpu, mem, storage }
    }

    /// Read one component.
    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Cpu => self.cpu,
            Resource::Mem => self.mem,
            Resource::Storage => self.storage,
        }
    }

    /// Subtract `other`, or return the first component (in canonical
    /// order) that would go negative.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, Resource> {
        for resource in Resource::ALL {
            if self.get(resource) < other.get(resource) {
                return Err(resource);
            }
        }
        Ok(Self {
            cpu: self.cpu - other.cpu,
            mem: self.mem - other.mem,
            storage: self.storage - other.storage,
        })
    }

    /// Componentwise saturating addition.
    #[must_use]
    pub fn saturating_add(&self, other: &Self) -> Self {
        Self {
            cpu: self.cpu.saturating_add(other.cpu),
            mem: self.mem.saturating_add(other.mem),
            storage: self.storage.saturating_add(other.storage),
        }
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        Self {
            cpu: self.cpu.min(other.cpu),
            mem: self.mem.min(other.mem),
            storage: self.storage.min(other.storage),
        }
    }

    /// Componentwise floor division. Any remainder is discarded.
    ///
    /// Returns [`ResourceQuantity::ZERO`] when `parts` is zero.
    #[must_use]
    pub fn split(&self, parts: u64) -> Self {
        if parts == 0 {
            return Self::ZERO;
        }
        Self {
            cpu: self.cpu / parts,
            mem: self.mem / parts,
            storage: self.storage / parts,
        }
    }

    /// Componentwise floor of half.
    #[must_use]
    pub fn half(&self) -> Self {
        self.split(2)
    }

    /// Returns true if every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Iterate `(resource, value)` pairs in canonical order.
    pub fn components(&self) -> impl Iterator<Item = (Resource, u64)> + '_ {
        Resource::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

impl std::iter::Sum for ResourceQuantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, q| acc.saturating_add(&q))
    }
}

impl<'a> std::iter::Sum<&'a ResourceQuantity> for ResourceQuantity {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, q| acc.saturating_add(q))
    }
}
