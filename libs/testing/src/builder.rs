use serde_json::{json, Map, Value};

/// Fluent builder for raw capacity documents.
///
/// ```ignore
/// let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
///     .shared_all(100, 100, 100)
///     .domain("db", 20, 20, 20)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CapacityDocBuilder {
    datacenters: Vec<String>,
    shared_pool: Map<String, Value>,
    private_pools: Map<String, Value>,
    domains: Map<String, Value>,
    pods: Map<String, Value>,
}

impl CapacityDocBuilder {
    /// Start a document with the given datacenters.
    pub fn new(datacenters: &[&str]) -> Self {
        Self {
            datacenters: datacenters.iter().map(|s| s.to_string()).collect(),
            shared_pool: Map::new(),
            private_pools: Map::new(),
            domains: Map::new(),
            pods: Map::new(),
        }
    }

    /// Set the shared capacity of one datacenter.
    pub fn shared(mut self, dc: &str, cpu: u64, mem: u64, storage: u64) -> Self {
        self.shared_pool
            .insert(dc.to_string(), quantity(cpu, mem, storage));
        self
    }

    /// Set the same shared capacity for every datacenter.
    pub fn shared_all(mut self, cpu: u64, mem: u64, storage: u64) -> Self {
        for dc in &self.datacenters {
            self.shared_pool
                .insert(dc.clone(), quantity(cpu, mem, storage));
        }
        self
    }

    /// Set one customer's private capacity in one datacenter.
    pub fn private(mut self, customer: &str, dc: &str, cpu: u64, mem: u64, storage: u64) -> Self {
        let pools = self
            .private_pools
            .entry(customer.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(pools) = pools.as_object_mut() {
            pools.insert(dc.to_string(), quantity(cpu, mem, storage));
        }
        self
    }

    /// Set the same private capacity for a customer in every datacenter.
    pub fn private_all(mut self, customer: &str, cpu: u64, mem: u64, storage: u64) -> Self {
        let dcs = self.datacenters.clone();
        for dc in &dcs {
            self = self.private(customer, dc, cpu, mem, storage);
        }
        self
    }

    /// Add a domain with its minimums.
    pub fn domain(mut self, name: &str, min_cpu: u64, min_mem: u64, min_storage: u64) -> Self {
        self.domains.insert(
            name.to_string(),
            json!({"min_cpu": min_cpu, "min_mem": min_mem, "min_storage": min_storage}),
        );
        self
    }

    /// Add a paired unit.
    pub fn unit(mut self, name: &str, dc: &str, pair_dc: &str) -> Self {
        self.pods
            .insert(name.to_string(), json!({"dc": dc, "pair_dc": pair_dc}));
        self
    }

    /// Finish the document.
    pub fn build(self) -> Value {
        json!({
            "data_centers": self.datacenters,
            "shared_pool": self.shared_pool,
            "private_pools": self.private_pools,
            "domains": self.domains,
            "pods": self.pods,
        })
    }
}

fn quantity(cpu: u64, mem: u64, storage: u64) -> Value {
    json!({"cpu": cpu, "mem": mem, "storage": storage})
}
