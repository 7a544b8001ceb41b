//! Per-cluster capability attributes and their typed, sparse metric form
//!
//! ## Table of Contents
//! - **Cluster**: raw name→string attribute map as presented by the host
//! - **ClusterMetrics**: parsed, sparse name→f64 map for a single cluster
//! - **AttributeKey**: the recognized attribute names

use std::collections::HashMap;

/// Name of a recognized numeric cluster attribute (see spec §3 Cluster Attributes).
pub const ATTR_WORKER_CPU_CAPACITY: &str = "worker_cpu_capacity";
/// Memory per worker node, in bytes.
pub const ATTR_WORKER_MEMORY_CAPACITY: &str = "worker_memory_capacity";
/// Upper bound on worker nodes usable in the cluster.
pub const ATTR_MAX_WORKER_NODES: &str = "max_worker_nodes";
/// Fixed power drawn whenever the cluster participates in an allocation.
pub const ATTR_CONTROL_PLANE_POWER: &str = "control_plane_power";
/// Fixed monetary cost under the same condition.
pub const ATTR_CONTROL_PLANE_COST: &str = "control_plane_cost";
/// Power per active worker node.
pub const ATTR_WORKER_POWER: &str = "worker_power";
/// Cost per active worker node.
pub const ATTR_WORKER_COST: &str = "worker_cost";
/// Static representative network latency to reach the cluster.
pub const ATTR_LATENCY: &str = "latency";

/// All recognized attribute keys, in the order they are documented in spec §3.
pub const RECOGNIZED_ATTRIBUTES: &[&str] = &[
    ATTR_WORKER_CPU_CAPACITY,
    ATTR_WORKER_MEMORY_CAPACITY,
    ATTR_MAX_WORKER_NODES,
    ATTR_CONTROL_PLANE_POWER,
    ATTR_CONTROL_PLANE_COST,
    ATTR_WORKER_POWER,
    ATTR_WORKER_COST,
    ATTR_LATENCY,
];

/// A cluster as presented by the host: a name plus arbitrary string-valued labels.
///
/// Only the keys in [`RECOGNIZED_ATTRIBUTES`] are meaningful to the scorer; any others
/// are ignored by [`Cluster::collect_metrics`].
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Unique cluster name
    pub name: String,
    /// Raw string-valued attributes as reported by the host
    pub attributes: HashMap<String, String>,
}

impl Cluster {
    /// Create a cluster with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Parse the recognized attributes into a typed, sparse metric map.
    ///
    /// Missing or unparseable keys are silently omitted (spec §4.1, §7 AttributeParse) —
    /// this function has no failure mode beyond producing a sparse map.
    pub fn collect_metrics(&self) -> ClusterMetrics {
        let mut metrics = HashMap::with_capacity(RECOGNIZED_ATTRIBUTES.len());
        for &key in RECOGNIZED_ATTRIBUTES {
            if let Some(raw) = self.attributes.get(key) {
                if let Ok(value) = raw.parse::<f64>() {
                    metrics.insert(key.to_string(), value);
                }
            }
        }
        ClusterMetrics {
            name: self.name.clone(),
            metrics,
        }
    }
}

/// Parsed, sparse numeric metrics for one cluster.
///
/// A metric bag is "sparse": an attribute that was missing or unparseable on the
/// source [`Cluster`] simply has no entry here, rather than a default of zero. Feasibility
/// checks in `evaluate.rs` treat a missing entry as zero, which typically prunes the
/// cluster out of any allocation that assigns it replicas.
#[derive(Debug, Clone, Default)]
pub struct ClusterMetrics {
    /// Cluster name this bag belongs to
    pub name: String,
    /// Sparse attribute → value map
    pub metrics: HashMap<String, f64>,
}

impl ClusterMetrics {
    /// Look up a recognized attribute, defaulting to `0.0` if absent.
    pub fn get(&self, key: &str) -> f64 {
        self.metrics.get(key).copied().unwrap_or(0.0)
    }

    /// CPU capacity per worker node, in millicores.
    pub fn worker_cpu_capacity(&self) -> f64 {
        self.get(ATTR_WORKER_CPU_CAPACITY)
    }

    /// Memory capacity per worker node, in bytes.
    pub fn worker_memory_capacity(&self) -> f64 {
        self.get(ATTR_WORKER_MEMORY_CAPACITY)
    }

    /// Upper bound on worker nodes usable.
    pub fn max_worker_nodes(&self) -> f64 {
        self.get(ATTR_MAX_WORKER_NODES)
    }

    /// Fixed control-plane power draw.
    pub fn control_plane_power(&self) -> f64 {
        self.get(ATTR_CONTROL_PLANE_POWER)
    }

    /// Fixed control-plane monetary cost.
    pub fn control_plane_cost(&self) -> f64 {
        self.get(ATTR_CONTROL_PLANE_COST)
    }

    /// Power per active worker node.
    pub fn worker_power(&self) -> f64 {
        self.get(ATTR_WORKER_POWER)
    }

    /// Cost per active worker node.
    pub fn worker_cost(&self) -> f64 {
        self.get(ATTR_WORKER_COST)
    }

    /// Static representative network latency.
    pub fn latency(&self) -> f64 {
        self.get(ATTR_LATENCY)
    }
}
