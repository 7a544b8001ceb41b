//! Feasibility pruning and metric accounting for candidate allocations
//!
//! ## Table of Contents
//! - **WorkloadDemand**: per-replica resource ask for the workload being scheduled
//! - **AllocationMetrics**: the metric bag produced for one feasible allocation
//! - **evaluate_allocation**: feasibility check + metric accounting for one candidate
//! - **evaluate_all**: parallel feasibility + metric pass over an already-materialized set
//! - **evaluate_stream**: sequential feasibility pass over a lazily-produced candidate set

use crate::cluster::ClusterMetrics;
use crate::enumerate::Allocation;
use rayon::prelude::*;
use std::collections::HashMap;

/// Per-replica resource ask for the workload being scheduled (spec §3 Workload Demand).
#[derive(Debug, Clone, Copy)]
pub struct WorkloadDemand {
    /// Total replicas requested
    pub replicas: u64,
    /// CPU per replica, in millicores
    pub cpu_per_replica: f64,
    /// Memory per replica, in bytes
    pub memory_per_replica: f64,
}

/// The metric bag computed for one feasible allocation (spec §4.4).
#[derive(Debug, Clone)]
pub struct AllocationMetrics {
    /// Total electrical power draw across all clusters
    pub power: f64,
    /// Total monetary cost across all clusters
    pub cost: f64,
    /// Replica-weighted average packing utilization (truncated to 3 decimals)
    pub utilization: f64,
    /// Population stddev of normalized load ratios (truncated to 3 decimals)
    pub proportionality: f64,
    /// Replica-count-weighted mean latency
    pub weighted_latency: f64,
    /// Worker nodes required per cluster, keyed by cluster name, for diagnostics
    pub worker_nodes: HashMap<String, u64>,
}

impl AllocationMetrics {
    /// Render this bag as the flat `criterion_name -> value` map the AHP payload expects,
    /// including the `worker_nodes_<cluster>` diagnostic entries (spec §4.4).
    pub fn to_metric_map(&self) -> HashMap<String, f64> {
        let mut map = HashMap::with_capacity(5 + self.worker_nodes.len());
        map.insert("power".to_string(), self.power);
        map.insert("cost".to_string(), self.cost);
        map.insert("utilization".to_string(), self.utilization);
        map.insert("proportionality".to_string(), self.proportionality);
        map.insert("weighted_latency".to_string(), self.weighted_latency);
        for (cluster, nodes) in &self.worker_nodes {
            map.insert(format!("worker_nodes_{cluster}"), *nodes as f64);
        }
        map
    }
}

fn truncate3(value: f64) -> f64 {
    (value * 1000.0).floor() / 1000.0
}

/// Evaluate one candidate allocation against the per-cluster metric map.
///
/// Returns `None` if the allocation fails any feasibility check (spec §4.4):
/// an unknown cluster, a per-replica CPU/memory overage, or a worker-node-count overage.
/// A `None` here is a pruning decision, not an error — the caller only raises
/// `Infeasible` if *every* candidate is pruned (spec §7).
pub fn evaluate_allocation(
    allocation: &Allocation,
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
    demand: &WorkloadDemand,
) -> Option<AllocationMetrics> {
    let mut worker_nodes = HashMap::with_capacity(allocation.cluster_order.len());

    for cluster in &allocation.cluster_order {
        let count = allocation.count_for(cluster);
        let metrics = metrics_by_cluster.get(cluster)?;

        if count > 0 {
            if demand.cpu_per_replica > metrics.worker_cpu_capacity() {
                return None;
            }
            if demand.memory_per_replica > metrics.worker_memory_capacity() {
                return None;
            }
            let nodes = crate::binpack::nodes_required(
                count,
                demand.cpu_per_replica,
                demand.memory_per_replica,
                metrics.worker_cpu_capacity(),
                metrics.worker_memory_capacity(),
            )
            .ok()?;
            if nodes as f64 > metrics.max_worker_nodes() {
                return None;
            }
            worker_nodes.insert(cluster.clone(), nodes);
        } else {
            worker_nodes.insert(cluster.clone(), 0);
        }
    }

    let power: f64 = allocation
        .cluster_order
        .iter()
        .map(|c| {
            let m = &metrics_by_cluster[c];
            let nodes = worker_nodes[c];
            m.control_plane_power() + if nodes > 0 { m.worker_power() * nodes as f64 } else { 0.0 }
        })
        .sum();

    let cost: f64 = allocation
        .cluster_order
        .iter()
        .map(|c| {
            let m = &metrics_by_cluster[c];
            let nodes = worker_nodes[c];
            m.control_plane_cost() + if nodes > 0 { m.worker_cost() * nodes as f64 } else { 0.0 }
        })
        .sum();

    let utilization = compute_utilization(allocation, metrics_by_cluster, demand, &worker_nodes);
    let proportionality = compute_proportionality(allocation, metrics_by_cluster);
    let weighted_latency = compute_weighted_latency(allocation, metrics_by_cluster);

    Some(AllocationMetrics {
        power,
        cost,
        utilization: truncate3(utilization),
        proportionality: truncate3(proportionality),
        weighted_latency,
        worker_nodes,
    })
}

fn compute_utilization(
    allocation: &Allocation,
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
    demand: &WorkloadDemand,
    worker_nodes: &HashMap<String, u64>,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_replicas = 0.0;

    for cluster in &allocation.cluster_order {
        let count = allocation.count_for(cluster);
        if count == 0 {
            continue;
        }
        let m = &metrics_by_cluster[cluster];
        let nodes = worker_nodes[cluster] as f64;
        let cpu_util = (count as f64 * demand.cpu_per_replica) / (nodes * m.worker_cpu_capacity());
        let mem_util = (count as f64 * demand.memory_per_replica) / (nodes * m.worker_memory_capacity());
        let util = (cpu_util + mem_util) / 2.0;
        weighted_sum += util * count as f64;
        total_replicas += count as f64;
    }

    if total_replicas == 0.0 {
        0.0
    } else {
        weighted_sum / total_replicas
    }
}

fn compute_proportionality(
    allocation: &Allocation,
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
) -> f64 {
    let k = allocation.cluster_order.len();
    if k <= 1 {
        return 0.0;
    }

    let n: f64 = allocation.counts.iter().sum::<u64>() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let total_capacity: f64 = allocation
        .cluster_order
        .iter()
        .map(|c| {
            let m = &metrics_by_cluster[c];
            m.max_worker_nodes() * m.worker_cpu_capacity()
        })
        .sum();

    if total_capacity == 0.0 {
        return 0.0;
    }

    let ratios: Vec<f64> = allocation
        .cluster_order
        .iter()
        .map(|c| {
            let m = &metrics_by_cluster[c];
            let replica_share = allocation.count_for(c) as f64 / n;
            let capacity_share = (m.max_worker_nodes() * m.worker_cpu_capacity()) / total_capacity;
            if capacity_share == 0.0 {
                0.0
            } else {
                replica_share / capacity_share
            }
        })
        .collect();

    let mean = ratios.iter().sum::<f64>() / k as f64;
    let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / k as f64;
    variance.sqrt()
}

fn compute_weighted_latency(
    allocation: &Allocation,
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
) -> f64 {
    let n: f64 = allocation.counts.iter().sum::<u64>() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let sum: f64 = allocation
        .cluster_order
        .iter()
        .filter(|c| allocation.count_for(c) > 0)
        .map(|c| allocation.count_for(c) as f64 * metrics_by_cluster[c].latency())
        .sum();
    sum / n
}

/// Evaluate the full candidate set in parallel (mirrors the teacher crate's
/// `rayon`-backed scoring in `scheduler/optimized.rs`), returning only the feasible
/// allocations paired with their metric bags, in original enumeration order.
///
/// Requires the whole candidate set materialized up front; fine for small `(N, K)` where
/// the enumerator's eager `Vec` form is cheap. For parameters that may be large, prefer
/// [`evaluate_stream`], which never holds the full composition set in memory at once.
pub fn evaluate_all(
    allocations: &[Allocation],
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
    demand: &WorkloadDemand,
) -> Vec<(Allocation, AllocationMetrics)> {
    allocations
        .par_iter()
        .filter_map(|allocation| {
            evaluate_allocation(allocation, metrics_by_cluster, demand)
                .map(|metrics| (allocation.clone(), metrics))
        })
        .collect()
}

/// Evaluate a lazily-produced candidate set sequentially, one allocation at a time, so the
/// feasibility loop never materializes the whole composition set as a `Vec<Allocation>`
/// before the first feasibility check runs (spec §4.2, §5 "Resource bounds"). Returns the
/// feasible allocations in enumeration order alongside how many candidates were drawn from
/// `allocations`, for telemetry parity with [`evaluate_all`].
pub fn evaluate_stream(
    allocations: impl Iterator<Item = Allocation>,
    metrics_by_cluster: &HashMap<String, ClusterMetrics>,
    demand: &WorkloadDemand,
) -> (Vec<(Allocation, AllocationMetrics)>, usize) {
    let mut enumerated = 0usize;
    let mut feasible = Vec::new();
    for allocation in allocations {
        enumerated += 1;
        if let Some(metrics) = evaluate_allocation(&allocation, metrics_by_cluster, demand) {
            feasible.push((allocation, metrics));
        }
    }
    (feasible, enumerated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    fn reference_clusters() -> HashMap<String, ClusterMetrics> {
        let gib = 1024.0 * 1024.0 * 1024.0;
        let mut map = HashMap::new();
        map.insert(
            "edge".to_string(),
            Cluster::new("edge")
                .with_attribute("worker_cpu_capacity", "2000")
                .with_attribute("worker_memory_capacity", &(4.0 * gib).to_string())
                .with_attribute("control_plane_power", "40")
                .with_attribute("control_plane_cost", "60")
                .with_attribute("worker_power", "40")
                .with_attribute("worker_cost", "60")
                .with_attribute("max_worker_nodes", "4")
                .with_attribute("latency", "10")
                .collect_metrics(),
        );
        map.insert(
            "fog".to_string(),
            Cluster::new("fog")
                .with_attribute("worker_cpu_capacity", "4000")
                .with_attribute("worker_memory_capacity", &(8.0 * gib).to_string())
                .with_attribute("control_plane_power", "30")
                .with_attribute("control_plane_cost", "45")
                .with_attribute("worker_power", "70")
                .with_attribute("worker_cost", "100")
                .with_attribute("max_worker_nodes", "8")
                .with_attribute("latency", "25")
                .collect_metrics(),
        );
        map.insert(
            "cloud".to_string(),
            Cluster::new("cloud")
                .with_attribute("worker_cpu_capacity", "8000")
                .with_attribute("worker_memory_capacity", &(16.0 * gib).to_string())
                .with_attribute("control_plane_power", "15")
                .with_attribute("control_plane_cost", "30")
                .with_attribute("worker_power", "100")
                .with_attribute("worker_cost", "140")
                .with_attribute("max_worker_nodes", "16")
                .with_attribute("latency", "50")
                .collect_metrics(),
        );
        map
    }

    fn alloc(order: &[&str], counts: &[u64]) -> Allocation {
        Allocation {
            cluster_order: order.iter().map(|s| s.to_string()).collect(),
            counts: counts.to_vec(),
        }
    }

    #[test]
    fn scenario_2_feasibility_rejects_edge_when_cpu_too_large() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 5,
            cpu_per_replica: 2500.0,
            memory_per_replica: 2.0 * 1024.0 * 1024.0 * 1024.0,
        };

        let with_edge = alloc(&["edge", "fog", "cloud"], &[1, 2, 2]);
        assert!(evaluate_allocation(&with_edge, &clusters, &demand).is_none());

        let without_edge = alloc(&["edge", "fog", "cloud"], &[0, 2, 3]);
        assert!(evaluate_allocation(&without_edge, &clusters, &demand).is_some());
    }

    #[test]
    fn scenario_4_power_accounting() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 2,
            cpu_per_replica: 1000.0,
            memory_per_replica: 1024.0 * 1024.0 * 1024.0,
        };
        let allocation = alloc(&["edge", "fog", "cloud"], &[1, 1, 0]);
        let metrics = evaluate_allocation(&allocation, &clusters, &demand).unwrap();
        assert_eq!(metrics.power, 195.0);
    }

    #[test]
    fn scenario_5_weighted_latency() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 5,
            cpu_per_replica: 500.0,
            memory_per_replica: 512.0 * 1024.0 * 1024.0,
        };
        let allocation = alloc(&["edge", "fog", "cloud"], &[2, 1, 2]);
        let metrics = evaluate_allocation(&allocation, &clusters, &demand).unwrap();
        assert_eq!(metrics.weighted_latency, 29.0);
    }

    #[test]
    fn proportionality_is_zero_when_shares_match_capacity() {
        let mut clusters = HashMap::new();
        clusters.insert(
            "a".to_string(),
            Cluster::new("a")
                .with_attribute("worker_cpu_capacity", "1000")
                .with_attribute("worker_memory_capacity", "1000000000")
                .with_attribute("max_worker_nodes", "1")
                .collect_metrics(),
        );
        clusters.insert(
            "b".to_string(),
            Cluster::new("b")
                .with_attribute("worker_cpu_capacity", "1000")
                .with_attribute("worker_memory_capacity", "1000000000")
                .with_attribute("max_worker_nodes", "1")
                .collect_metrics(),
        );
        let allocation = alloc(&["a", "b"], &[5, 5]);
        let proportionality = compute_proportionality(&allocation, &clusters);
        assert_eq!(proportionality, 0.0);
    }

    #[test]
    fn proportionality_is_zero_with_single_cluster() {
        let clusters = reference_clusters();
        let allocation = alloc(&["edge"], &[3]);
        assert_eq!(compute_proportionality(&allocation, &clusters), 0.0);
    }

    #[test]
    fn evaluate_all_keeps_only_feasible_allocations_in_order() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 2,
            cpu_per_replica: 2500.0,
            memory_per_replica: 1024.0,
        };
        let order = vec!["edge".to_string(), "fog".to_string(), "cloud".to_string()];
        let allocations = crate::enumerate::enumerate_allocations(&order, 2, 10_000).unwrap();
        let feasible = evaluate_all(&allocations, &clusters, &demand);
        assert!(feasible.iter().all(|(a, _)| a.count_for("edge") == 0));
        assert!(!feasible.is_empty());
    }

    #[test]
    fn evaluate_stream_matches_evaluate_all() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 2,
            cpu_per_replica: 2500.0,
            memory_per_replica: 1024.0,
        };
        let order = vec!["edge".to_string(), "fog".to_string(), "cloud".to_string()];
        let allocations = crate::enumerate::enumerate_allocations(&order, 2, 10_000).unwrap();
        let from_vec = evaluate_all(&allocations, &clusters, &demand);

        let stream = crate::enumerate::enumerate_stream(&order, 2, 10_000).unwrap();
        let (from_stream, enumerated) = evaluate_stream(stream, &clusters, &demand);

        assert_eq!(enumerated, allocations.len());
        let from_vec_ids: Vec<String> = from_vec.iter().map(|(a, _)| a.id()).collect();
        let from_stream_ids: Vec<String> = from_stream.iter().map(|(a, _)| a.id()).collect();
        assert_eq!(from_vec_ids, from_stream_ids);
    }

    #[test]
    fn utilization_is_truncated_to_three_decimals() {
        let clusters = reference_clusters();
        let demand = WorkloadDemand {
            replicas: 3,
            cpu_per_replica: 333.0,
            memory_per_replica: 333.0,
        };
        let allocation = alloc(&["edge", "fog", "cloud"], &[0, 3, 0]);
        let metrics = evaluate_allocation(&allocation, &clusters, &demand).unwrap();
        let scaled = metrics.utilization * 1000.0;
        assert!((scaled - scaled.floor()).abs() < 1e-9);
    }
}
