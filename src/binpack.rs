//! First-fit-decreasing bin packing, specialized for identical replicas
//!
//! For heterogeneous items, first-fit-decreasing sorts items descending and scans bins
//! looking for the first one with room. When every item has the same CPU/memory
//! footprint (as is the case here — one workload's replicas are identical), the sort is a
//! no-op and the scan degenerates to: fill a node with as many replicas as fit, then open
//! the next node. This module computes that closed-form directly rather than simulating
//! the general algorithm (cf. `scheduler/optimized.rs::FFDBinPacker` in the teacher crate,
//! which handles the heterogeneous case this one specializes).

use crate::error::{Result, ScorerError};

/// Number of identical-capacity worker nodes required to host `replicas` identical
/// replicas, each needing `cpu_per_replica`/`memory_per_replica`, on nodes with
/// `cpu_per_node`/`memory_per_node` capacity.
///
/// Returns `0` when `replicas == 0`. Returns [`ScorerError::BinPacking`] if a single
/// replica does not fit on a node — the caller is expected to have pre-validated this
/// (spec §4.3) since the feasibility evaluator rejects such allocations anyway, but the
/// packer itself must not loop indefinitely if invoked regardless.
pub fn nodes_required(
    replicas: u64,
    cpu_per_replica: f64,
    memory_per_replica: f64,
    cpu_per_node: f64,
    memory_per_node: f64,
) -> Result<u64> {
    if replicas == 0 {
        return Ok(0);
    }

    if cpu_per_replica > cpu_per_node || memory_per_replica > memory_per_node {
        return Err(ScorerError::bin_packing(format!(
            "a single replica ({cpu_per_replica} cpu, {memory_per_replica} memory) does not fit on a node ({cpu_per_node} cpu, {memory_per_node} memory)"
        )));
    }

    let by_cpu = if cpu_per_replica > 0.0 {
        (cpu_per_node / cpu_per_replica).floor() as u64
    } else {
        replicas
    };
    let by_memory = if memory_per_replica > 0.0 {
        (memory_per_node / memory_per_replica).floor() as u64
    } else {
        replicas
    };
    let per_node = by_cpu.min(by_memory).max(1);

    Ok(replicas.div_ceil(per_node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_replicas_needs_zero_nodes() {
        assert_eq!(nodes_required(0, 1000.0, 1.0, 4000.0, 8.0).unwrap(), 0);
    }

    #[test]
    fn scenario_3_bin_packing_fog() {
        // cpu_r=3000mc, mem_r=2GiB, node=4000mc/8GiB, r=4 -> 1 replica/node, 4 nodes
        let gib = 1024.0 * 1024.0 * 1024.0;
        let nodes = nodes_required(4, 3000.0, 2.0 * gib, 4000.0, 8.0 * gib).unwrap();
        assert_eq!(nodes, 4);
    }

    #[test]
    fn multiple_replicas_pack_per_node_when_they_fit() {
        // 4 replicas at 1000mc each on a 4000mc node -> exactly 1 node.
        let nodes = nodes_required(4, 1000.0, 1.0, 4000.0, 1_000_000.0).unwrap();
        assert_eq!(nodes, 1);
    }

    #[test]
    fn monotonicity_nodes_nondecreasing_in_replica_count() {
        let mut prev = 0;
        for r in 0..=20 {
            let nodes = nodes_required(r, 1000.0, 1.0, 4000.0, 1_000_000.0).unwrap();
            assert!(nodes >= prev);
            prev = nodes;
        }
    }

    #[test]
    fn nodes_never_exceed_replica_count_when_one_replica_fits() {
        for r in 0..=20 {
            let nodes = nodes_required(r, 1000.0, 1.0, 4000.0, 1_000_000.0).unwrap();
            assert!(nodes <= r);
        }
    }

    #[test]
    fn oversized_replica_is_an_error_not_an_infinite_loop() {
        let err = nodes_required(3, 5000.0, 1.0, 4000.0, 1_000_000.0).unwrap_err();
        assert!(matches!(err, ScorerError::BinPacking(_)));
    }

    #[test]
    fn oversized_memory_is_also_an_error() {
        let err = nodes_required(3, 1000.0, 10.0, 4000.0, 8.0).unwrap_err();
        assert!(matches!(err, ScorerError::BinPacking(_)));
    }
}
