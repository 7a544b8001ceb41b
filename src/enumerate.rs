//! Enumeration of non-negative integer compositions of N replicas over K clusters
//!
//! ## Table of Contents
//! - **Allocation**: a single replica-count vector plus its canonical identifier
//! - **enumerate_allocations**: eager, `Vec`-returning enumerator
//! - **enumerate_stream**: lazy `Iterator`-returning enumerator, for large `(N, K)`
//! - **allocation_count**: closed-form composition count, used for the resource-bound check

use crate::error::{Result, ScorerError};
use std::collections::HashMap;

/// An assignment of non-negative replica counts to clusters, summing to the
/// workload's requested replica count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Cluster names in enumeration order (matches the order presented to the enumerator)
    pub cluster_order: Vec<String>,
    /// Replica count per cluster, same order as `cluster_order`
    pub counts: Vec<u64>,
}

impl Allocation {
    /// Canonical identifier formed from the replica counts in the fixed cluster ordering,
    /// e.g. `"(2,0,1)"`.
    pub fn id(&self) -> String {
        let mut s = String::with_capacity(self.counts.len() * 3 + 2);
        s.push('(');
        for (i, n) in self.counts.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            s.push_str(&n.to_string());
        }
        s.push(')');
        s
    }

    /// Replica count for a given cluster name, or `0` if the cluster is not part of
    /// this allocation's ordering.
    pub fn count_for(&self, cluster: &str) -> u64 {
        self.cluster_order
            .iter()
            .position(|c| c == cluster)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// View the allocation as a `cluster_name -> replica_count` map.
    pub fn as_map(&self) -> HashMap<String, u64> {
        self.cluster_order
            .iter()
            .cloned()
            .zip(self.counts.iter().copied())
            .collect()
    }

    /// Does every cluster in this allocation have a non-zero replica count?
    pub fn all_nonzero(&self) -> bool {
        self.counts.iter().all(|&n| n > 0)
    }
}

/// Theoretical number of compositions of `n` into `k` non-negative parts: `C(n+k-1, k-1)`.
///
/// Used to reject pathologically large `(N, K)` pairs before enumeration begins
/// (spec §5 Resource bounds), rather than discovering the blowup mid-enumeration.
pub fn allocation_count(n: u64, k: usize) -> u128 {
    if k == 0 {
        return if n == 0 { 1 } else { 0 };
    }
    binomial(n as u128 + k as u128 - 1, k as u128 - 1)
}

fn binomial(n: u128, mut r: u128) -> u128 {
    if r > n - r {
        r = n - r;
    }
    let mut result: u128 = 1;
    for i in 0..r {
        result = result.saturating_mul(n - i) / (i + 1);
    }
    result
}

/// Produce every non-negative integer composition of `replicas` across `cluster_order`,
/// in stable lexicographic order on the count vector (spec §4.2), as a fully materialized
/// `Vec`. Suitable for small `(N, K)`; for parameters that may be large, prefer
/// [`enumerate_stream`], which yields the same sequence without holding it all in memory.
///
/// `replicas < 0` is not representable by the unsigned `replicas` parameter; callers
/// holding a signed demand value should treat a negative or missing replica count as
/// the `SpecMissing` case (spec §7) before calling this function. `replicas == 0` yields
/// the single all-zeros allocation. `cluster_order` must be non-empty.
///
/// Returns [`ScorerError::TooManyAllocations`] if the composition count exceeds `ceiling`.
pub fn enumerate_allocations(
    cluster_order: &[String],
    replicas: u64,
    ceiling: u64,
) -> Result<Vec<Allocation>> {
    let count = allocation_count(replicas, cluster_order.len());
    let stream = enumerate_stream(cluster_order, replicas, ceiling)?;
    let mut results = Vec::with_capacity(count.min(u128::from(u32::MAX)) as usize);
    results.extend(stream);
    Ok(results)
}

/// Produce every non-negative integer composition of `replicas` across `cluster_order`
/// lazily, in the same largest-first lexicographic order as [`enumerate_allocations`],
/// without ever materializing the full composition set (spec §4.2, §5 "Resource bounds").
///
/// Still rejects pathologically large `(N, K)` pairs up front via the same `ceiling` check
/// as the eager form, so a caller gets [`ScorerError::TooManyAllocations`] before doing any
/// work rather than discovering the blowup mid-iteration.
pub fn enumerate_stream(
    cluster_order: &[String],
    replicas: u64,
    ceiling: u64,
) -> Result<AllocationStream> {
    if cluster_order.is_empty() {
        return Ok(AllocationStream::empty());
    }

    let count = allocation_count(replicas, cluster_order.len());
    if count > ceiling as u128 {
        return Err(ScorerError::too_many_allocations(format!(
            "composing {replicas} replicas over {} clusters yields {count} allocations, exceeding the configured ceiling of {ceiling}",
            cluster_order.len()
        )));
    }

    Ok(AllocationStream::new(cluster_order.to_vec(), replicas))
}

/// Lazy, largest-first composition generator: an explicit, iterative re-statement of the
/// recursive "assign as many replicas as possible to the current slot, then recurse"
/// strategy, so one [`Allocation`] is produced per `next()` call instead of all of them
/// up front.
///
/// Internally mirrors a depth-first traversal over the first `k - 1` slots: `take[i]` holds
/// the candidate count the traversal is currently trying for slot `i`, counting down from
/// the slot's maximum toward zero; the final slot always takes whatever remains.
pub struct AllocationStream {
    cluster_order: Vec<String>,
    n: u64,
    counts: Vec<u64>,
    remaining: Vec<u64>,
    take: Vec<Option<u64>>,
    depth: usize,
    state: StreamState,
}

#[derive(PartialEq, Eq)]
enum StreamState {
    NotStarted,
    Active,
    Done,
}

impl AllocationStream {
    fn empty() -> Self {
        Self {
            cluster_order: Vec::new(),
            n: 0,
            counts: Vec::new(),
            remaining: Vec::new(),
            take: Vec::new(),
            depth: 0,
            state: StreamState::Done,
        }
    }

    fn new(cluster_order: Vec<String>, n: u64) -> Self {
        let k = cluster_order.len();
        Self {
            counts: vec![0u64; k],
            remaining: vec![0u64; k.saturating_sub(1)],
            take: vec![None; k.saturating_sub(1)],
            cluster_order,
            n,
            depth: 0,
            state: StreamState::NotStarted,
        }
    }

    /// Apply `self.take[self.depth]` and every frame below it, filling `self.counts` all
    /// the way to the last slot. Assumes `self.take[self.depth]` is already `Some`.
    fn descend(&mut self) {
        let k = self.cluster_order.len();
        loop {
            let t = self.take[self.depth].expect("descend requires a pending take at this depth");
            self.counts[self.depth] = t;
            let rem_next = self.remaining[self.depth] - t;
            if self.depth == k - 2 {
                self.counts[k - 1] = rem_next;
                return;
            }
            self.depth += 1;
            self.remaining[self.depth] = rem_next;
            self.take[self.depth] = Some(rem_next);
        }
    }

    /// Backtrack from the current depth to the shallowest frame with a take value still
    /// left to try, decrement it, and leave `self.depth` positioned there. Returns `false`
    /// once every frame is exhausted.
    fn advance(&mut self) -> bool {
        loop {
            match self.take[self.depth] {
                Some(0) | None => {
                    if self.depth == 0 {
                        return false;
                    }
                    self.depth -= 1;
                }
                Some(t) => {
                    self.take[self.depth] = Some(t - 1);
                    return true;
                }
            }
        }
    }

    fn emit(&self) -> Allocation {
        Allocation {
            cluster_order: self.cluster_order.clone(),
            counts: self.counts.clone(),
        }
    }
}

impl Iterator for AllocationStream {
    type Item = Allocation;

    fn next(&mut self) -> Option<Allocation> {
        let k = self.cluster_order.len();
        match self.state {
            StreamState::Done => None,
            StreamState::NotStarted if k == 0 => {
                self.state = StreamState::Done;
                None
            }
            StreamState::NotStarted if k == 1 => {
                self.counts[0] = self.n;
                self.state = StreamState::Done;
                Some(self.emit())
            }
            StreamState::NotStarted => {
                self.remaining[0] = self.n;
                self.take[0] = Some(self.n);
                self.depth = 0;
                self.descend();
                self.state = StreamState::Active;
                Some(self.emit())
            }
            StreamState::Active => {
                if k <= 1 {
                    self.state = StreamState::Done;
                    return None;
                }
                if self.advance() {
                    self.descend();
                    Some(self.emit())
                } else {
                    self.state = StreamState::Done;
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn scenario_1_enumeration_three_clusters_two_replicas() {
        let order = vec!["edge".to_string(), "fog".to_string(), "cloud".to_string()];
        let allocations = enumerate_allocations(&order, 2, 10_000).unwrap();
        let ids: Vec<String> = allocations.iter().map(Allocation::id).collect();
        assert_eq!(
            ids,
            vec!["(2,0,0)", "(1,1,0)", "(1,0,1)", "(0,2,0)", "(0,1,1)", "(0,0,2)"]
        );
    }

    #[test]
    fn every_allocation_sums_to_n() {
        let order = names(4);
        for allocation in enumerate_allocations(&order, 7, 10_000).unwrap() {
            assert_eq!(allocation.counts.iter().sum::<u64>(), 7);
        }
    }

    #[test]
    fn n_zero_yields_single_all_zero_allocation() {
        let order = names(3);
        let allocations = enumerate_allocations(&order, 0, 10_000).unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].counts, vec![0, 0, 0]);
    }

    #[test]
    fn k_one_yields_exactly_one_allocation() {
        let order = names(1);
        let allocations = enumerate_allocations(&order, 9, 10_000).unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].counts, vec![9]);
    }

    #[test]
    fn empty_cluster_order_yields_empty_sequence() {
        let allocations = enumerate_allocations(&[], 5, 10_000).unwrap();
        assert!(allocations.is_empty());
    }

    #[test]
    fn identifier_uniquely_determines_replica_vector() {
        let order = names(3);
        let allocations = enumerate_allocations(&order, 4, 10_000).unwrap();
        let mut seen = std::collections::HashSet::new();
        for allocation in &allocations {
            assert!(seen.insert(allocation.id()), "duplicate id {}", allocation.id());
        }
    }

    #[test]
    fn count_matches_closed_form() {
        let order = names(3);
        let allocations = enumerate_allocations(&order, 5, 10_000).unwrap();
        assert_eq!(allocations.len() as u128, allocation_count(5, 3));
        assert_eq!(allocations.len(), 21);
    }

    #[test]
    fn exceeding_ceiling_is_an_error() {
        let order = names(3);
        let err = enumerate_allocations(&order, 1000, 10).unwrap_err();
        assert!(matches!(err, ScorerError::TooManyAllocations(_)));
    }

    #[test]
    fn stream_matches_eager_enumeration_order() {
        let order = vec!["edge".to_string(), "fog".to_string(), "cloud".to_string()];
        let eager = enumerate_allocations(&order, 2, 10_000).unwrap();
        let streamed: Vec<Allocation> = enumerate_stream(&order, 2, 10_000).unwrap().collect();
        assert_eq!(eager, streamed);
    }

    #[test]
    fn stream_never_holds_more_than_one_allocation_at_a_time() {
        let order = names(4);
        let mut stream = enumerate_stream(&order, 6, 10_000).unwrap();
        let mut seen = std::collections::HashSet::new();
        let mut total = 0;
        while let Some(allocation) = stream.next() {
            assert_eq!(allocation.counts.iter().sum::<u64>(), 6);
            assert!(seen.insert(allocation.id()));
            total += 1;
        }
        assert_eq!(total as u128, allocation_count(6, 4));
    }

    #[test]
    fn stream_exceeding_ceiling_is_an_error() {
        let order = names(3);
        let err = enumerate_stream(&order, 1000, 10).unwrap_err();
        assert!(matches!(err, ScorerError::TooManyAllocations(_)));
    }

    #[test]
    fn stream_empty_cluster_order_yields_empty_sequence() {
        let allocations: Vec<Allocation> = enumerate_stream(&[], 5, 10_000).unwrap().collect();
        assert!(allocations.is_empty());
    }

    #[test]
    fn stream_k_one_yields_exactly_one_allocation() {
        let order = names(1);
        let allocations: Vec<Allocation> = enumerate_stream(&order, 9, 10_000).unwrap().collect();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].counts, vec![9]);
    }
}
