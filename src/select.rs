//! Best-distribution selection and the zero-replica preservation rule
//!
//! ## Table of Contents
//! - **WeightDecision**: winning allocation id plus final per-cluster weights
//! - **select_best**: argmax over AHP scores with enumeration-order tie-break

use crate::enumerate::Allocation;
use crate::error::{Result, ScorerError};
use crate::evaluate::AllocationMetrics;
use std::collections::HashMap;

/// Multiplier applied to non-zero clusters when the winning allocation assigns zero
/// replicas to at least one participant (spec §4.6).
pub const ZERO_PRESERVATION_MULTIPLIER: u64 = 1000;

/// The outcome of selection: which allocation won and the weights to publish.
#[derive(Debug, Clone)]
pub struct WeightDecision {
    /// Canonical id of the winning allocation
    pub winner_id: String,
    /// Final per-cluster weights, after the zero-replica preservation transform
    pub weights: HashMap<String, u64>,
}

/// Pick `argmax_{d in candidates} scores[d.id]`, breaking ties by enumeration order
/// (the order `candidates` is given in), then apply the zero-replica preservation rule
/// using `multiplier` (spec §4.6, §6 "Configuration surface").
///
/// Returns [`ScorerError::NoWinner`] if `candidates` is empty or no candidate has a
/// score in `scores` (spec §4.6, §7).
pub fn select_best(
    candidates: &[(Allocation, AllocationMetrics)],
    scores: &HashMap<String, i64>,
    multiplier: u64,
) -> Result<WeightDecision> {
    let mut best: Option<(&Allocation, i64)> = None;

    for (allocation, _) in candidates {
        let Some(&score) = scores.get(&allocation.id()) else {
            continue;
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((allocation, score)),
        }
    }

    let (winner, _) = best.ok_or_else(|| {
        ScorerError::no_winner("AHP evaluator returned no score for any feasible allocation")
    })?;

    Ok(WeightDecision {
        winner_id: winner.id(),
        weights: preserve_zero_replicas(winner, multiplier),
    })
}

fn preserve_zero_replicas(winner: &Allocation, multiplier: u64) -> HashMap<String, u64> {
    if winner.all_nonzero() {
        return winner.as_map();
    }

    winner
        .cluster_order
        .iter()
        .zip(winner.counts.iter())
        .map(|(cluster, &count)| {
            let weight = if count > 0 { count * multiplier } else { 1 };
            (cluster.clone(), weight)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> AllocationMetrics {
        AllocationMetrics {
            power: 0.0,
            cost: 0.0,
            utilization: 0.0,
            proportionality: 0.0,
            weighted_latency: 0.0,
            worker_nodes: HashMap::new(),
        }
    }

    fn alloc(order: &[&str], counts: &[u64]) -> Allocation {
        Allocation {
            cluster_order: order.iter().map(|s| s.to_string()).collect(),
            counts: counts.to_vec(),
        }
    }

    #[test]
    fn scenario_6_zero_preservation_with_a_zero_cluster() {
        let winner = alloc(&["edge", "fog", "cloud"], &[0, 3, 2]);
        let weights = preserve_zero_replicas(&winner, ZERO_PRESERVATION_MULTIPLIER);
        assert_eq!(weights["edge"], 1);
        assert_eq!(weights["fog"], 3000);
        assert_eq!(weights["cloud"], 2000);
    }

    #[test]
    fn scenario_6_weights_equal_counts_when_all_nonzero() {
        let winner = alloc(&["edge", "fog", "cloud"], &[1, 2, 2]);
        let weights = preserve_zero_replicas(&winner, ZERO_PRESERVATION_MULTIPLIER);
        assert_eq!(weights["edge"], 1);
        assert_eq!(weights["fog"], 2);
        assert_eq!(weights["cloud"], 2);
    }

    #[test]
    fn custom_multiplier_is_honored() {
        let winner = alloc(&["edge", "fog"], &[0, 2]);
        let weights = preserve_zero_replicas(&winner, 50);
        assert_eq!(weights["edge"], 1);
        assert_eq!(weights["fog"], 100);
    }

    #[test]
    fn selects_highest_score() {
        let candidates = vec![
            (alloc(&["a", "b"], &[2, 0]), metrics()),
            (alloc(&["a", "b"], &[1, 1]), metrics()),
            (alloc(&["a", "b"], &[0, 2]), metrics()),
        ];
        let mut scores = HashMap::new();
        scores.insert("(2,0)".to_string(), 10);
        scores.insert("(1,1)".to_string(), 30);
        scores.insert("(0,2)".to_string(), 20);

        let decision = select_best(&candidates, &scores, ZERO_PRESERVATION_MULTIPLIER).unwrap();
        assert_eq!(decision.winner_id, "(1,1)");
    }

    #[test]
    fn ties_resolve_to_first_in_enumeration_order() {
        let candidates = vec![
            (alloc(&["a", "b"], &[2, 0]), metrics()),
            (alloc(&["a", "b"], &[1, 1]), metrics()),
            (alloc(&["a", "b"], &[0, 2]), metrics()),
        ];
        let mut scores = HashMap::new();
        scores.insert("(2,0)".to_string(), 50);
        scores.insert("(1,1)".to_string(), 50);
        scores.insert("(0,2)".to_string(), 50);

        let decision = select_best(&candidates, &scores, ZERO_PRESERVATION_MULTIPLIER).unwrap();
        assert_eq!(decision.winner_id, "(2,0)");
    }

    #[test]
    fn empty_candidates_is_no_winner() {
        let scores = HashMap::new();
        let err = select_best(&[], &scores, ZERO_PRESERVATION_MULTIPLIER).unwrap_err();
        assert!(matches!(err, ScorerError::NoWinner(_)));
    }

    #[test]
    fn empty_scores_is_no_winner() {
        let candidates = vec![(alloc(&["a", "b"], &[2, 0]), metrics())];
        let err = select_best(&candidates, &HashMap::new(), ZERO_PRESERVATION_MULTIPLIER).unwrap_err();
        assert!(matches!(err, ScorerError::NoWinner(_)));
    }
}
