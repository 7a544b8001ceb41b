//! Criteria profiles: named weight presets used by the AHP evaluator
//!
//! ## Table of Contents
//! - **Criterion**: the five recognized criterion names
//! - **CriteriaWeight**: direction + weight for one criterion
//! - **CriteriaProfile**: the full `criterion -> weight` mapping, with named presets

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five criteria the evaluator scores allocations on (spec §3 Criteria Profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    /// Total electrical power draw (lower is better)
    Power,
    /// Total monetary cost (lower is better)
    Cost,
    /// Replica-weighted packing utilization (higher is better)
    Utilization,
    /// Population stddev of normalized load ratios (lower is better)
    Proportionality,
    /// Replica-weighted network latency (lower is better)
    WeightedLatency,
}

impl Criterion {
    /// All criteria, in a stable order used for default profile construction.
    pub const ALL: [Criterion; 5] = [
        Criterion::Power,
        Criterion::Cost,
        Criterion::Utilization,
        Criterion::Proportionality,
        Criterion::WeightedLatency,
    ];

    /// Canonical name used as the map key in the AHP payload and in profile names.
    ///
    /// This crate emits the single canonical `proportionality` name; the source
    /// system's historical `load_balance_std_dev` alias (spec §9) is not reproduced.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Criterion::Power => "power",
            Criterion::Cost => "cost",
            Criterion::Utilization => "utilization",
            Criterion::Proportionality => "proportionality",
            Criterion::WeightedLatency => "weighted_latency",
        }
    }

    /// Whether a higher value of this criterion is preferable.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Criterion::Utilization)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Direction and weight for one criterion in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaWeight {
    /// Whether higher values of this criterion are preferable
    pub higher_is_better: bool,
    /// Relative weight, by convention summing to 1 across a profile
    pub weight: f64,
}

/// A named weight profile over all five criteria.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriteriaProfile {
    /// canonical criterion name -> weight
    pub weights: HashMap<String, CriteriaWeight>,
}

impl CriteriaProfile {
    /// Build a profile giving every criterion the same weight (`0.20` each).
    pub fn balance() -> Self {
        Self::uniform(0.20)
    }

    /// Build a profile favoring one criterion at the given target weight, distributing
    /// the remainder evenly across the other four. Mirrors the `<criterion>30`/
    /// `<criterion>50` presets from spec §3.
    pub fn favoring(target: Criterion, target_weight: f64) -> Self {
        let remainder = (1.0 - target_weight) / (Criterion::ALL.len() - 1) as f64;
        let mut weights = HashMap::new();
        for criterion in Criterion::ALL {
            let weight = if criterion == target { target_weight } else { remainder };
            weights.insert(
                criterion.canonical_name().to_string(),
                CriteriaWeight {
                    higher_is_better: criterion.higher_is_better(),
                    weight,
                },
            );
        }
        Self { weights }
    }

    fn uniform(weight: f64) -> Self {
        let mut weights = HashMap::new();
        for criterion in Criterion::ALL {
            weights.insert(
                criterion.canonical_name().to_string(),
                CriteriaWeight {
                    higher_is_better: criterion.higher_is_better(),
                    weight,
                },
            );
        }
        Self { weights }
    }

    /// Resolve a profile by name: `"balance"`, or `"<criterion>30"`/`"<criterion>50"`
    /// for each of `power`, `cost`, `utilization`, `proportionality`, `weighted_latency`.
    pub fn named(name: &str) -> Option<Self> {
        if name == "balance" {
            return Some(Self::balance());
        }
        for criterion in Criterion::ALL {
            let base = criterion.canonical_name();
            if let Some(suffix) = name.strip_prefix(base) {
                match suffix {
                    "30" => return Some(Self::favoring(criterion, 0.30)),
                    "50" => return Some(Self::favoring(criterion, 0.50)),
                    _ => {}
                }
            }
        }
        None
    }

    /// Weight for a given criterion, or `0.0` if the profile does not mention it.
    pub fn weight_of(&self, criterion: Criterion) -> f64 {
        self.weights
            .get(criterion.canonical_name())
            .map(|w| w.weight)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_profile_weighs_all_criteria_equally() {
        let profile = CriteriaProfile::balance();
        for criterion in Criterion::ALL {
            assert_eq!(profile.weight_of(criterion), 0.20);
        }
    }

    #[test]
    fn favoring_profile_sums_to_one() {
        let profile = CriteriaProfile::favoring(Criterion::Cost, 0.30);
        let sum: f64 = Criterion::ALL.iter().map(|&c| profile.weight_of(c)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(profile.weight_of(Criterion::Cost), 0.30);
        assert!((profile.weight_of(Criterion::Power) - 0.175).abs() < 1e-9);
    }

    #[test]
    fn named_resolves_all_presets() {
        assert!(CriteriaProfile::named("balance").is_some());
        assert!(CriteriaProfile::named("power30").is_some());
        assert!(CriteriaProfile::named("utilization50").is_some());
        assert!(CriteriaProfile::named("nonsense").is_none());
    }

    #[test]
    fn utilization_is_the_only_higher_is_better_criterion() {
        for criterion in Criterion::ALL {
            assert_eq!(criterion.higher_is_better(), criterion == Criterion::Utilization);
        }
    }

    #[test]
    fn canonical_proportionality_name_is_used() {
        assert_eq!(Criterion::Proportionality.canonical_name(), "proportionality");
    }
}
