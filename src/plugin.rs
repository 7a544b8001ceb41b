//! Orchestrator plugin facade: the `Score` / `NormalizeScore` scheduler contract
//!
//! ## Table of Contents
//! - **ScoreSpec**: the workload demand fields the host passes per decision
//! - **ClusterScoreResult**: one cluster's cached result, as the host hands it back
//! - **DistributionScorer**: the plugin facade itself
//!
//! Grounded on `runtime.rs`'s `Forge` struct (`DashMap` fields, `tracing` spans around
//! orchestration) and `scheduler/mod.rs`'s `Scheduler::schedule` filter-then-score shape,
//! adapted to the two-phase `Score`/`NormalizeScore` contract also seen in the
//! `rk8s-dev-rk8s` scheduler-plugin reference file.

use crate::ahp::AhpEvaluator;
use crate::cluster::{Cluster, ClusterMetrics};
use crate::config::ScorerConfig;
use crate::criteria::CriteriaProfile;
use crate::enumerate::enumerate_stream;
use crate::error::{Result, ScorerError};
use crate::evaluate::{evaluate_stream, WorkloadDemand};
use crate::publish::WeightPublisher;
use crate::select::select_best;
use crate::telemetry::ScorerMetrics;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

/// Score returned from `Score` whenever the plugin defers real scoring to
/// `NormalizeScore` (spec §6 `MinClusterScore`).
pub const MIN_CLUSTER_SCORE: i64 = i64::MIN;

/// The workload demand fields the host's spec carries (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct ScoreSpec {
    /// Requested replica count; `<= 0` means no scoring action is needed (SpecMissing).
    pub replicas: i32,
    /// CPU per replica in millicores, from `ReplicaRequirements.ResourceRequest["cpu"]`.
    pub cpu_per_replica: Option<f64>,
    /// Memory per replica in bytes, from `ReplicaRequirements.ResourceRequest["memory"]`.
    pub memory_per_replica: Option<f64>,
}

/// One cluster's entry in the score list the host passes to `NormalizeScore`.
#[derive(Debug, Clone)]
pub struct ClusterScoreResult {
    pub cluster: String,
}

/// Two-phase orchestrator plugin: `score` caches per-cluster metrics; `normalize_score`
/// drives enumeration through publication for the whole decision (spec §4.8).
pub struct DistributionScorer {
    config: ScorerConfig,
    profile: CriteriaProfile,
    ahp: Arc<dyn AhpEvaluator>,
    publisher: WeightPublisher,
    metrics: Option<Arc<ScorerMetrics>>,
    cache: DashMap<String, ClusterMetrics>,
}

impl DistributionScorer {
    /// Build a scorer from configuration, an AHP evaluator, and optional metrics.
    ///
    /// Resolves `config.criteria_profile` once, here, rather than per-decision: an
    /// unrecognized profile name is a configuration error surfaced at build time
    /// (spec §7 `Config`), not something that should fail the first `normalize_score`
    /// call it happens to be used in.
    pub fn new(
        config: ScorerConfig,
        ahp: Arc<dyn AhpEvaluator>,
        metrics: Option<Arc<ScorerMetrics>>,
    ) -> Result<Self> {
        let profile = CriteriaProfile::named(&config.criteria_profile).ok_or_else(|| {
            ScorerError::config(format!(
                "unrecognized criteria profile '{}'",
                config.criteria_profile
            ))
        })?;

        let publisher = WeightPublisher::new(config.updater_url.clone(), config.http_timeout)?
            .with_retry(config.retry.clone())
            .with_circuit_breaker(config.circuit_breaker.clone())
            .with_metrics(metrics.clone());

        Ok(Self {
            config,
            profile,
            ahp,
            publisher,
            metrics,
            cache: DashMap::new(),
        })
    }

    /// Called once per cluster per decision. Collects and caches `cluster`'s metrics;
    /// always returns [`MIN_CLUSTER_SCORE`] since real scoring happens in
    /// `normalize_score`. Safe under concurrent invocation across clusters of the same
    /// decision — the cache is a lock-free concurrent map and writes are idempotent per
    /// cluster (spec §5).
    ///
    /// `cancel` is honored with best effort: once fired, further cluster metrics for this
    /// decision are no longer cached, since `normalize_score` will reject the decision
    /// anyway (spec §5 "Suspension and cancellation").
    pub fn score(&self, cluster: &Cluster, cancel: &CancellationToken) -> i64 {
        if cancel.is_cancelled() {
            return MIN_CLUSTER_SCORE;
        }
        self.cache.insert(cluster.name.clone(), cluster.collect_metrics());
        MIN_CLUSTER_SCORE
    }

    /// Called once per decision after every `score` call has returned. Runs
    /// enumeration through publication for the clusters named in `scores`, in the
    /// order given (spec §5 "Ordering guarantees").
    ///
    /// Demand (`replicas`, `cpu_per_replica`, `memory_per_replica`) is derived here,
    /// from `spec`, rather than cached on `self` during `score` — this removes the
    /// cross-decision bleed-through the source system was prone to (spec §9).
    ///
    /// `cancel` is checked before any work starts and raced against the AHP call, the
    /// one step in this pipeline that can block on the network; the rest of the pipeline
    /// is pure computation over already-cached data and runs to completion once started
    /// (spec §5, §6).
    pub async fn normalize_score(
        &self,
        spec: &ScoreSpec,
        scores: &[ClusterScoreResult],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let decision_id = uuid::Uuid::new_v4();
        let span = info_span!(
            "normalize_score",
            decision_id = %decision_id,
            node_name = %self.config.node_name,
            cluster_count = scores.len(),
            replicas = spec.replicas,
        );

        async move {
            if cancel.is_cancelled() {
                self.record_decision("cancelled");
                return Err(ScorerError::cancelled("decision cancelled before normalize_score began"));
            }

            if spec.replicas <= 0 {
                info!("replicas <= 0, skipping decision (SpecMissing)");
                self.record_decision("spec_missing");
                return Ok(());
            }

            let (Some(cpu_per_replica), Some(memory_per_replica)) =
                (spec.cpu_per_replica, spec.memory_per_replica)
            else {
                info!("demand fields absent, skipping decision (SpecMissing)");
                self.record_decision("spec_missing");
                return Ok(());
            };

            let demand = WorkloadDemand {
                replicas: spec.replicas as u64,
                cpu_per_replica,
                memory_per_replica,
            };

            let cluster_order: Vec<String> = scores.iter().map(|s| s.cluster.clone()).collect();
            let metrics_by_cluster: HashMap<String, ClusterMetrics> = cluster_order
                .iter()
                .filter_map(|name| self.cache.get(name).map(|m| (name.clone(), m.clone())))
                .collect();

            let allocations =
                enumerate_stream(&cluster_order, demand.replicas, self.config.enumeration_ceiling)
                    .inspect_err(|_| self.record_decision("too_many_allocations"))?;

            let (feasible, enumerated) = evaluate_stream(allocations, &metrics_by_cluster, &demand);
            if let Some(metrics) = &self.metrics {
                metrics.record_enumeration(enumerated, feasible.len());
            }

            if feasible.is_empty() {
                self.record_decision("infeasible");
                return Err(ScorerError::infeasible(format!(
                    "no feasible allocation for {} replicas across {} clusters",
                    demand.replicas,
                    cluster_order.len()
                )));
            }

            let ahp_start = Instant::now();
            let ahp_result = self.ahp.evaluate(&feasible, &self.profile, cancel).await;
            let ahp_outcome = if ahp_result.is_ok() { "success" } else { "failure" };
            if let Some(metrics) = &self.metrics {
                metrics.record_ahp_call("active", ahp_outcome, ahp_start.elapsed().as_secs_f64());
            }
            let scores_by_id = ahp_result.inspect_err(|e| {
                if matches!(e, ScorerError::Cancelled(_)) {
                    self.record_decision("cancelled");
                } else {
                    self.record_decision("remote_evaluator");
                }
            })?;

            let decision = select_best(
                &feasible,
                &scores_by_id,
                self.config.zero_preservation_multiplier,
            )
            .inspect_err(|_| self.record_decision("no_winner"))?;

            info!(winner = %decision.winner_id, "selected distribution");
            self.publisher.publish(decision.weights);
            self.record_decision("success");

            Ok(())
        }
        .instrument(span)
        .await
    }

    fn record_decision(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_decision(outcome);
        } else {
            warn!(outcome, "decision outcome (metrics disabled)");
        }
    }
}
