//! Analytic Hierarchy Process scoring: remote delegate and embedded fallback
//!
//! ## Table of Contents
//! - **AhpEvaluator**: the trait both implementations satisfy
//! - **RemoteAhpClient**: HTTP client wrapped in retry + circuit breaker
//! - **LocalAhpEvaluator**: embedded ratio-scale aggregator
//! - wire types matching the evaluator's JSON contract

use crate::criteria::{Criterion, CriteriaProfile};
use crate::enumerate::Allocation;
use crate::error::{Result, ScorerError};
use crate::evaluate::AllocationMetrics;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use crate::resilience::retry::{RetryConfig, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One candidate distribution as sent to the evaluator (spec §6).
#[derive(Debug, Clone, Serialize)]
pub struct DistributionPayload {
    pub id: String,
    pub allocation: HashMap<String, u64>,
    pub metrics: HashMap<String, f64>,
}

/// One criterion entry as sent to the evaluator.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionPayload {
    pub higher_is_better: bool,
    pub weight: f64,
}

/// Request body for `POST <ahp_url>`.
#[derive(Debug, Clone, Serialize)]
pub struct AhpRequest {
    pub distributions: Vec<DistributionPayload>,
    pub criteria: HashMap<String, CriterionPayload>,
}

/// One scored distribution as returned by the evaluator.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEntry {
    pub id: String,
    pub score: i64,
}

/// Response body for a successful evaluator call.
#[derive(Debug, Clone, Deserialize)]
pub struct AhpResponse {
    pub scores: Vec<ScoreEntry>,
}

fn build_request(
    candidates: &[(Allocation, AllocationMetrics)],
    profile: &CriteriaProfile,
) -> AhpRequest {
    let distributions = candidates
        .iter()
        .map(|(allocation, metrics)| DistributionPayload {
            id: allocation.id(),
            allocation: allocation.as_map(),
            metrics: metrics.to_metric_map(),
        })
        .collect();

    let criteria = Criterion::ALL
        .iter()
        .map(|criterion| {
            (
                criterion.canonical_name().to_string(),
                CriterionPayload {
                    higher_is_better: criterion.higher_is_better(),
                    weight: profile.weight_of(*criterion),
                },
            )
        })
        .collect();

    AhpRequest { distributions, criteria }
}

/// Ranks a set of feasible candidate allocations against a criteria profile, returning
/// `id -> score` (spec §4.5).
///
/// `cancel` must be honored with best effort: an already-cancelled token should short
/// circuit before any work starts, and a token that fires mid-call should abort the
/// in-flight evaluation and surface [`ScorerError::Cancelled`] rather than waiting for it
/// to finish (spec §5 "Suspension and cancellation").
#[async_trait]
pub trait AhpEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        candidates: &[(Allocation, AllocationMetrics)],
        profile: &CriteriaProfile,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, i64>>;
}

/// HTTP client for the remote AHP evaluator, wrapped in the crate's retry policy and
/// circuit breaker (mirrors `NomadClient`'s plain-client shape, hardened the way
/// `resilience::CircuitBreaker`/`RetryPolicy` harden other outbound calls).
pub struct RemoteAhpClient {
    client: Client,
    url: String,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl RemoteAhpClient {
    /// Build a client targeting `url`, with the given HTTP timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScorerError::config(format!("failed to build AHP HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            retry: RetryPolicy::new(RetryConfig::default().max_retries(2)),
            breaker: CircuitBreaker::new("ahp-evaluator", CircuitBreakerConfig::default()),
        })
    }

    /// Override the retry policy (default: 2 retries, exponential backoff with jitter).
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = RetryPolicy::new(config);
        self
    }

    /// Override the circuit breaker config.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = CircuitBreaker::new("ahp-evaluator", config);
        self
    }

    async fn post(&self, request: &AhpRequest) -> Result<AhpResponse> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ScorerError::remote_evaluator(e.to_string()))?
            .error_for_status()
            .map_err(|e| ScorerError::remote_evaluator(e.to_string()))?;

        resp.json()
            .await
            .map_err(|e| ScorerError::remote_evaluator(format!("undecodable AHP response: {e}")))
    }
}

#[async_trait]
impl AhpEvaluator for RemoteAhpClient {
    async fn evaluate(
        &self,
        candidates: &[(Allocation, AllocationMetrics)],
        profile: &CriteriaProfile,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, i64>> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }
        if cancel.is_cancelled() {
            return Err(ScorerError::cancelled("AHP evaluation cancelled before dispatch"));
        }

        let request = build_request(candidates, profile);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ScorerError::cancelled("AHP evaluation cancelled"));
            }
            result = self.retry.execute(|| async {
                self.breaker
                    .call(self.post(&request))
                    .await
                    .map_err(|e| match e {
                        CircuitBreakerError::Open => {
                            ScorerError::remote_evaluator("circuit breaker open for AHP evaluator")
                        }
                        CircuitBreakerError::ServiceError(inner) => inner,
                    })
            }) => result?,
        };

        debug!(count = response.scores.len(), "AHP evaluator returned scores");

        Ok(response
            .scores
            .into_iter()
            .map(|entry| (entry.id, entry.score))
            .collect())
    }
}

/// Embedded ratio-scale aggregator: normalizes each criterion across the candidate set
/// and combines with the profile's weights, eliminating the remote AHP dependency and
/// its failure mode (spec §9 "Remote AHP dependency"). Total, deterministic, and
/// monotone in favored-direction criterion improvements, per the spec's requirement for
/// any replacement scoring function.
#[derive(Debug, Clone, Default)]
pub struct LocalAhpEvaluator;

impl LocalAhpEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn normalize(values: &[f64], higher_is_better: bool) -> Vec<f64> {
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if (max - min).abs() < f64::EPSILON {
            return vec![1.0; values.len()];
        }

        values
            .iter()
            .map(|&v| {
                if higher_is_better {
                    (v - min) / (max - min)
                } else {
                    (max - v) / (max - min)
                }
            })
            .collect()
    }
}

#[async_trait]
impl AhpEvaluator for LocalAhpEvaluator {
    async fn evaluate(
        &self,
        candidates: &[(Allocation, AllocationMetrics)],
        profile: &CriteriaProfile,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, i64>> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }
        if cancel.is_cancelled() {
            return Err(ScorerError::cancelled("AHP evaluation cancelled before dispatch"));
        }

        let mut totals = vec![0.0f64; candidates.len()];

        for criterion in Criterion::ALL {
            let raw: Vec<f64> = candidates
                .iter()
                .map(|(_, metrics)| criterion_value(criterion, metrics))
                .collect();
            let normalized = Self::normalize(&raw, criterion.higher_is_better());
            let weight = profile.weight_of(criterion);
            for (total, n) in totals.iter_mut().zip(normalized.iter()) {
                *total += n * weight;
            }
        }

        warn!("using embedded ratio-scale AHP fallback, not the remote evaluator");

        Ok(candidates
            .iter()
            .zip(totals.iter())
            .map(|((allocation, _), total)| (allocation.id(), (total * 10_000.0).round() as i64))
            .collect())
    }
}

fn criterion_value(criterion: Criterion, metrics: &AllocationMetrics) -> f64 {
    match criterion {
        Criterion::Power => metrics.power,
        Criterion::Cost => metrics.cost,
        Criterion::Utilization => metrics.utilization,
        Criterion::Proportionality => metrics.proportionality,
        Criterion::WeightedLatency => metrics.weighted_latency,
    }
}
