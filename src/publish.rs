//! Fire-and-forget weight publication to the downstream updater sink
//!
//! ## Table of Contents
//! - **WeightPublisher**: HTTP client that posts per-cluster weights on a detached task
//!
//! Grounded on `runtime.rs`'s detached-task shutdown/background patterns and
//! `nomad.rs`'s plain-POST client shape, combined with `futures::future::join_all` to
//! fan the per-cluster posts out concurrently within the one detached task (spec §4.7).

use crate::error::ScorerError;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use crate::resilience::retry::{RetryConfig, RetryPolicy};
use crate::telemetry::ScorerMetrics;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
struct WeightPayload<'a> {
    cluster: &'a str,
    weight: u64,
}

/// Posts `{cluster, weight}` to the updater sink for each cluster in a winning
/// distribution. Never surfaces failures to the scheduling decision (spec §4.7,
/// §7 `PublishFailed`) — they are logged and otherwise swallowed.
#[derive(Clone)]
pub struct WeightPublisher {
    client: Client,
    url: String,
    retry: RetryConfig,
    breaker: Arc<CircuitBreaker>,
    metrics: Option<Arc<ScorerMetrics>>,
}

impl WeightPublisher {
    /// Build a publisher targeting `url`, with the given HTTP timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> crate::error::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScorerError::config(format!("failed to build publisher HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            retry: RetryConfig::default().max_retries(2),
            breaker: Arc::new(CircuitBreaker::new("weight-publisher", CircuitBreakerConfig::default())),
            metrics: None,
        })
    }

    /// Override the retry policy (default: 2 retries, exponential backoff with jitter).
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Override the circuit breaker config.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = Arc::new(CircuitBreaker::new("weight-publisher", config));
        self
    }

    /// Attach a metrics sink; each publish attempt's outcome is recorded against it.
    pub fn with_metrics(mut self, metrics: Option<Arc<ScorerMetrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Launch publication of every `(cluster, weight)` pair on a detached task that
    /// outlives the scheduling decision (spec §5 "Suspension and cancellation").
    pub fn publish(&self, weights: HashMap<String, u64>) {
        let publisher = self.clone();
        tokio::spawn(async move {
            let futures = weights
                .iter()
                .map(|(cluster, &weight)| publisher.publish_one(cluster, weight));
            let results = futures::future::join_all(futures).await;

            for ((cluster, _), result) in weights.iter().zip(results) {
                match result {
                    Ok(()) => {
                        if let Some(metrics) = &publisher.metrics {
                            metrics.record_publish("success");
                        }
                    }
                    Err(e) => {
                        warn!(cluster = %cluster, error = %e, "failed to publish cluster weight");
                        if let Some(metrics) = &publisher.metrics {
                            metrics.record_publish("failure");
                        }
                    }
                }
            }
        });
    }

    async fn publish_one(&self, cluster: &str, weight: u64) -> crate::error::Result<()> {
        let retry = RetryPolicy::new(self.retry.clone());
        let payload = WeightPayload { cluster, weight };

        retry
            .execute(|| async {
                self.breaker
                    .call(self.post(&payload))
                    .await
                    .map_err(|e| match e {
                        CircuitBreakerError::Open => {
                            ScorerError::remote_evaluator("circuit breaker open for weight publisher")
                        }
                        CircuitBreakerError::ServiceError(inner) => inner,
                    })
            })
            .await
    }

    async fn post(&self, payload: &WeightPayload<'_>) -> crate::error::Result<()> {
        self.client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ScorerError::remote_evaluator(e.to_string()))?
            .error_for_status()
            .map_err(|e| ScorerError::remote_evaluator(e.to_string()))?;
        Ok(())
    }
}
