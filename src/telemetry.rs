//! Metrics and observability for the scorer
//!
//! ## Table of Contents
//! - **ScorerMetrics**: Prometheus registry and counters for one scoring decision

use crate::error::{Result, ScorerError};
use prometheus::{Counter, CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

/// Prometheus metrics tracking allocation enumeration, feasibility pruning, AHP
/// latency/outcome, and publish outcomes (SPEC_FULL §10.5).
pub struct ScorerMetrics {
    registry: Registry,

    pub allocations_enumerated: Counter,
    pub allocations_feasible: Counter,
    pub allocations_rejected: Counter,

    pub decisions_total: CounterVec,
    pub ahp_requests: CounterVec,
    pub ahp_latency: HistogramVec,

    pub publish_outcomes: CounterVec,
}

impl ScorerMetrics {
    /// Create a new metrics instance, registering every collector with a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let allocations_enumerated = Counter::new(
            "scorer_allocations_enumerated_total",
            "Total candidate allocations produced by the enumerator",
        )?;
        let allocations_feasible = Counter::new(
            "scorer_allocations_feasible_total",
            "Total allocations that passed feasibility checks",
        )?;
        let allocations_rejected = Counter::new(
            "scorer_allocations_rejected_total",
            "Total allocations pruned by feasibility checks",
        )?;

        let decisions_total = CounterVec::new(
            Opts::new("scorer_decisions_total", "Total scheduling decisions by outcome"),
            &["outcome"],
        )?;

        let ahp_requests = CounterVec::new(
            Opts::new("scorer_ahp_requests_total", "Total AHP evaluator calls by outcome"),
            &["outcome"],
        )?;
        let ahp_latency = HistogramVec::new(
            HistogramOpts::new("scorer_ahp_latency_seconds", "AHP evaluator call latency")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["evaluator"],
        )?;

        let publish_outcomes = CounterVec::new(
            Opts::new("scorer_publish_outcomes_total", "Total weight publish attempts by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(allocations_enumerated.clone()))?;
        registry.register(Box::new(allocations_feasible.clone()))?;
        registry.register(Box::new(allocations_rejected.clone()))?;
        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(ahp_requests.clone()))?;
        registry.register(Box::new(ahp_latency.clone()))?;
        registry.register(Box::new(publish_outcomes.clone()))?;

        Ok(Self {
            registry,
            allocations_enumerated,
            allocations_feasible,
            allocations_rejected,
            decisions_total,
            ahp_requests,
            ahp_latency,
            publish_outcomes,
        })
    }

    /// Get the Prometheus registry for scraping.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the enumerator's output size and how many allocations survived feasibility.
    pub fn record_enumeration(&self, enumerated: usize, feasible: usize) {
        self.allocations_enumerated.inc_by(enumerated as f64);
        self.allocations_feasible.inc_by(feasible as f64);
        self.allocations_rejected.inc_by((enumerated - feasible) as f64);
    }

    /// Record a decision's terminal outcome (`success`, `infeasible`, `remote_evaluator`,
    /// `no_winner`, `spec_missing`, ...).
    pub fn record_decision(&self, outcome: &str) {
        self.decisions_total.with_label_values(&[outcome]).inc();
    }

    /// Record one AHP evaluator call.
    pub fn record_ahp_call(&self, evaluator: &str, outcome: &str, latency_secs: f64) {
        self.ahp_requests.with_label_values(&[outcome]).inc();
        self.ahp_latency.with_label_values(&[evaluator]).observe(latency_secs);
    }

    /// Record a weight publish attempt's outcome (`success` or `failure`), per cluster.
    pub fn record_publish(&self, outcome: &str) {
        self.publish_outcomes.with_label_values(&[outcome]).inc();
    }

    /// Render all registered metrics in Prometheus text exposition format.
    pub fn gather_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| ScorerError::metrics(format!("encode error: {e}")))?;
        String::from_utf8(buffer).map_err(|e| ScorerError::metrics(format!("utf8 error: {e}")))
    }
}
