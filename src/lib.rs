//! # Replica Distribution Scorer
//!
//! A multi-criteria scheduler plugin that decides how a workload's replicas
//! should be distributed across a set of candidate clusters.
//!
//! ## Features
//!
//! - **Feasibility-aware enumeration**: every non-negative replica split across
//!   candidate clusters, pruned by per-cluster CPU/memory/node-count limits
//! - **Multi-criteria evaluation**: power, cost, utilization, proportionality, and
//!   weighted latency computed per candidate distribution
//! - **AHP-backed ranking**: a remote Analytic Hierarchy Process evaluator, with an
//!   embedded ratio-scale fallback when the remote service is unavailable
//! - **Zero-replica preservation**: a winning distribution that drops a cluster to
//!   zero replicas still publishes a representable (if minimal) weight for it
//! - **Metrics**: Prometheus-compatible metrics export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use distribution_scorer::{ahp::RemoteAhpClient, config::ScorerConfig, plugin::DistributionScorer};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> distribution_scorer::Result<()> {
//!     let config = ScorerConfig::default();
//!     let ahp = RemoteAhpClient::new(config.ahp_url.clone(), config.http_timeout)?
//!         .with_retry(config.retry.clone())
//!         .with_circuit_breaker(config.circuit_breaker.clone());
//!     let scorer = DistributionScorer::new(config, Arc::new(ahp), None)?;
//!     let cancel = CancellationToken::new();
//!     // scorer.score(&cluster, &cancel) is called once per cluster by the host;
//!     // scorer.normalize_score(&spec, &scores, &cancel).await drives the decision.
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ahp;
pub mod binpack;
pub mod cluster;
pub mod config;
pub mod criteria;
pub mod enumerate;
pub mod error;
pub mod evaluate;
pub mod plugin;
pub mod publish;
pub mod resilience;
pub mod select;
pub mod telemetry;

// Re-exports for ergonomic API
pub use ahp::{AhpEvaluator, LocalAhpEvaluator, RemoteAhpClient};
pub use cluster::{Cluster, ClusterMetrics};
pub use config::{ScorerConfig, ScorerConfigBuilder};
pub use criteria::{Criterion, CriteriaProfile};
pub use error::{Result, ScorerError};
pub use plugin::{DistributionScorer, ScoreSpec, MIN_CLUSTER_SCORE};
pub use select::WeightDecision;
pub use telemetry::ScorerMetrics;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ahp::{AhpEvaluator, LocalAhpEvaluator, RemoteAhpClient};
    pub use crate::cluster::Cluster;
    pub use crate::config::{ScorerConfig, ScorerConfigBuilder};
    pub use crate::criteria::CriteriaProfile;
    pub use crate::error::Result;
    pub use crate::plugin::{DistributionScorer, ScoreSpec};
}
