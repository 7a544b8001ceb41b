//! Standalone demo binary: runs one scoring decision against a handful of
//! reference clusters and prints the resulting weights.
//!
//! Initializes the `tracing-subscriber` `EnvFilter` the way the teacher crate's
//! own binaries do, reading `RUST_LOG` (defaulting to `info`).

use distribution_scorer::ahp::{LocalAhpEvaluator, RemoteAhpClient};
use distribution_scorer::cluster::Cluster;
use distribution_scorer::config::ScorerConfig;
use distribution_scorer::plugin::{ClusterScoreResult, DistributionScorer, ScoreSpec};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

fn reference_clusters() -> Vec<Cluster> {
    vec![
        Cluster::new("edge")
            .with_attribute("worker_cpu_capacity", "2000")
            .with_attribute("worker_memory_capacity", "4294967296")
            .with_attribute("max_worker_nodes", "4")
            .with_attribute("control_plane_power", "40")
            .with_attribute("control_plane_cost", "60")
            .with_attribute("worker_power", "40")
            .with_attribute("worker_cost", "60")
            .with_attribute("latency", "10"),
        Cluster::new("fog")
            .with_attribute("worker_cpu_capacity", "4000")
            .with_attribute("worker_memory_capacity", "8589934592")
            .with_attribute("max_worker_nodes", "8")
            .with_attribute("control_plane_power", "30")
            .with_attribute("control_plane_cost", "45")
            .with_attribute("worker_power", "70")
            .with_attribute("worker_cost", "100")
            .with_attribute("latency", "25"),
        Cluster::new("cloud")
            .with_attribute("worker_cpu_capacity", "8000")
            .with_attribute("worker_memory_capacity", "17179869184")
            .with_attribute("max_worker_nodes", "16")
            .with_attribute("control_plane_power", "15")
            .with_attribute("control_plane_cost", "30")
            .with_attribute("worker_power", "100")
            .with_attribute("worker_cost", "140")
            .with_attribute("latency", "50"),
    ]
}

#[tokio::main]
async fn main() -> distribution_scorer::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ScorerConfig::from_env()?;
    let ahp: Arc<dyn distribution_scorer::ahp::AhpEvaluator> = if config.use_local_ahp {
        Arc::new(LocalAhpEvaluator::new())
    } else {
        Arc::new(
            RemoteAhpClient::new(config.ahp_url.clone(), config.http_timeout)?
                .with_retry(config.retry.clone())
                .with_circuit_breaker(config.circuit_breaker.clone()),
        )
    };

    let scorer = DistributionScorer::new(config, ahp, None)?;
    let clusters = reference_clusters();
    let cancel = CancellationToken::new();

    let scores: Vec<ClusterScoreResult> = clusters
        .iter()
        .map(|cluster| {
            scorer.score(cluster, &cancel);
            ClusterScoreResult { cluster: cluster.name.clone() }
        })
        .collect();

    let spec = ScoreSpec {
        replicas: 5,
        cpu_per_replica: Some(500.0),
        memory_per_replica: Some(1024.0 * 1024.0 * 1024.0),
    };

    scorer.normalize_score(&spec, &scores, &cancel).await
}
