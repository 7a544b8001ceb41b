//! Distribution Scoring Benchmarks
//!
//! Benchmarks the three stages that scale with replica count and cluster count:
//! - Allocation enumeration (combinatorial in N replicas / K clusters)
//! - Bin packing (closed-form, should stay flat)
//! - Feasibility + metric evaluation over an enumerated candidate set

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use distribution_scorer::binpack::nodes_required;
use distribution_scorer::cluster::Cluster;
use distribution_scorer::enumerate::enumerate_allocations;
use distribution_scorer::evaluate::{evaluate_all, WorkloadDemand};
use std::collections::HashMap;

fn cluster_order(k: usize) -> Vec<String> {
    (0..k).map(|i| format!("cluster-{i}")).collect()
}

fn reference_metrics(k: usize) -> HashMap<String, distribution_scorer::cluster::ClusterMetrics> {
    cluster_order(k)
        .iter()
        .map(|name| {
            let cluster = Cluster::new(name)
                .with_attribute("worker_cpu_capacity", "8000")
                .with_attribute("worker_memory_capacity", "17179869184")
                .with_attribute("max_worker_nodes", "64")
                .with_attribute("control_plane_power", "40")
                .with_attribute("control_plane_cost", "60")
                .with_attribute("worker_power", "35")
                .with_attribute("worker_cost", "55")
                .with_attribute("latency", "12");
            (name.clone(), cluster.collect_metrics())
        })
        .collect()
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");

    for &(replicas, clusters) in &[(10u64, 3usize), (20, 4), (12, 5)] {
        let order = cluster_order(clusters);
        group.bench_with_input(
            BenchmarkId::new("enumerate_allocations", format!("{replicas}r-{clusters}k")),
            &(replicas, clusters),
            |b, _| {
                b.iter(|| black_box(enumerate_allocations(&order, replicas, 10_000_000).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_bin_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin_packing");

    for &replicas in &[10u64, 1_000, 1_000_000] {
        group.bench_with_input(
            BenchmarkId::new("nodes_required", replicas),
            &replicas,
            |b, _| {
                b.iter(|| {
                    black_box(nodes_required(replicas, 250.0, 536_870_912.0, 8000.0, 17_179_869_184.0).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for &(replicas, clusters) in &[(10u64, 3usize), (16, 4)] {
        let order = cluster_order(clusters);
        let metrics = reference_metrics(clusters);
        let allocations = enumerate_allocations(&order, replicas, 10_000_000).unwrap();
        let demand = WorkloadDemand {
            replicas,
            cpu_per_replica: 250.0,
            memory_per_replica: 536_870_912.0,
        };

        group.bench_with_input(
            BenchmarkId::new("evaluate_all", format!("{replicas}r-{clusters}k")),
            &(replicas, clusters),
            |b, _| {
                b.iter(|| black_box(evaluate_all(&allocations, &metrics, &demand)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_enumeration, bench_bin_packing, bench_evaluation);
criterion_main!(benches);
