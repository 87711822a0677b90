//! Criterion benchmarks for clustering, regression and the genetic
//! algorithm.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stepwise_bench::{points_profile, REFERENCE_SEED};
use stepwise_core::Engine;
use stepwise_engines::clustering::{Dbscan, KMeans, KMeansInit};
use stepwise_engines::evolution::GeneticAlgorithm;
use stepwise_engines::learning::LinearRegression;

fn bench_clustering(c: &mut Criterion) {
    let points = points_profile(300, 2, REFERENCE_SEED);

    let kmeans = KMeans {
        k: 5,
        init: KMeansInit::RandomPoints,
        seed: Some(REFERENCE_SEED),
        ..KMeans::default()
    };
    c.bench_function("kmeans_300p_k5", |b| {
        b.iter(|| {
            let sim = kmeans.simulate(black_box(points.as_slice()));
            black_box(sim.steps.len());
        });
    });

    let dbscan = Dbscan {
        eps: 6.0,
        min_pts: 4,
    };
    c.bench_function("dbscan_300p", |b| {
        b.iter(|| {
            let sim = dbscan.simulate(black_box(points.as_slice()));
            black_box(sim.steps.len());
        });
    });
}

fn bench_regression(c: &mut Criterion) {
    let samples: Vec<(f64, f64)> = points_profile(200, 1, REFERENCE_SEED)
        .into_iter()
        .map(|p| (p[0] / 100.0, 3.0 * p[0] / 100.0 + 1.0))
        .collect();
    let engine = LinearRegression {
        learning_rate: 0.1,
        epochs: 200,
    };
    c.bench_function("linear_regression_200x200", |b| {
        b.iter(|| {
            let sim = engine.simulate(black_box(samples.as_slice()));
            black_box(sim.success);
        });
    });
}

fn bench_genetic(c: &mut Criterion) {
    let engine = GeneticAlgorithm::builder()
        .population_size(40)
        .generations(50)
        .target("1011001110001111010101100")
        .seed(REFERENCE_SEED)
        .build()
        .unwrap();
    c.bench_function("genetic_40x50_target25", |b| {
        b.iter(|| {
            let sim = engine.simulate(black_box(&()));
            black_box(sim.steps.len());
        });
    });
}

criterion_group!(benches, bench_clustering, bench_regression, bench_genetic);
criterion_main!(benches);
