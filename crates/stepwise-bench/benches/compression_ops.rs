//! Criterion benchmarks for the compression engines.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stepwise_bench::{text_profile, REFERENCE_SEED};
use stepwise_core::Engine;
use stepwise_engines::compression::{Huffman, Lzw, RunLength};

fn bench_compression(c: &mut Criterion) {
    let text = text_profile(2_000, REFERENCE_SEED);

    c.bench_function("huffman_2k", |b| {
        b.iter(|| {
            let sim = Huffman.simulate(black_box(text.as_str()));
            black_box(sim.steps.len());
        });
    });

    c.bench_function("lzw_2k", |b| {
        let engine = Lzw::default();
        b.iter(|| {
            let sim = engine.simulate(black_box(text.as_bytes()));
            black_box(sim.steps.len());
        });
    });

    c.bench_function("rle_2k", |b| {
        b.iter(|| {
            let sim = RunLength.simulate(black_box(text.as_str()));
            black_box(sim.steps.len());
        });
    });
}

criterion_group!(benches, bench_compression);
criterion_main!(benches);
