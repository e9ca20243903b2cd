//! Connectivity suite: component discovery and the full validation pass.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mapverify_bench::{SizeTier, generate_world};
use mapverify_core::connectivity::{self, ConnectivityConfig};
use mapverify_core::RoomGraph;

fn bench_connectivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("connectivity");
    let config = ConnectivityConfig::default();

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        let data = generate_world(&tier.config(42))
            .test_data()
            .expect("partitions");
        let graph = RoomGraph::build(&data.split);

        group.bench_function(BenchmarkId::new("components", name), |b| {
            b.iter(|| connectivity::components(black_box(&graph)));
        });
        group.bench_function(BenchmarkId::new("validate", name), |b| {
            b.iter(|| connectivity::validate(black_box(&graph), &config));
        });
        group.bench_function(BenchmarkId::new("validate_split", name), |b| {
            b.iter(|| connectivity::validate_split(black_box(&data.split)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_connectivity);
criterion_main!(benches);
