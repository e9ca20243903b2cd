//! Room graph construction and reachability queries.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mapverify_bench::{SizeTier, generate_world};
use mapverify_core::graph::queries::{self, Direction};
use mapverify_core::{RoomGraph, TestData};

const TIERS: [(&str, SizeTier); 4] = [
    ("S", SizeTier::Small),
    ("M", SizeTier::Medium),
    ("L", SizeTier::Large),
    ("XL", SizeTier::XLarge),
];

fn data(tier: SizeTier) -> TestData {
    generate_world(&tier.config(42))
        .test_data()
        .expect("partitions")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    for (name, tier) in TIERS {
        let data = data(tier);
        group.throughput(Throughput::Elements(data.source.room_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| RoomGraph::build(black_box(&data.split)));
        });
    }
    group.finish();
}

fn bench_reachable(c: &mut Criterion) {
    let mut group = c.benchmark_group("reachable_from");
    for (name, tier) in TIERS {
        let data = data(tier);
        let graph = RoomGraph::build(&data.split);
        let start = graph.room_ids()[0].to_owned();

        group.bench_function(BenchmarkId::new("forward", name), |b| {
            b.iter(|| {
                queries::reachable_from(&graph, black_box(&start), Direction::Forward)
                    .expect("works")
            });
        });
        group.bench_function(BenchmarkId::new("both", name), |b| {
            b.iter(|| {
                queries::reachable_from(&graph, black_box(&start), Direction::Both).expect("works")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_reachable);
criterion_main!(benches);
