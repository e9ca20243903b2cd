//! Cross-region suite: critical matching, hubs, reverse audit and matrix.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mapverify_bench::{SizeTier, generate_world};
use mapverify_core::cross_region::{self, CrossRegionConfig};

fn bench_cross_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_region");
    let config = CrossRegionConfig::default();

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
        ("XL", SizeTier::XLarge),
    ] {
        let data = generate_world(&tier.config(42))
            .test_data()
            .expect("partitions");
        group.bench_function(BenchmarkId::new("validate", name), |b| {
            b.iter(|| cross_region::validate(black_box(&data.split), &data.critical, &config));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cross_region);
criterion_main!(benches);
