//! Tests that generated worlds verify cleanly across size tiers and seeds.
#![allow(clippy::expect_used)]

use mapverify_bench::{GeneratorConfig, SizeTier, generate_world};
use mapverify_core::connectivity::{self, ConnectivityConfig};
use mapverify_core::cross_region::{self, CrossRegionConfig};
use mapverify_core::integrity::{self, IntegrityConfig};
use mapverify_core::{
    HealthStatus, MemoryArtifacts, MemoryHistoryStore, Pipeline, PipelineConfig, PipelineStatus,
    RoomGraph, Status, quick_health_check,
};

fn assert_verifies(config: &GeneratorConfig, label: &str) {
    let world = generate_world(config);
    let data = world.test_data().expect("generated worlds partition");

    let graph = RoomGraph::build(&data.split);
    let conn = connectivity::validate(&graph, &ConnectivityConfig::default());
    assert_eq!(conn.status, Status::Pass, "{label}: connectivity {:?}", conn.issues);
    assert!(conn.is_fully_connected, "{label}: world is not connected");

    let cross = cross_region::validate(&data.split, &data.critical, &CrossRegionConfig::default());
    assert_eq!(cross.status, Status::Pass, "{label}: cross-region {:?}", cross.issues);
    assert_eq!(cross.critical.found, cross.critical.total, "{label}");

    let integ = integrity::validate(&data.source, &data.split, &IntegrityConfig::default());
    assert_ne!(integ.status, Status::Fail, "{label}: integrity failed");
}

#[test]
fn generated_small_verifies() {
    for seed in [42, 123, 999, 7777, 54321] {
        assert_verifies(&SizeTier::Small.config(seed), &format!("Small/seed={seed}"));
    }
}

#[test]
fn generated_medium_verifies() {
    for seed in [42, 123, 999] {
        assert_verifies(&SizeTier::Medium.config(seed), &format!("Medium/seed={seed}"));
    }
}

#[test]
fn generated_large_verifies() {
    assert_verifies(&SizeTier::Large.config(42), "Large/seed=42");
}

#[test]
fn generation_is_deterministic() {
    let a = generate_world(&SizeTier::Small.config(42));
    let b = generate_world(&SizeTier::Small.config(42));
    assert_eq!(a.source, b.source);
    assert_eq!(a.reference, b.reference);
}

#[test]
fn different_seeds_differ() {
    let a = generate_world(&SizeTier::Small.config(1));
    let b = generate_world(&SizeTier::Small.config(2));
    assert_ne!(a.source, b.source);
}

#[test]
fn tier_counts_match_config() {
    for tier in [SizeTier::Small, SizeTier::Medium] {
        let config = tier.config(7);
        let world = generate_world(&config);
        assert_eq!(world.source.room_count(), config.room_count(), "{tier:?}");
        assert_eq!(
            world.source.districts().len(),
            config.num_regions * config.districts_per_region,
            "{tier:?}"
        );

        let data = world.test_data().expect("partitions");
        assert_eq!(data.split.len(), config.num_regions, "{tier:?}");
        assert_eq!(
            data.critical.critical_connections.len(),
            config.num_critical,
            "{tier:?}"
        );
        assert_eq!(data.critical.traffic_hubs.len(), config.num_hubs, "{tier:?}");
    }
}

#[test]
fn small_world_is_healthy() {
    let data = generate_world(&SizeTier::Small.config(42))
        .test_data()
        .expect("partitions");
    let health = quick_health_check(&data).expect("setup is valid");
    assert_eq!(health.status, HealthStatus::Healthy);
}

#[test]
fn pipeline_passes_on_generated_world() {
    let world = generate_world(&SizeTier::Small.config(42));
    let data = world.test_data().expect("partitions");
    let partitioner = world.partitioner();
    let mut history = MemoryHistoryStore::new();
    let mut artifacts = MemoryArtifacts::new();
    let run = Pipeline::new(PipelineConfig::default())
        .with_partitioner(&partitioner)
        .run(&data, &mut history, &mut artifacts)
        .expect("pipeline runs");
    assert_eq!(run.status, PipelineStatus::Passed);
    assert!(!run.any_suite_failed());
}

#[test]
fn degenerate_config_yields_empty_world() {
    let config = GeneratorConfig {
        num_regions: 0,
        ..SizeTier::Small.config(1)
    };
    let world = generate_world(&config);
    assert_eq!(world.source.room_count(), 0);
    assert!(world.reference.critical_connections.is_empty());
    assert!(world.reference.region_mapping.is_empty());
}
