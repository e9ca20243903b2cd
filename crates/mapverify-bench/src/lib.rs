//! Synthetic world generator and benchmark utilities for mapverify.
//!
//! This crate provides deterministic generation of partitionable room-graph
//! worlds for benchmarking and property-based testing of `mapverify-core`.

pub mod correctness;
pub mod generator;

pub use generator::{GeneratedWorld, GeneratorConfig, SizeTier, generate_world};
