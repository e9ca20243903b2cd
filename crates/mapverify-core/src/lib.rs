#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Verification of a partitioned room-graph world.
//!
//! A monolithic [`SourceDataset`] is split into per-region [`RegionBundle`]s
//! by a [`Partitioner`]. This crate checks that nothing was lost or broken on
//! the way: graph connectivity, critical cross-region links, data integrity
//! between both sides, and the speed of the verification itself. The
//! [`Pipeline`] composes the suites and tracks scores across runs; the
//! [`IntegrationSuite`] adds the partitioning step in front.
//!
//! The library never touches the filesystem except to sample the resident
//! set size during benchmarks. History and artifacts go through the
//! [`HistoryStore`] and [`ArtifactSink`] traits.

pub mod benchmark;
pub mod connectivity;
pub mod cross_region;
pub mod error;
pub mod fingerprint;
pub mod grade;
pub mod graph;
pub mod history;
pub mod integration;
pub mod integrity;
pub mod issue;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod report;

#[cfg(test)]
mod test_helpers;

pub use benchmark::{BenchmarkConfig, OperationBenchmark, PerformanceReport, Statistics, Trend};
pub use connectivity::{ConnectivityConfig, ConnectivityReport};
pub use cross_region::{CrossRegionConfig, CrossRegionReport};
pub use error::{
    ExecutionError, IntegrationError, PartitionError, PersistenceError, PipelineError,
    StructuralError,
};
pub use fingerprint::dataset_fingerprint;
pub use grade::{Grade, Priority, Status};
pub use graph::{Direction, QueryError, RoomGraph};
pub use history::{DEFAULT_RETENTION, HistoryRecord, HistoryStore, MemoryHistoryStore};
pub use integration::{
    IntegrationConfig, IntegrationRun, IntegrationSuite, IntegrationSummary, PerformanceLimits,
    StageName,
};
pub use integrity::{IntegrityConfig, IntegrityReport, validate_test_data};
pub use issue::{Issue, IssueKind, Severity, Subject};
pub use model::{CriticalReference, RegionBundle, SourceDataset, SplitData, TestData};
pub use partition::{DistrictPartitioner, Partitioner};
pub use pipeline::{
    ArtifactSink, HealthCheck, HealthStatus, MemoryArtifacts, Pipeline, PipelineConfig,
    PipelineRun, PipelineStatus, PipelineSummary, Suite, SuiteName, SuiteReport,
    quick_health_check,
};
pub use report::{render_integration, render_pipeline};

/// Returns the current version of the mapverify-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
