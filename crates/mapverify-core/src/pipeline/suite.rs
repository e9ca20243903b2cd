//! The [`Suite`] seam and the four built-in suites.
use serde::{Deserialize, Serialize};

use super::{PipelineConfig, SuiteName};
use crate::benchmark::{self, PerformanceReport};
use crate::connectivity::{self, ConnectivityReport};
use crate::cross_region::{self, CrossRegionReport};
use crate::error::ExecutionError;
use crate::grade::Status;
use crate::graph::RoomGraph;
use crate::history::HistoryRecord;
use crate::integrity::{self, IntegrityReport};
use crate::issue::Issue;
use crate::model::TestData;
use crate::partition::Partitioner;

/// Inputs shared by every suite of one pipeline run.
pub struct SuiteContext<'a> {
    pub data: &'a TestData,
    /// Earlier runs, oldest first.
    pub history: &'a [HistoryRecord],
    /// Benchmarked as `mapSplitting` when present.
    pub partitioner: Option<&'a dyn Partitioner>,
    pub config: &'a PipelineConfig,
}

/// One analyzer composed by the pipeline.
pub trait Suite {
    /// The slot this suite fills.
    fn name(&self) -> SuiteName;

    /// Runs the suite. An `Err` (or a panic) marks the suite failed without
    /// stopping the pipeline unless fail-fast is set.
    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError>;
}

/// The report of whichever suite ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "suite", rename_all = "camelCase")]
pub enum SuiteReport {
    Connectivity(ConnectivityReport),
    CrossRegion(CrossRegionReport),
    DataIntegrity(IntegrityReport),
    Performance(PerformanceReport),
}

impl SuiteReport {
    pub fn name(&self) -> SuiteName {
        match self {
            Self::Connectivity(_) => SuiteName::Connectivity,
            Self::CrossRegion(_) => SuiteName::CrossRegion,
            Self::DataIntegrity(_) => SuiteName::DataIntegrity,
            Self::Performance(_) => SuiteName::Performance,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Connectivity(r) => r.status,
            Self::CrossRegion(r) => r.status,
            Self::DataIntegrity(r) => r.status,
            Self::Performance(r) => r.status,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Self::Connectivity(r) => r.score,
            Self::CrossRegion(r) => r.score,
            Self::DataIntegrity(r) => r.score,
            Self::Performance(r) => r.score,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Connectivity(r) => &r.issues,
            Self::CrossRegion(r) => &r.issues,
            Self::DataIntegrity(r) => &r.issues,
            Self::Performance(r) => &r.issues,
        }
    }

    pub fn execution_time_ms(&self) -> u64 {
        match self {
            Self::Connectivity(r) => r.execution_time_ms,
            Self::CrossRegion(r) => r.execution_time_ms,
            Self::DataIntegrity(r) => r.execution_time_ms,
            Self::Performance(r) => r.execution_time_ms,
        }
    }
}

/// Graph build plus reachability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectivitySuite;

impl Suite for ConnectivitySuite {
    fn name(&self) -> SuiteName {
        SuiteName::Connectivity
    }

    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        let graph = RoomGraph::build(&ctx.data.split);
        Ok(SuiteReport::Connectivity(connectivity::validate(
            &graph,
            &ctx.config.connectivity,
        )))
    }
}

/// Critical connections, symmetry, region paths and the connection matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossRegionSuite;

impl Suite for CrossRegionSuite {
    fn name(&self) -> SuiteName {
        SuiteName::CrossRegion
    }

    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        Ok(SuiteReport::CrossRegion(cross_region::validate(
            &ctx.data.split,
            &ctx.data.critical,
            &ctx.config.cross_region,
        )))
    }
}

/// Source-versus-bundle integrity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataIntegritySuite;

impl Suite for DataIntegritySuite {
    fn name(&self) -> SuiteName {
        SuiteName::DataIntegrity
    }

    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        Ok(SuiteReport::DataIntegrity(integrity::validate(
            &ctx.data.source,
            &ctx.data.split,
            &ctx.config.integrity,
        )))
    }
}

/// Benchmarks of every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceSuite;

impl Suite for PerformanceSuite {
    fn name(&self) -> SuiteName {
        SuiteName::Performance
    }

    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        Ok(SuiteReport::Performance(benchmark::run_suite(
            ctx.data,
            ctx.partitioner,
            ctx.history,
            &ctx.config.benchmark,
            &ctx.config.cross_region,
            &ctx.config.integrity,
        )))
    }
}
