/// Performance benchmarking of the verification operations.
///
/// Each operation runs through [`runner::benchmark`]: warmup iterations whose
/// results are discarded, then measured iterations whose wall-clock times feed
/// [`stats::Statistics`]. The mean is graded against the per-operation
/// [`thresholds::Thresholds`]; the lookup workload is graded by throughput and
/// latency instead.
///
/// When history is available, every operation's mean is compared with the
/// most recent earlier run and with a trend window of earlier runs.
///
/// The suite score is the mean of the per-operation grade scores. The suite
/// passes on an overall A or B, is partial on C or D, and fails on F or when
/// any operation produced no successful iteration.
pub mod comparison;
pub mod memory;
pub mod query;
pub mod runner;
pub mod stats;
pub mod thresholds;

pub use comparison::{Comparison, Trend};
pub use query::{QueryBenchmark, QueryWorkload};
pub use runner::{FailedIteration, OperationBenchmark, benchmark};
pub use stats::Statistics;
pub use thresholds::{
    CONNECTIVITY_VALIDATION, CROSS_REGION_VALIDATION, DATA_INTEGRITY_CHECK, MAP_SPLITTING,
    QUERY_PERFORMANCE, Thresholds,
};

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::connectivity;
use crate::cross_region::{self, CrossRegionConfig};
use crate::grade::{Grade, Priority, Status, mean};
use crate::graph::RoomGraph;
use crate::history::HistoryRecord;
use crate::integrity::{self, IntegrityConfig};
use crate::issue::{Issue, IssueKind, Severity, Subject};
use crate::model::TestData;
use crate::partition::Partitioner;

/// Iteration counts and workload shape for [`run_suite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Measured iterations per operation. Default 10.
    pub iterations: usize,
    /// Discarded warmup iterations per operation. Default 3.
    pub warmup_iterations: usize,
    /// Seed for sampling lookup targets. Default 42.
    pub query_seed: u64,
    /// Room-id lookups per batch. Default 20.
    pub id_lookups: usize,
    /// Room-name lookups per batch. Default 10.
    pub name_lookups: usize,
    /// Earlier runs considered for the trend. Default 5.
    pub trend_window: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup_iterations: 3,
            query_seed: 42,
            id_lookups: 20,
            name_lookups: 10,
            trend_window: 5,
        }
    }
}

/// Advice for one operation that scored under 80.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecommendation {
    pub operation: String,
    pub priority: Priority,
    pub grade: Grade,
    pub mean_ms: Option<f64>,
    pub suggestions: Vec<String>,
}

/// Everything the performance suite reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub status: Status,
    pub score: f64,
    pub overall_grade: Grade,
    pub operations: Vec<OperationBenchmark>,
    pub query: QueryBenchmark,
    pub recommendations: Vec<PerformanceRecommendation>,
    pub issues: Vec<Issue>,
    pub execution_time_ms: u64,
}

impl PerformanceReport {
    /// The benchmark of `operation`, if it ran.
    pub fn operation(&self, operation: &str) -> Option<&OperationBenchmark> {
        self.operations.iter().find(|o| o.operation == operation)
    }

    /// Operation name → mean ms, for the history record.
    pub fn means(&self) -> BTreeMap<String, f64> {
        self.operations
            .iter()
            .filter_map(|o| o.mean_ms().map(|m| (o.operation.clone(), m)))
            .collect()
    }
}

/// Benchmarks every operation over `data`.
///
/// `mapSplitting` runs only when a partitioner is supplied. `history` is
/// oldest first. The cross-region and integrity checks run with the same
/// configuration the pipeline validates with.
pub fn run_suite(
    data: &TestData,
    partitioner: Option<&dyn Partitioner>,
    history: &[HistoryRecord],
    config: &BenchmarkConfig,
    cross_region_config: &CrossRegionConfig,
    integrity_config: &IntegrityConfig,
) -> PerformanceReport {
    let started = Instant::now();
    let (iterations, warmup) = (config.iterations, config.warmup_iterations);
    let mut operations = Vec::new();

    if let Some(partitioner) = partitioner {
        operations.push(benchmark(MAP_SPLITTING, iterations, warmup, || {
            partitioner.partition(&data.source)
        }));
    }
    operations.push(benchmark(CONNECTIVITY_VALIDATION, iterations, warmup, || {
        Ok::<_, Infallible>(connectivity::validate_split(&data.split))
    }));
    operations.push(benchmark(CROSS_REGION_VALIDATION, iterations, warmup, || {
        Ok::<_, Infallible>(cross_region::validate(
            &data.split,
            &data.critical,
            cross_region_config,
        ))
    }));
    operations.push(benchmark(DATA_INTEGRITY_CHECK, iterations, warmup, || {
        Ok::<_, Infallible>(integrity::validate(
            &data.source,
            &data.split,
            integrity_config,
        ))
    }));

    let graph = RoomGraph::build(&data.split);
    let workload = QueryWorkload::sample(
        &graph,
        config.id_lookups,
        config.name_lookups,
        config.query_seed,
    );
    let mut lookups = benchmark(QUERY_PERFORMANCE, iterations, warmup, || {
        Ok::<_, Infallible>(workload.run(&graph))
    });
    let query = QueryBenchmark::from_batch(&workload, lookups.mean_ms().unwrap_or(0.0));
    if !lookups.all_failed() {
        lookups.grade = query.grade;
        lookups.score = query.grade.score();
    }
    operations.push(lookups);

    for op in &mut operations {
        if let Some(current) = op.mean_ms() {
            op.comparison = Some(comparison::compare(
                &op.operation,
                current,
                history,
                config.trend_window,
            ));
        }
    }

    let mut issues = Vec::new();
    for op in &operations {
        for failed in &op.failed_iterations {
            let severity = if op.all_failed() {
                Severity::Error
            } else {
                Severity::Warning
            };
            issues.push(Issue::new(
                IssueKind::FailedIteration,
                severity,
                Subject::Operation {
                    name: op.operation.clone(),
                },
                format!("iteration {} failed: {}", failed.iteration, failed.message),
            ));
        }
        if op.grade > Grade::B {
            issues.push(Issue::warning(
                IssueKind::SlowOperation,
                Subject::Operation {
                    name: op.operation.clone(),
                },
                match op.mean_ms() {
                    Some(m) => format!("graded {} with a mean of {m:.2} ms", op.grade),
                    None => format!("graded {} with no successful iteration", op.grade),
                },
            ));
        }
    }

    let recommendations = recommend(&operations);
    let scores: Vec<f64> = operations.iter().map(|o| o.score).collect();
    let score = mean(&scores).unwrap_or(0.0);
    let overall_grade = Grade::from_score(score);
    let status = if operations.iter().any(OperationBenchmark::all_failed) {
        Status::Fail
    } else {
        status_of(overall_grade)
    };

    tracing::debug!(operations = operations.len(), score, %overall_grade, "performance benchmarked");

    PerformanceReport {
        status,
        score,
        overall_grade,
        operations,
        query,
        recommendations,
        issues,
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

/// PASS for A and B, PARTIAL for C and D, FAIL for F.
pub fn status_of(grade: Grade) -> Status {
    match grade {
        Grade::A | Grade::B => Status::Pass,
        Grade::C | Grade::D => Status::Partial,
        Grade::F => Status::Fail,
    }
}

fn recommend(operations: &[OperationBenchmark]) -> Vec<PerformanceRecommendation> {
    operations
        .iter()
        .filter(|o| o.score < 80.0)
        .map(|o| PerformanceRecommendation {
            operation: o.operation.clone(),
            priority: if o.score < 60.0 {
                Priority::High
            } else {
                Priority::Medium
            },
            grade: o.grade,
            mean_ms: o.mean_ms(),
            suggestions: thresholds::suggestions(&o.operation)
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        })
        .collect()
}
