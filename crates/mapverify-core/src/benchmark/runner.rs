//! Timing one operation over warmup and measured iterations.
use std::fmt::Display;
use std::hint::black_box;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::comparison::Comparison;
use super::memory;
use super::stats::Statistics;
use super::thresholds::Thresholds;
use crate::grade::{Grade, mean};

/// A measured iteration that returned an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedIteration {
    /// Zero-based index among the measured iterations.
    pub iteration: usize,
    pub message: String,
}

/// Timing results for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBenchmark {
    pub operation: String,
    /// Measured iterations attempted.
    pub iterations: usize,
    pub warmup_iterations: usize,
    /// Durations in ms of the successful iterations.
    pub samples: Vec<f64>,
    /// `None` when every iteration failed.
    pub statistics: Option<Statistics>,
    /// Mean resident-set change per iteration in bytes, when measurable.
    pub mean_memory_delta_bytes: Option<f64>,
    pub failed_iterations: Vec<FailedIteration>,
    pub thresholds: Thresholds,
    pub grade: Grade,
    pub score: f64,
    /// Filled in by the suite when history is available.
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

impl OperationBenchmark {
    /// Mean duration in ms of the successful iterations.
    pub fn mean_ms(&self) -> Option<f64> {
        self.statistics.map(|s| s.mean)
    }

    /// Whether no iteration produced a usable sample.
    pub fn all_failed(&self) -> bool {
        self.statistics.is_none()
    }
}

/// Runs `op` `warmup` times discarding the results, then `iterations` times
/// recording duration and memory delta of each.
///
/// Failed iterations are recorded and excluded from the statistics; warmup
/// failures are ignored. Without any successful iteration the grade is F.
pub fn benchmark<T, E, F>(
    operation: &str,
    iterations: usize,
    warmup: usize,
    mut op: F,
) -> OperationBenchmark
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    for _ in 0..warmup {
        if let Ok(value) = op() {
            black_box(value);
        }
    }

    let mut samples = Vec::with_capacity(iterations);
    let mut memory_deltas = Vec::new();
    let mut failed_iterations = Vec::new();
    for iteration in 0..iterations {
        let rss_before = memory::resident_bytes();
        let started = Instant::now();
        let outcome = op();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let rss_after = memory::resident_bytes();

        match outcome {
            Ok(value) => {
                black_box(value);
                samples.push(elapsed_ms);
                if let Some(d) = memory::delta(rss_before, rss_after) {
                    memory_deltas.push(d as f64);
                }
            }
            Err(e) => {
                tracing::warn!(operation, iteration, error = %e, "benchmark iteration failed");
                failed_iterations.push(FailedIteration {
                    iteration,
                    message: e.to_string(),
                });
            }
        }
    }

    let statistics = Statistics::from_samples(&samples);
    let thresholds = Thresholds::for_operation(operation);
    let grade = statistics.map_or(Grade::F, |s| thresholds.grade(s.mean));
    tracing::debug!(
        operation,
        mean_ms = statistics.map(|s| s.mean),
        failed = failed_iterations.len(),
        %grade,
        "benchmark finished"
    );

    OperationBenchmark {
        operation: operation.to_owned(),
        iterations,
        warmup_iterations: warmup,
        samples,
        statistics,
        mean_memory_delta_bytes: mean(&memory_deltas),
        failed_iterations,
        thresholds,
        grade,
        score: grade.score(),
        comparison: None,
    }
}
