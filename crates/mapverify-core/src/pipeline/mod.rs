/// The automated test pipeline.
///
/// A [`Pipeline`] runs a fixed, ordered list of suites over one [`TestData`]:
///
/// 1. Setup validation ([`validate_test_data`]); a structural problem aborts
///    before any suite runs.
/// 2. Each enabled suite runs inside a `suite` span. Disabled suites are
///    recorded as skipped. A suite that returns an error or panics is recorded
///    as failed and the pipeline moves on, unless fail-fast is set.
/// 3. The overall score is the mean of the completed suites' scores.
/// 4. Regression analysis compares per-suite scores with the latest
///    [`HistoryRecord`].
/// 5. Results, summary and the rendered report go to the [`ArtifactSink`];
///    the run is appended to the [`HistoryStore`].
///
/// The run status is `passed` iff no suite failed to run. Suite verdicts
/// (PASS/PARTIAL/FAIL) are reported per suite and do not change it.
pub mod artifacts;
pub mod health;
pub mod regression;
pub mod suite;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactSink, MemoryArtifacts, artifact_timestamp, write_json};
pub use health::{HealthCheck, HealthStatus, quick_health_check};
pub use regression::{RegressionAnalysis, RegressionStatus, ScoreComparison};
pub use suite::{
    ConnectivitySuite, CrossRegionSuite, DataIntegritySuite, PerformanceSuite, Suite,
    SuiteContext, SuiteReport,
};

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkConfig;
use crate::connectivity::ConnectivityConfig;
use crate::cross_region::CrossRegionConfig;
use crate::error::{ExecutionError, PersistenceError, PipelineError};
use crate::fingerprint::dataset_fingerprint;
use crate::grade::{Grade, Priority, Status, mean};
use crate::history::{HistoryRecord, HistoryStore};
use crate::integrity::{IntegrityConfig, validate_test_data};
use crate::model::TestData;
use crate::partition::Partitioner;
use crate::report;

/// Name recorded on every run.
pub const PIPELINE_NAME: &str = "mapverify";

// ---------------------------------------------------------------------------
// SuiteName / PipelineStatus
// ---------------------------------------------------------------------------

/// The four suite slots, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuiteName {
    Connectivity,
    CrossRegion,
    DataIntegrity,
    Performance,
}

impl SuiteName {
    /// Every suite, in execution order.
    pub const ALL: [SuiteName; 4] = [
        Self::Connectivity,
        Self::CrossRegion,
        Self::DataIntegrity,
        Self::Performance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::CrossRegion => "crossRegion",
            Self::DataIntegrity => "dataIntegrity",
            Self::Performance => "performance",
        }
    }

    fn suggestions(self) -> &'static [&'static str] {
        match self {
            Self::Connectivity => &[
                "review the map connectivity configuration",
                "verify cross-region connection settings",
                "reconnect isolated rooms",
                "rerun the connection repair step",
            ],
            Self::CrossRegion => &[
                "verify every critical connection point",
                "check bidirectional connection configuration",
                "restore missing cross-region connections",
                "rerun the region connection validator",
            ],
            Self::DataIntegrity => &[
                "check room data consistency between source and bundles",
                "verify room id uniqueness",
                "fix source and bundle mismatches",
                "rerun the partitioner on a clean source",
            ],
            Self::Performance => &[
                "optimise the slow operations",
                "reduce memory usage",
                "use better-suited data structures",
                "consider caching intermediate results",
            ],
        }
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline state machine: `initialized → running → passed | failed | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Initialized,
    Running,
    Passed,
    Failed,
    Error,
}

impl PipelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Which suites run and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Enabled suites. Default: connectivity, cross-region and data integrity.
    pub suites: Vec<SuiteName>,
    /// Stop at the first suite that fails to run. Default false.
    pub fail_fast: bool,
    /// Write artifacts and append history. Default true.
    pub persist: bool,
    /// Score drop (points) that counts as a regression. Default 10.
    pub regression_threshold: f64,
    /// Score drop above which a regression is high severity. Default 20.
    pub high_severity_threshold: f64,
    pub connectivity: ConnectivityConfig,
    pub cross_region: CrossRegionConfig,
    pub integrity: IntegrityConfig,
    pub benchmark: BenchmarkConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            suites: vec![
                SuiteName::Connectivity,
                SuiteName::CrossRegion,
                SuiteName::DataIntegrity,
            ],
            fail_fast: false,
            persist: true,
            regression_threshold: 10.0,
            high_severity_threshold: 20.0,
            connectivity: ConnectivityConfig::default(),
            cross_region: CrossRegionConfig::default(),
            integrity: IntegrityConfig::default(),
            benchmark: BenchmarkConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Every suite, performance included.
    pub fn all_suites() -> Self {
        Self {
            suites: SuiteName::ALL.to_vec(),
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, suite: SuiteName) -> bool {
        self.suites.contains(&suite)
    }
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// A suite that did not produce a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteFailure {
    pub suite: SuiteName,
    pub error: String,
    pub panicked: bool,
}

/// The per-suite line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    pub status: Status,
    pub score: f64,
    pub execution_time_ms: u64,
    pub issue_count: usize,
    /// One rendered line per issue.
    pub issues: Vec<String>,
}

impl SuiteSummary {
    fn of(report: &SuiteReport) -> Self {
        let issues: Vec<String> = report.issues().iter().map(ToString::to_string).collect();
        Self {
            status: report.status(),
            score: report.score(),
            execution_time_ms: report.execution_time_ms(),
            issue_count: issues.len(),
            issues,
        }
    }
}

/// Follow-up advice for one suite that reported issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub suite: SuiteName,
    pub priority: Priority,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub execution_id: String,
    pub pipeline_name: String,
    pub pipeline_version: String,
    pub status: PipelineStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub dataset_fingerprint: String,
    pub completed: Vec<SuiteName>,
    pub failed: Vec<SuiteFailure>,
    pub skipped: Vec<SuiteName>,
    pub results: Vec<SuiteReport>,
    pub summaries: BTreeMap<SuiteName, SuiteSummary>,
    pub overall_score: f64,
    pub overall_grade: Grade,
    pub regression: RegressionAnalysis,
    pub recommendations: Vec<Recommendation>,
}

/// The compact summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub execution_id: String,
    pub pipeline_name: String,
    pub pipeline_version: String,
    pub timestamp: DateTime<Utc>,
    pub status: PipelineStatus,
    pub overall_grade: Grade,
    pub overall_score: f64,
    pub duration_ms: u64,
    pub suites: BTreeMap<SuiteName, SuiteSummary>,
    pub failed: Vec<SuiteFailure>,
    pub skipped: Vec<SuiteName>,
    pub regression: RegressionAnalysis,
    pub recommendations: Vec<Recommendation>,
}

impl PipelineRun {
    /// The report of `suite`, if it completed.
    pub fn result(&self, suite: SuiteName) -> Option<&SuiteReport> {
        self.results.iter().find(|r| r.name() == suite)
    }

    /// Whether any completed suite reported FAIL.
    pub fn any_suite_failed(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.status() == Status::Fail)
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            execution_id: self.execution_id.clone(),
            pipeline_name: self.pipeline_name.clone(),
            pipeline_version: self.pipeline_version.clone(),
            timestamp: self.started_at,
            status: self.status,
            overall_grade: self.overall_grade,
            overall_score: self.overall_score,
            duration_ms: self.duration_ms,
            suites: self.summaries.clone(),
            failed: self.failed.clone(),
            skipped: self.skipped.clone(),
            regression: self.regression.clone(),
            recommendations: self.recommendations.clone(),
        }
    }

    /// What this run contributes to the history.
    pub fn history_record(&self) -> HistoryRecord {
        let benchmark_means = match self.result(SuiteName::Performance) {
            Some(SuiteReport::Performance(p)) => p.means(),
            Some(
                SuiteReport::Connectivity(_)
                | SuiteReport::CrossRegion(_)
                | SuiteReport::DataIntegrity(_),
            )
            | None => BTreeMap::new(),
        };
        HistoryRecord {
            execution_id: self.execution_id.clone(),
            timestamp: self.started_at,
            status: self.status,
            overall_grade: self.overall_grade,
            overall_score: self.overall_score,
            suite_scores: self.suite_scores(),
            benchmark_means,
            dataset_fingerprint: self.dataset_fingerprint.clone(),
        }
    }

    fn suite_scores(&self) -> BTreeMap<SuiteName, f64> {
        self.results.iter().map(|r| (r.name(), r.score())).collect()
    }
}

/// `pipeline-{unix_millis}-{6 random base-36 chars}`.
pub fn execution_id(at: DateTime<Utc>) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("pipeline-{}-{suffix}", at.timestamp_millis())
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs the suites over a dataset. See the module documentation.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    suites: Vec<Box<dyn Suite + 'a>>,
    partitioner: Option<&'a dyn Partitioner>,
}

impl<'a> Pipeline<'a> {
    /// A pipeline with the four built-in suites.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            suites: vec![
                Box::new(ConnectivitySuite),
                Box::new(CrossRegionSuite),
                Box::new(DataIntegritySuite),
                Box::new(PerformanceSuite),
            ],
            partitioner: None,
        }
    }

    /// Replaces the built-in suite occupying `suite.name()`.
    pub fn with_suite(mut self, suite: impl Suite + 'a) -> Self {
        let name = suite.name();
        let boxed: Box<dyn Suite + 'a> = Box::new(suite);
        match self.suites.iter().position(|s| s.name() == name) {
            Some(i) => self.suites[i] = boxed,
            None => self.suites.push(boxed),
        }
        self
    }

    /// Benchmarks `partitioner` as `mapSplitting` in the performance suite.
    pub fn with_partitioner(mut self, partitioner: &'a dyn Partitioner) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every enabled suite over `data`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Structural`] when `data` fails setup validation.
    /// - [`PipelineError::Aborted`] when a suite fails and fail-fast is set.
    /// - [`PipelineError::Persistence`] when writing artifacts or history
    ///   fails; the completed run is carried in the error.
    pub fn run(
        &self,
        data: &TestData,
        history: &mut dyn HistoryStore,
        artifacts: &mut dyn ArtifactSink,
    ) -> Result<PipelineRun, PipelineError> {
        let started_at = Utc::now();
        let started = Instant::now();
        let execution_id = execution_id(started_at);
        let mut status = PipelineStatus::Initialized;
        tracing::info!(%execution_id, %status, "pipeline created");

        if let Err(e) = validate_test_data(data) {
            tracing::error!(%execution_id, error = %e, "setup validation failed");
            return Err(e.into());
        }

        let previous = history.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "history unavailable, continuing without baseline");
            Vec::new()
        });

        status = PipelineStatus::Running;
        tracing::info!(%execution_id, %status, suites = ?self.config.suites, "pipeline running");

        let ctx = SuiteContext {
            data,
            history: &previous,
            partitioner: self.partitioner,
            config: &self.config,
        };
        let mut completed = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();
        let mut results = Vec::new();

        for name in SuiteName::ALL {
            let Some(suite) = self.suites.iter().find(|s| s.name() == name) else {
                continue;
            };
            if !self.config.is_enabled(name) {
                tracing::debug!(suite = %name, "suite skipped");
                skipped.push(name);
                continue;
            }

            match run_guarded(suite.as_ref(), &ctx) {
                Ok(report) => {
                    tracing::info!(
                        suite = %name,
                        status = %report.status(),
                        score = report.score(),
                        issues = report.issues().len(),
                        "suite completed"
                    );
                    completed.push(name);
                    results.push(report);
                }
                Err(e) => {
                    tracing::warn!(suite = %name, error = %e, "suite failed");
                    failed.push(SuiteFailure {
                        suite: name,
                        error: e.message.clone(),
                        panicked: e.panicked,
                    });
                    if self.config.fail_fast {
                        tracing::error!(%execution_id, status = %PipelineStatus::Error, "fail-fast abort");
                        return Err(PipelineError::Aborted(e));
                    }
                }
            }
        }

        let scores: Vec<f64> = results.iter().map(SuiteReport::score).collect();
        let overall_score = mean(&scores).unwrap_or(0.0);
        let overall_grade = Grade::from_score(overall_score);
        status = if failed.is_empty() {
            PipelineStatus::Passed
        } else {
            PipelineStatus::Failed
        };

        let summaries: BTreeMap<SuiteName, SuiteSummary> = results
            .iter()
            .map(|r| (r.name(), SuiteSummary::of(r)))
            .collect();
        let current: BTreeMap<SuiteName, f64> =
            results.iter().map(|r| (r.name(), r.score())).collect();
        let regression = regression::analyze(
            &current,
            previous.last(),
            self.config.regression_threshold,
            self.config.high_severity_threshold,
        );
        tracing::info!(
            verdict = regression.status.as_str(),
            regressions = regression.regressions.len(),
            "regression analysis"
        );

        let dataset_fingerprint = dataset_fingerprint(&data.split).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not fingerprint dataset");
            String::new()
        });

        let run = PipelineRun {
            execution_id,
            pipeline_name: PIPELINE_NAME.to_owned(),
            pipeline_version: crate::version().to_owned(),
            status,
            started_at,
            finished_at: Utc::now(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            dataset_fingerprint,
            completed,
            failed,
            skipped,
            recommendations: recommend(&summaries),
            results,
            summaries,
            overall_score,
            overall_grade,
            regression,
        };
        tracing::info!(
            execution_id = %run.execution_id,
            status = %run.status,
            score = run.overall_score,
            grade = %run.overall_grade,
            "pipeline finished"
        );

        if self.config.persist {
            if let Err(source) = persist(&run, history, artifacts) {
                return Err(PipelineError::Persistence {
                    run: Box::new(run),
                    source,
                });
            }
        }
        Ok(run)
    }
}

/// Runs one suite, turning a panic into an [`ExecutionError`].
fn run_guarded(suite: &dyn Suite, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
    let name = suite.name();
    let span = tracing::info_span!("suite", name = %name);
    let _enter = span.enter();
    match catch_unwind(AssertUnwindSafe(|| suite.run(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "suite panicked".to_owned());
            Err(ExecutionError {
                suite: name,
                message,
                panicked: true,
            })
        }
    }
}

fn recommend(summaries: &BTreeMap<SuiteName, SuiteSummary>) -> Vec<Recommendation> {
    summaries
        .iter()
        .filter(|(_, s)| s.issue_count > 0)
        .map(|(&suite, s)| Recommendation {
            suite,
            priority: Priority::from_score(s.score),
            issues: s.issues.clone(),
            suggestions: suite
                .suggestions()
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        })
        .collect()
}

fn persist(
    run: &PipelineRun,
    history: &mut dyn HistoryStore,
    artifacts: &mut dyn ArtifactSink,
) -> Result<(), PersistenceError> {
    let ts = artifact_timestamp(run.started_at);
    write_json(artifacts, &format!("pipeline-results-{ts}.json"), run)?;
    write_json(artifacts, &format!("pipeline-summary-{ts}.json"), &run.summary())?;
    artifacts.write(
        &format!("pipeline-report-{ts}.md"),
        report::render_pipeline(run).as_bytes(),
    )?;
    history.append(run.history_record())?;
    tracing::debug!(execution_id = %run.execution_id, "pipeline results persisted");
    Ok(())
}
