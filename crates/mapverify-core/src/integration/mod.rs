
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::benchmark::{
    self, CONNECTIVITY_VALIDATION, CROSS_REGION_VALIDATION, DATA_INTEGRITY_CHECK, MAP_SPLITTING,
    PerformanceReport,
};
use crate::connectivity;
use crate::cross_region;
use crate::error::{IntegrationError, PersistenceError};
use crate::grade::{Grade, Priority, Status};
use crate::history::{HistoryRecord, HistoryStore};
use crate::integrity::{self, missing_section, validate_source};
use crate::issue::{Severity, count_severity};
use crate::model::{BundleMetadata, CriticalReference, SourceDataset, SplitData, TestData};
use crate::partition::Partitioner;
use crate::pipeline::{
    ArtifactSink, MemoryArtifacts, PIPELINE_NAME, Pipeline, PipelineConfig, PipelineRun,
    PipelineStatus, SuiteName, artifact_timestamp, write_json,
};
use crate::report;

/// Suite name recorded on every integration run.
pub const INTEGRATION_SUITE_NAME: &str = "mapverify-integration";

/// Version stamped into emitted region files.
pub const REGION_FILE_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Upper bounds on benchmark means, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceLimits {
    pub map_splitting_ms: f64,
    pub connectivity_ms: f64,
    pub integrity_ms: f64,
    pub cross_region_ms: f64,
}

impl Default for PerformanceLimits {
    fn default() -> Self {
        Self {
            map_splitting_ms: 5000.0,
            connectivity_ms: 2000.0,
            integrity_ms: 3000.0,
            cross_region_ms: 1500.0,
        }
    }
}

impl PerformanceLimits {
    fn by_operation(&self) -> [(&'static str, f64); 4] {
        [
            (MAP_SPLITTING, self.map_splitting_ms),
            (CONNECTIVITY_VALIDATION, self.connectivity_ms),
            (DATA_INTEGRITY_CHECK, self.integrity_ms),
            (CROSS_REGION_VALIDATION, self.cross_region_ms),
        ]
    }
}

/// Expectations and switches for an [`IntegrationSuite`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    /// Rooms the source and the split must both hold. Default 140.
    pub expected_rooms: usize,
    /// Regions the partitioner must produce. Default 4.
    pub expected_regions: usize,
    /// Cross-region connection records the split must declare. Default 38.
    pub expected_cross_region_connections: usize,
    /// Write one region file per bundle. Default true.
    pub emit_region_files: bool,
    /// Region files are named `{prefix}_{regionId}_district.json`.
    pub region_file_prefix: String,
    /// Recorded in each region file's metadata.
    pub source_file: Option<String>,
    /// Run the cross-region check in the validation stage. Default true.
    pub validate_all_connections: bool,
    /// Run the performance stage. Default true.
    pub run_performance: bool,
    pub limits: PerformanceLimits,
    /// Configuration of the embedded pipeline; its `persist` flag is ignored.
    pub pipeline: PipelineConfig,
    /// Write the integration artifacts. Default true.
    pub persist: bool,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        let mut pipeline = PipelineConfig::default();
        pipeline.benchmark.iterations = 5;
        Self {
            expected_rooms: 140,
            expected_regions: 4,
            expected_cross_region_connections: 38,
            emit_region_files: true,
            region_file_prefix: "region".to_owned(),
            source_file: None,
            validate_all_connections: true,
            run_performance: true,
            limits: PerformanceLimits::default(),
            pipeline,
            persist: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageName {
    Setup,
    MapSplitting,
    IntegrationTests,
    Validation,
    Performance,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::MapSplitting => "mapSplitting",
            Self::IntegrationTests => "integrationTests",
            Self::Validation => "validation",
            Self::Performance => "performance",
        }
    }

    fn suggestions(self) -> &'static [&'static str] {
        match self {
            Self::Setup => &[
                "check the source file format",
                "verify the source data is complete",
                "check the source file path",
            ],
            Self::MapSplitting => &[
                "check the partitioner configuration",
                "verify the split strategy",
                "check memory usage while splitting",
            ],
            Self::IntegrationTests => &[
                "check the pipeline configuration",
                "verify suite compatibility with the split format",
                "check the integrity of the test data",
            ],
            Self::Validation => &[
                "fix the failed validations",
                "check consistency between source and bundles",
                "verify connection integrity",
            ],
            Self::Performance => &[
                "optimise the slow operations",
                "check system resource usage",
                "consider caching intermediate results",
            ],
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source census.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStage {
    pub status: Status,
    pub districts: usize,
    pub locations: usize,
    pub rooms: usize,
    pub issues: Vec<String>,
}

/// Partitioner output and its shape checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplittingStage {
    pub status: Status,
    pub execution_time_ms: u64,
    pub region_count: usize,
    pub total_rooms: usize,
    pub total_locations: usize,
    pub total_connections: usize,
    pub cross_region_connections: usize,
    /// Region id → emitted artifact name.
    pub region_files: BTreeMap<String, String>,
    pub issues: Vec<String>,
    /// Set when the partitioner itself failed.
    pub error: Option<String>,
}

/// The embedded pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub status: Status,
    pub execution_time_ms: u64,
    pub pipeline_status: Option<PipelineStatus>,
    pub completed: Vec<SuiteName>,
    pub failed: Vec<SuiteName>,
    pub run: Option<Box<PipelineRun>>,
    /// Set when the pipeline aborted.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCountCheck {
    pub status: Status,
    pub source: usize,
    pub split: usize,
    pub expected: usize,
    pub by_region: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityCheck {
    pub status: Status,
    pub is_fully_connected: bool,
    pub components: usize,
    pub isolated_rooms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalConnectionsCheck {
    pub status: Status,
    pub expected: usize,
    pub found: usize,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityCheck {
    pub status: Status,
    pub errors: usize,
    pub warnings: usize,
}

/// Direct assertions on the split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStage {
    pub status: Status,
    pub room_count: RoomCountCheck,
    pub connectivity: ConnectivityCheck,
    /// Absent when cross-region validation is switched off.
    pub cross_region: Option<CriticalConnectionsCheck>,
    pub data_integrity: IntegrityCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitCheck {
    pub limit_ms: f64,
    /// `None` when the operation did not run or every iteration failed.
    pub mean_ms: Option<f64>,
    pub within: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStage {
    pub status: Status,
    pub grade: Grade,
    pub score: f64,
    /// Operation name → limit check.
    pub limits: BTreeMap<String, LimitCheck>,
    pub report: PerformanceReport,
}

/// Advice for a stage that did not pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecommendation {
    pub stage: StageName,
    pub priority: Priority,
    pub message: String,
    pub suggestions: Vec<String>,
}

/// Expected against actual counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationMetrics {
    pub expected_rooms: usize,
    pub actual_rooms: usize,
    pub expected_regions: usize,
    pub actual_regions: usize,
    pub expected_cross_region_connections: usize,
    pub actual_cross_region_connections: usize,
}

/// Everything one integration run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRun {
    pub suite_name: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: Status,
    pub setup: SetupStage,
    pub map_splitting: SplittingStage,
    pub integration_tests: Option<PipelineStage>,
    pub validation: Option<ValidationStage>,
    pub performance: Option<PerformanceStage>,
    pub recommendations: Vec<StageRecommendation>,
    pub metrics: IntegrationMetrics,
}

/// The compact summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSummary {
    pub suite_name: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: Status,
    pub stages: BTreeMap<StageName, Status>,
    pub recommendations: Vec<StageRecommendation>,
    pub metrics: IntegrationMetrics,
}

impl IntegrationRun {
    /// Status of every stage that ran.
    pub fn stage_statuses(&self) -> BTreeMap<StageName, Status> {
        let mut stages = BTreeMap::new();
        stages.insert(StageName::Setup, self.setup.status);
        stages.insert(StageName::MapSplitting, self.map_splitting.status);
        if let Some(s) = &self.integration_tests {
            stages.insert(StageName::IntegrationTests, s.status);
        }
        if let Some(s) = &self.validation {
            stages.insert(StageName::Validation, s.status);
        }
        if let Some(s) = &self.performance {
            stages.insert(StageName::Performance, s.status);
        }
        stages
    }

    pub fn summary(&self) -> IntegrationSummary {
        IntegrationSummary {
            suite_name: self.suite_name.clone(),
            timestamp: self.started_at,
            duration_ms: self.duration_ms,
            status: self.status,
            stages: self.stage_statuses(),
            recommendations: self.recommendations.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// IntegrationSuite
// ---------------------------------------------------------------------------

/// Drives partitioning, the pipeline and the direct checks. See the module
/// documentation.
#[derive(Debug, Clone, Default)]
pub struct IntegrationSuite {
    config: IntegrationConfig,
}

impl IntegrationSuite {
    pub fn new(config: IntegrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Runs every stage.
    ///
    /// `history` feeds the embedded pipeline's regression analysis and the
    /// benchmark comparison; it is never appended to.
    ///
    /// # Errors
    ///
    /// - [`IntegrationError::Structural`] when the source is malformed.
    /// - [`IntegrationError::Persistence`] when writing region files or
    ///   integration artifacts fails. Every stage still runs and the error
    ///   carries the finished run.
    pub fn run(
        &self,
        source: &SourceDataset,
        critical: &CriticalReference,
        partitioner: &dyn Partitioner,
        history: &mut dyn HistoryStore,
        artifacts: &mut dyn ArtifactSink,
    ) -> Result<IntegrationRun, IntegrationError> {
        let started_at = Utc::now();
        let started = Instant::now();
        tracing::info!(suite = INTEGRATION_SUITE_NAME, "integration run started");

        let setup = self.setup(source)?;
        let (map_splitting, split, mut write_failure) =
            self.split(source, partitioner, artifacts, started_at);

        let mut integration_tests = None;
        let mut validation = None;
        let mut performance = None;
        if let Some(split) = split {
            let data = TestData {
                source: source.clone(),
                split,
                critical: critical.clone(),
            };
            integration_tests = Some(self.run_pipeline(&data, partitioner, history));
            validation = Some(self.validate(&data));
            if self.config.run_performance {
                let previous = history.load().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "history unavailable for benchmark comparison");
                    Vec::new()
                });
                performance = Some(self.benchmark(&data, partitioner, &previous));
            }
        }

        let metrics = IntegrationMetrics {
            expected_rooms: self.config.expected_rooms,
            actual_rooms: map_splitting.total_rooms,
            expected_regions: self.config.expected_regions,
            actual_regions: map_splitting.region_count,
            expected_cross_region_connections: self.config.expected_cross_region_connections,
            actual_cross_region_connections: map_splitting.cross_region_connections,
        };

        let mut run = IntegrationRun {
            suite_name: INTEGRATION_SUITE_NAME.to_owned(),
            version: crate::version().to_owned(),
            started_at,
            finished_at: Utc::now(),
            duration_ms: 0,
            status: Status::Pass,
            setup,
            map_splitting,
            integration_tests,
            validation,
            performance,
            recommendations: Vec::new(),
            metrics,
        };
        let stages = run.stage_statuses();
        run.status = if stages.values().any(|s| *s == Status::Fail) {
            Status::Fail
        } else {
            Status::Pass
        };
        run.recommendations = recommend(&stages);
        run.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(status = %run.status, duration_ms = run.duration_ms, "integration run finished");

        if self.config.persist {
            if let Err(e) = persist(&run, artifacts) {
                write_failure.get_or_insert(e);
            }
        }
        match write_failure {
            Some(source) => {
                tracing::error!(error = %source, "integration results not persisted");
                Err(IntegrationError::Persistence {
                    run: Box::new(run),
                    source,
                })
            }
            None => Ok(run),
        }
    }

    fn setup(&self, source: &SourceDataset) -> Result<SetupStage, IntegrationError> {
        if let Err(e) = validate_source(source) {
            tracing::error!(error = %e, "source dataset rejected");
            return Err(e.into());
        }
        let rooms = source.room_count();
        let mut issues = Vec::new();
        if rooms != self.config.expected_rooms {
            issues.push(format!(
                "room count mismatch: expected {}, found {rooms}",
                self.config.expected_rooms
            ));
        }
        let stage = SetupStage {
            status: if issues.is_empty() {
                Status::Pass
            } else {
                Status::Partial
            },
            districts: source.districts().len(),
            locations: source.location_count(),
            rooms,
            issues,
        };
        tracing::info!(
            districts = stage.districts,
            locations = stage.locations,
            rooms = stage.rooms,
            "source loaded"
        );
        Ok(stage)
    }

    fn split(
        &self,
        source: &SourceDataset,
        partitioner: &dyn Partitioner,
        artifacts: &mut dyn ArtifactSink,
        at: DateTime<Utc>,
    ) -> (SplittingStage, Option<SplitData>, Option<PersistenceError>) {
        let started = Instant::now();
        let outcome = partitioner.partition(source);
        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let split = match outcome {
            Ok(split) => split,
            Err(e) => {
                tracing::error!(error = %e, "partitioning failed");
                let stage = SplittingStage {
                    status: Status::Fail,
                    execution_time_ms,
                    region_count: 0,
                    total_rooms: 0,
                    total_locations: 0,
                    total_connections: 0,
                    cross_region_connections: 0,
                    region_files: BTreeMap::new(),
                    issues: Vec::new(),
                    error: Some(e.to_string()),
                };
                return (stage, None, None);
            }
        };

        let mut stage = self.inspect_split(&split, execution_time_ms);
        let mut write_failure = None;
        if self.config.emit_region_files && stage.status != Status::Fail {
            if let Err(e) = self.emit_region_files(&split, artifacts, at, &mut stage) {
                tracing::warn!(error = %e, "region files not written");
                stage.issues.push(format!("region files not written: {e}"));
                write_failure = Some(e);
            }
        }
        tracing::info!(
            regions = stage.region_count,
            rooms = stage.total_rooms,
            cross_region = stage.cross_region_connections,
            status = %stage.status,
            "map split"
        );
        if stage.status == Status::Fail {
            return (stage, None, write_failure);
        }
        (stage, Some(split), write_failure)
    }

    fn inspect_split(&self, split: &SplitData, execution_time_ms: u64) -> SplittingStage {
        let mut incomplete = Vec::new();
        let mut issues = Vec::new();
        for (region, bundle) in split {
            if let Some(section) = missing_section(bundle) {
                incomplete.push(format!("region {region} is missing its {section} section"));
            }
        }

        let total_rooms: usize = split.values().map(|b| b.room_count()).sum();
        let total_locations: usize = split.values().map(|b| b.locations().len()).sum();
        let internal: usize = split.values().map(|b| b.internal_connections().len()).sum();
        let cross_region_connections: usize = split
            .values()
            .map(|b| b.cross_region_connections().len())
            .sum();

        if split.len() != self.config.expected_regions {
            issues.push(format!(
                "region count mismatch: expected {}, found {}",
                self.config.expected_regions,
                split.len()
            ));
        }
        if total_rooms != self.config.expected_rooms {
            issues.push(format!(
                "room count mismatch: expected {}, found {total_rooms}",
                self.config.expected_rooms
            ));
        }
        if cross_region_connections != self.config.expected_cross_region_connections {
            issues.push(format!(
                "cross-region connection count mismatch: expected {}, found {cross_region_connections}",
                self.config.expected_cross_region_connections
            ));
        }

        let status = if split.is_empty() || !incomplete.is_empty() {
            Status::Fail
        } else if issues.is_empty() {
            Status::Pass
        } else {
            Status::Partial
        };
        incomplete.append(&mut issues);

        SplittingStage {
            status,
            execution_time_ms,
            region_count: split.len(),
            total_rooms,
            total_locations,
            total_connections: internal + cross_region_connections,
            cross_region_connections,
            region_files: BTreeMap::new(),
            issues: incomplete,
            error: None,
        }
    }

    fn emit_region_files(
        &self,
        split: &SplitData,
        artifacts: &mut dyn ArtifactSink,
        at: DateTime<Utc>,
        stage: &mut SplittingStage,
    ) -> Result<(), PersistenceError> {
        let migration_date = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        for (region, bundle) in split {
            let name = format!("{}_{region}_district.json", self.config.region_file_prefix);
            let mut file = bundle.clone();
            file.metadata = Some(BundleMetadata {
                version: Some(REGION_FILE_VERSION.to_owned()),
                migration_date: Some(migration_date.clone()),
                source_file: self.config.source_file.clone(),
                region_id: Some(region.clone()),
                generated_by: Some(PIPELINE_NAME.to_owned()),
            });
            write_json(artifacts, &name, &file)?;
            stage.region_files.insert(region.clone(), name);
        }
        tracing::debug!(files = stage.region_files.len(), "region files written");
        Ok(())
    }

    fn run_pipeline(
        &self,
        data: &TestData,
        partitioner: &dyn Partitioner,
        history: &mut dyn HistoryStore,
    ) -> PipelineStage {
        let config = PipelineConfig {
            persist: false,
            ..self.config.pipeline.clone()
        };
        let started = Instant::now();
        // Nothing is written with persistence off; the sink only satisfies
        // the signature.
        let mut scratch = MemoryArtifacts::new();
        let outcome = Pipeline::new(config)
            .with_partitioner(partitioner)
            .run(data, history, &mut scratch);
        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(run) => PipelineStage {
                status: if run.status == PipelineStatus::Passed && !run.any_suite_failed() {
                    Status::Pass
                } else {
                    Status::Fail
                },
                execution_time_ms,
                pipeline_status: Some(run.status),
                completed: run.completed.clone(),
                failed: run.failed.iter().map(|f| f.suite).collect(),
                run: Some(Box::new(run)),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "embedded pipeline did not complete");
                PipelineStage {
                    status: Status::Fail,
                    execution_time_ms,
                    pipeline_status: Some(PipelineStatus::Error),
                    completed: Vec::new(),
                    failed: Vec::new(),
                    run: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn validate(&self, data: &TestData) -> ValidationStage {
        let split_rooms: usize = data.split.values().map(|b| b.room_count()).sum();
        let source_rooms = data.source.room_count();
        let room_count = RoomCountCheck {
            status: pass_if(
                source_rooms == split_rooms && split_rooms == self.config.expected_rooms,
            ),
            source: source_rooms,
            split: split_rooms,
            expected: self.config.expected_rooms,
            by_region: data
                .split
                .iter()
                .map(|(region, b)| (region.clone(), b.room_count()))
                .collect(),
        };

        let conn = connectivity::validate_split(&data.split);
        let connectivity = ConnectivityCheck {
            status: pass_if(conn.is_fully_connected && conn.isolated_rooms.is_empty()),
            is_fully_connected: conn.is_fully_connected,
            components: conn.components.len(),
            isolated_rooms: conn.isolated_rooms.len(),
        };

        let cross_region = self.config.validate_all_connections.then(|| {
            let report = cross_region::validate(
                &data.split,
                &data.critical,
                &self.config.pipeline.cross_region,
            );
            CriticalConnectionsCheck {
                status: pass_if(report.status == Status::Pass),
                expected: report.critical.total,
                found: report.critical.found,
                missing: report
                    .critical
                    .checks
                    .iter()
                    .filter(|c| !c.found)
                    .map(|c| format!("{} -> {}", c.expected.source_room_id, c.expected.target_room_id))
                    .collect(),
            }
        });

        let integ = integrity::validate(&data.source, &data.split, &self.config.pipeline.integrity);
        let data_integrity = IntegrityCheck {
            status: pass_if(integ.status == Status::Pass),
            errors: count_severity(&integ.issues, Severity::Error),
            warnings: count_severity(&integ.issues, Severity::Warning),
        };

        let status = [
            Some(room_count.status),
            Some(connectivity.status),
            cross_region.as_ref().map(|c| c.status),
            Some(data_integrity.status),
        ]
        .into_iter()
        .flatten()
        .fold(Status::Pass, Status::worst);
        tracing::info!(%status, "direct validation finished");

        ValidationStage {
            status,
            room_count,
            connectivity,
            cross_region,
            data_integrity,
        }
    }

    fn benchmark(
        &self,
        data: &TestData,
        partitioner: &dyn Partitioner,
        history: &[HistoryRecord],
    ) -> PerformanceStage {
        let report = benchmark::run_suite(
            data,
            Some(partitioner),
            history,
            &self.config.pipeline.benchmark,
            &self.config.pipeline.cross_region,
            &self.config.pipeline.integrity,
        );
        let limits: BTreeMap<String, LimitCheck> = self
            .config
            .limits
            .by_operation()
            .into_iter()
            .map(|(operation, limit_ms)| {
                let mean_ms = report.operation(operation).and_then(|o| o.mean_ms());
                let within = mean_ms.is_some_and(|m| m <= limit_ms);
                (
                    operation.to_owned(),
                    LimitCheck {
                        limit_ms,
                        mean_ms,
                        within,
                    },
                )
            })
            .collect();

        let status = if report.status == Status::Fail {
            Status::Fail
        } else if report.overall_grade != Grade::A || limits.values().any(|l| !l.within) {
            Status::Partial
        } else {
            Status::Pass
        };
        PerformanceStage {
            status,
            grade: report.overall_grade,
            score: report.score,
            limits,
            report,
        }
    }
}

fn pass_if(ok: bool) -> Status {
    if ok { Status::Pass } else { Status::Fail }
}

fn recommend(stages: &BTreeMap<StageName, Status>) -> Vec<StageRecommendation> {
    stages
        .iter()
        .filter_map(|(&stage, &status)| {
            let (priority, message) = match status {
                Status::Fail => (Priority::High, format!("{stage} failed")),
                Status::Partial => (Priority::Medium, format!("{stage} partially passed")),
                Status::Pass => return None,
            };
            Some(StageRecommendation {
                stage,
                priority,
                message,
                suggestions: stage.suggestions().iter().map(|s| (*s).to_owned()).collect(),
            })
        })
        .collect()
}

fn persist(run: &IntegrationRun, artifacts: &mut dyn ArtifactSink) -> Result<(), PersistenceError> {
    let ts = artifact_timestamp(run.started_at);
    write_json(artifacts, &format!("integration-test-results-{ts}.json"), run)?;
    write_json(
        artifacts,
        &format!("integration-test-summary-{ts}.json"),
        &run.summary(),
    )?;
    artifacts.write(
        &format!("integration-test-report-{ts}.md"),
        report::render_integration(run).as_bytes(),
    )?;
    tracing::debug!("integration results persisted");
    Ok(())
}
