#![allow(clippy::expect_used, clippy::panic)]

use std::cell::Cell;

use super::*;
use crate::benchmark::MAP_SPLITTING;
use crate::error::StructuralError;
use crate::history::{MemoryHistoryStore, record};
use crate::partition::DistrictPartitioner;
use crate::test_helpers::healthy_world;

fn quiet_config() -> PipelineConfig {
    PipelineConfig {
        benchmark: BenchmarkConfig {
            iterations: 2,
            warmup_iterations: 0,
            ..BenchmarkConfig::default()
        },
        ..PipelineConfig::default()
    }
}

struct Failing(SuiteName);

impl Suite for Failing {
    fn name(&self) -> SuiteName {
        self.0
    }

    fn run(&self, _: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        Err(ExecutionError::new(self.0, "reference data unavailable"))
    }
}

struct Panicking;

impl Suite for Panicking {
    fn name(&self) -> SuiteName {
        SuiteName::CrossRegion
    }

    fn run(&self, _: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        panic!("index out of range");
    }
}

/// Counts invocations, then delegates to the built-in suite.
struct Counting<'c> {
    calls: &'c Cell<usize>,
}

impl Suite for Counting<'_> {
    fn name(&self) -> SuiteName {
        SuiteName::DataIntegrity
    }

    fn run(&self, ctx: &SuiteContext<'_>) -> Result<SuiteReport, ExecutionError> {
        self.calls.set(self.calls.get() + 1);
        DataIntegritySuite.run(ctx)
    }
}

struct RejectingSink;

impl ArtifactSink for RejectingSink {
    fn write(&mut self, name: &str, _: &[u8]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Write {
            artifact: name.to_owned(),
            detail: "read-only file system".to_owned(),
        })
    }
}

#[test]
fn healthy_world_passes_and_persists() {
    let mut history = MemoryHistoryStore::new();
    let mut artifacts = MemoryArtifacts::new();
    let run = Pipeline::new(quiet_config())
        .run(&healthy_world(), &mut history, &mut artifacts)
        .expect("pipeline runs");

    assert_eq!(run.status, PipelineStatus::Passed);
    assert_eq!(
        run.completed,
        [
            SuiteName::Connectivity,
            SuiteName::CrossRegion,
            SuiteName::DataIntegrity
        ]
    );
    assert_eq!(run.skipped, [SuiteName::Performance]);
    assert!(run.failed.is_empty());
    assert_eq!(run.regression.status, RegressionStatus::NoBaseline);
    assert!(!run.any_suite_failed());
    assert_eq!(run.dataset_fingerprint.len(), 64);

    assert_eq!(artifacts.len(), 3);
    assert!(artifacts.find("pipeline-results-").is_some());
    assert!(artifacts.find("pipeline-summary-").is_some());
    let (_, report) = artifacts.find("pipeline-report-").expect("report written");
    assert!(std::str::from_utf8(report).expect("utf8").contains(&run.execution_id));

    let records = history.load().expect("load");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].execution_id, run.execution_id);
    assert_eq!(records[0].suite_scores.len(), 3);
}

#[test]
fn second_run_compares_with_the_first() {
    let mut history = MemoryHistoryStore::new();
    let mut artifacts = MemoryArtifacts::new();
    let pipeline = Pipeline::new(quiet_config());
    let first = pipeline
        .run(&healthy_world(), &mut history, &mut artifacts)
        .expect("first run");
    let second = pipeline
        .run(&healthy_world(), &mut history, &mut artifacts)
        .expect("second run");

    assert_eq!(second.regression.status, RegressionStatus::Stable);
    assert_eq!(
        second.regression.baseline.as_deref(),
        Some(first.execution_id.as_str())
    );
    assert_eq!(second.regression.score_comparison.len(), 3);
    assert_eq!(history.load().expect("load").len(), 2);
}

#[test]
fn improvement_over_a_weaker_baseline_is_reported() {
    let mut history = MemoryHistoryStore::from_records(vec![record(
        "pipeline-1-aaaaaa",
        &[(SuiteName::Connectivity, 60.0)],
    )]);
    let run = Pipeline::new(quiet_config())
        .run(&healthy_world(), &mut history, &mut MemoryArtifacts::new())
        .expect("pipeline runs");
    assert_eq!(run.regression.improvements.len(), 1);
    assert_eq!(run.regression.improvements[0].suite, SuiteName::Connectivity);
}

#[test]
fn failing_suite_is_recorded_and_the_rest_still_run() {
    let run = Pipeline::new(quiet_config())
        .with_suite(Failing(SuiteName::CrossRegion))
        .run(
            &healthy_world(),
            &mut MemoryHistoryStore::new(),
            &mut MemoryArtifacts::new(),
        )
        .expect("pipeline runs");

    assert_eq!(run.status, PipelineStatus::Failed);
    assert_eq!(run.failed.len(), 1);
    assert_eq!(run.failed[0].suite, SuiteName::CrossRegion);
    assert!(!run.failed[0].panicked);
    assert_eq!(
        run.completed,
        [SuiteName::Connectivity, SuiteName::DataIntegrity]
    );
    assert!(run.result(SuiteName::CrossRegion).is_none());
}

#[test]
fn panicking_suite_becomes_an_execution_failure() {
    let run = Pipeline::new(quiet_config())
        .with_suite(Panicking)
        .run(
            &healthy_world(),
            &mut MemoryHistoryStore::new(),
            &mut MemoryArtifacts::new(),
        )
        .expect("pipeline runs");

    assert_eq!(run.status, PipelineStatus::Failed);
    assert!(run.failed[0].panicked);
    assert_eq!(run.failed[0].error, "index out of range");
}

#[test]
fn fail_fast_stops_at_the_first_failure() {
    let calls = Cell::new(0);
    let config = PipelineConfig {
        fail_fast: true,
        ..quiet_config()
    };
    let mut history = MemoryHistoryStore::new();
    let mut artifacts = MemoryArtifacts::new();
    let err = Pipeline::new(config)
        .with_suite(Failing(SuiteName::CrossRegion))
        .with_suite(Counting { calls: &calls })
        .run(&healthy_world(), &mut history, &mut artifacts)
        .expect_err("aborts");

    let PipelineError::Aborted(e) = err else {
        panic!("expected an aborted pipeline");
    };
    assert_eq!(e.suite, SuiteName::CrossRegion);
    assert_eq!(calls.get(), 0);
    assert!(artifacts.is_empty());
    assert!(history.load().expect("load").is_empty());
}

#[test]
fn structural_error_aborts_before_any_suite() {
    let calls = Cell::new(0);
    let mut data = healthy_world();
    data.source.districts = None;
    let err = Pipeline::new(quiet_config())
        .with_suite(Counting { calls: &calls })
        .run(&data, &mut MemoryHistoryStore::new(), &mut MemoryArtifacts::new())
        .expect_err("malformed input");

    assert!(matches!(
        err,
        PipelineError::Structural(StructuralError::MissingDistricts)
    ));
    assert_eq!(calls.get(), 0);
}

#[test]
fn persistence_failure_returns_the_run() {
    let mut history = MemoryHistoryStore::new();
    let err = Pipeline::new(quiet_config())
        .run(&healthy_world(), &mut history, &mut RejectingSink)
        .expect_err("sink rejects writes");

    let PipelineError::Persistence { run, source } = err else {
        panic!("expected a persistence failure");
    };
    assert_eq!(run.status, PipelineStatus::Passed);
    assert!(source.to_string().contains("read-only"));
    assert!(history.load().expect("load").is_empty());
}

#[test]
fn persistence_can_be_disabled() {
    let config = PipelineConfig {
        persist: false,
        ..quiet_config()
    };
    let mut history = MemoryHistoryStore::new();
    let mut artifacts = MemoryArtifacts::new();
    Pipeline::new(config)
        .run(&healthy_world(), &mut history, &mut artifacts)
        .expect("pipeline runs");
    assert!(artifacts.is_empty());
    assert!(history.load().expect("load").is_empty());
}

#[test]
fn performance_suite_records_benchmark_means() {
    let partitioner = DistrictPartitioner::default();
    let config = PipelineConfig {
        suites: SuiteName::ALL.to_vec(),
        ..quiet_config()
    };
    let mut history = MemoryHistoryStore::new();
    let run = Pipeline::new(config)
        .with_partitioner(&partitioner)
        .run(&healthy_world(), &mut history, &mut MemoryArtifacts::new())
        .expect("pipeline runs");

    assert!(run.skipped.is_empty());
    let record = &history.load().expect("load")[0];
    assert!(record.benchmark_means.contains_key(MAP_SPLITTING));
    assert!(record.suite_scores.contains_key(&SuiteName::Performance));
}

#[test]
fn results_document_round_trips() {
    let run = Pipeline::new(quiet_config())
        .run(
            &healthy_world(),
            &mut MemoryHistoryStore::new(),
            &mut MemoryArtifacts::new(),
        )
        .expect("pipeline runs");
    let json = serde_json::to_string(&run).expect("serializes");
    let back: PipelineRun = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back.execution_id, run.execution_id);
    assert_eq!(back.results.len(), run.results.len());
    assert_eq!(back.summaries, run.summaries);
}

#[test]
fn execution_id_has_millis_and_base36_suffix() {
    let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).expect("valid");
    let id = execution_id(at);
    let suffix = id
        .strip_prefix("pipeline-1700000000123-")
        .expect("prefix");
    assert_eq!(suffix.len(), 6);
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );
}

#[test]
fn recommendations_cover_suites_with_issues() {
    let mut data = healthy_world();
    data.critical.critical_connections[0].target_room_id = "nowhere".to_owned();
    let run = Pipeline::new(quiet_config())
        .run(&data, &mut MemoryHistoryStore::new(), &mut MemoryArtifacts::new())
        .expect("pipeline runs");
    let rec = run
        .recommendations
        .iter()
        .find(|r| r.suite == SuiteName::CrossRegion)
        .expect("cross-region recommendation");
    assert!(!rec.issues.is_empty());
    assert_eq!(rec.suggestions.len(), 4);
}
