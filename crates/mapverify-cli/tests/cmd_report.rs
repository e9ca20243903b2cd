//! Integration tests for `mapverify report`.
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Path to the compiled `mapverify` binary.
fn mapverify_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("mapverify");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

/// Runs `full` into `out_dir` and returns the path of the results document.
fn results_in(out_dir: &Path, extra: &[&str], prefix: &str) -> PathBuf {
    let world = fixture("harbour.json");
    let status = Command::new(mapverify_bin())
        .arg("--quiet")
        .arg("--output")
        .arg(out_dir)
        .arg("full")
        .arg(world)
        .args(extra)
        .status()
        .expect("run mapverify full");
    assert_eq!(status.code(), Some(0));
    std::fs::read_dir(out_dir)
        .expect("read output dir")
        .map(|e| e.expect("dir entry").path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .expect("results document written")
}

#[test]
fn renders_pipeline_results_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results = results_in(dir.path(), &[], "pipeline-results-");

    let out = Command::new(mapverify_bin())
        .args(["report", results.to_str().expect("path")])
        .output()
        .expect("run mapverify report");
    assert_eq!(out.status.code(), Some(0));
    let md = String::from_utf8(out.stdout).expect("utf-8");
    assert!(md.starts_with("# Map Verification Report"), "report: {md}");
    assert!(md.contains("## Execution Summary"), "report: {md}");
    assert!(md.contains("## Regression Analysis"), "report: {md}");
}

#[test]
fn rendered_report_matches_the_persisted_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results = results_in(dir.path(), &[], "pipeline-results-");
    let name = results
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    let persisted = dir.path().join(
        name.replace("pipeline-results-", "pipeline-report-")
            .replace(".json", ".md"),
    );

    let out = Command::new(mapverify_bin())
        .args(["report", results.to_str().expect("path")])
        .output()
        .expect("run mapverify report");
    let expected = std::fs::read_to_string(persisted).expect("persisted report");
    assert_eq!(String::from_utf8(out.stdout).expect("utf-8"), expected);
}

#[test]
fn renders_integration_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    let results = results_in(
        dir.path(),
        &[
            "--integration",
            "--expect-rooms",
            "6",
            "--expect-regions",
            "3",
            "--expect-cross-region",
            "6",
        ],
        "integration-test-results-",
    );

    let out = Command::new(mapverify_bin())
        .args(["report", results.to_str().expect("path")])
        .output()
        .expect("run mapverify report");
    assert_eq!(out.status.code(), Some(0));
    let md = String::from_utf8(out.stdout).expect("utf-8");
    assert!(md.starts_with("# Integration Test Report"), "report: {md}");
}

#[test]
fn non_results_json_exits_2() {
    let out = Command::new(mapverify_bin())
        .args([
            "report",
            fixture("harbour-critical.json").to_str().expect("path"),
        ])
        .output()
        .expect("run mapverify report");
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
}
